//! Move generation: how a nest proposes its next position.

use crate::common::{Direction, Problem};
use crate::error::CuckooResult;
use crate::levy::LevyFlight;
use crate::nest::{clamp_into, Nest};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Strategy used to turn a nest into a proposal.
///
/// `Standard` takes one Levy step. `Lazy` takes the same step but also
/// evaluates the midpoint and the start of the segment it spans, keeping
/// the best of the three. The start point reuses its cached fitness, so a
/// lazy move costs one extra evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveStrategy {
    #[default]
    Standard,
    Lazy,
}

impl MoveStrategy {
    pub fn propose<P, R>(self, problem: &P, nest: &Nest, direction: Direction, rng: &mut R) -> CuckooResult<Nest>
    where
        P: Problem + ?Sized,
        R: Rng + ?Sized,
    {
        let step = LevyFlight::sample(nest.lambda(), nest.dim(), rng)?;
        let endpoint = nest.position() + &(nest.alpha() * &step);

        let mut proposal = match self {
            MoveStrategy::Standard => Nest::from_position(problem, endpoint, nest.lambda())?,
            MoveStrategy::Lazy => lazy_flight(problem, nest, endpoint, direction)?,
        };
        proposal.set_alpha(nest.alpha().clone())?;
        Ok(proposal)
    }
}

fn lazy_flight<P>(problem: &P, nest: &Nest, endpoint: ndarray::Array1<f64>, direction: Direction) -> CuckooResult<Nest>
where
    P: Problem + ?Sized,
{
    let endpoint = clamp_into(&problem.bounds(), endpoint)?;
    let midpoint = (nest.position() + &endpoint) / 2.0;

    let mut best = Nest::from_position(problem, endpoint, nest.lambda())?;
    let middle = Nest::from_position(problem, midpoint, nest.lambda())?;
    if middle.is_better_than(&best, direction) {
        best = middle;
    }
    if nest.is_better_than(&best, direction) {
        best = nest.clone();
    }
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Bounds, ObjectiveFunction};
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_sphere(calls: Arc<AtomicUsize>) -> ObjectiveFunction {
        ObjectiveFunction::new("sphere", 3, Bounds::new(-5.0, 5.0).unwrap(), move |x| {
            calls.fetch_add(1, Ordering::Relaxed);
            x.iter().map(|v| v * v).sum()
        })
    }

    #[test]
    fn test_standard_move_stays_in_bounds() {
        let problem = counting_sphere(Arc::new(AtomicUsize::new(0)));
        let mut rng = StdRng::seed_from_u64(11);
        let mut nest = Nest::from_position(&problem, array![4.9, -4.9, 0.0], 0.3).unwrap();
        nest.set_alpha(array![10.0, 10.0, 10.0]).unwrap();

        for _ in 0..200 {
            let proposal = MoveStrategy::Standard
                .propose(&problem, &nest, Direction::Minimize, &mut rng)
                .unwrap();
            assert!(proposal.position().iter().all(|x| (-5.0..=5.0).contains(x)));
            assert_eq!(proposal.fitness(), problem.evaluate(proposal.position()).unwrap());
            assert_eq!(proposal.alpha(), nest.alpha());
            assert_eq!(proposal.lambda(), nest.lambda());
        }
    }

    #[test]
    fn test_lazy_move_never_worse_than_origin() {
        let calls = Arc::new(AtomicUsize::new(0));
        let problem = counting_sphere(calls.clone());
        let mut rng = StdRng::seed_from_u64(5);
        let nest = Nest::from_position(&problem, array![0.5, -0.25, 1.0], 1.5).unwrap();

        for direction in [Direction::Minimize, Direction::Maximize] {
            for _ in 0..100 {
                let proposal = MoveStrategy::Lazy.propose(&problem, &nest, direction, &mut rng).unwrap();
                assert!(!nest.is_better_than(&proposal, direction));
            }
        }
    }

    #[test]
    fn test_lazy_move_costs_two_evaluations() {
        let calls = Arc::new(AtomicUsize::new(0));
        let problem = counting_sphere(calls.clone());
        let nest = Nest::from_position(&problem, array![1.0, 1.0, 1.0], 1.0).unwrap();
        calls.store(0, Ordering::Relaxed);

        let mut rng = StdRng::seed_from_u64(8);
        MoveStrategy::Lazy.propose(&problem, &nest, Direction::Minimize, &mut rng).unwrap();
        assert_eq!(calls.load(Ordering::Relaxed), 2);

        calls.store(0, Ordering::Relaxed);
        MoveStrategy::Standard.propose(&problem, &nest, Direction::Minimize, &mut rng).unwrap();
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }
}
