use crate::common::{check_lambda, Bounds, Direction, Problem, LAMBDA_LIMITS};
use crate::error::{CuckooError, CuckooResult};
use ndarray::Array1;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One candidate solution: a position inside the bounds, its cached
/// fitness and the adaptive parameters of its next flight.
///
/// Fields are private so that the position is always clamped and the
/// fitness always matches the objective at that position.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Nest {
    position: Array1<f64>,
    fitness: f64,
    alpha: Array1<f64>,
    lambda: f64,
}

const DEFAULT_LAMBDA: f64 = 1.0;

impl Nest {
    /// Uniformly random position inside the problem's bounds.
    pub fn random<P, R>(problem: &P, rng: &mut R) -> CuckooResult<Self>
    where
        P: Problem + ?Sized,
        R: Rng + ?Sized,
    {
        let bounds = problem.bounds();
        let position: Array1<f64> = bounds
            .iter()
            .map(|b| b.lower + rng.gen::<f64>() * b.width())
            .collect();
        Self::evaluated(problem, position, DEFAULT_LAMBDA)
    }

    /// Clamps `proposed` into the problem's bounds and evaluates it.
    pub fn from_position<P>(problem: &P, proposed: Array1<f64>, lambda: f64) -> CuckooResult<Self>
    where
        P: Problem + ?Sized,
    {
        let bounds = problem.bounds();
        let position = clamp_into(&bounds, proposed)?;
        Self::evaluated(problem, position, lambda)
    }

    fn evaluated<P>(problem: &P, position: Array1<f64>, lambda: f64) -> CuckooResult<Self>
    where
        P: Problem + ?Sized,
    {
        validate_lambda(lambda)?;
        let fitness = problem.evaluate(&position)?;
        let alpha = Array1::ones(position.len());
        Ok(Self {
            position,
            fitness,
            alpha,
            lambda,
        })
    }

    pub fn position(&self) -> &Array1<f64> {
        &self.position
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn alpha(&self) -> &Array1<f64> {
        &self.alpha
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    pub fn dim(&self) -> usize {
        self.position.len()
    }

    pub fn set_alpha(&mut self, alpha: Array1<f64>) -> CuckooResult<()> {
        if alpha.len() != self.position.len() {
            return Err(CuckooError::Configuration(format!(
                "alpha has {} components but the nest has {} dimensions",
                alpha.len(),
                self.position.len()
            )));
        }
        if alpha.iter().any(|a| !(*a > 0.0)) {
            return Err(CuckooError::Validation(format!(
                "alpha must be more than 0, got {}",
                alpha
            )));
        }
        self.alpha = alpha;
        Ok(())
    }

    pub fn set_lambda(&mut self, lambda: f64) -> CuckooResult<()> {
        validate_lambda(lambda)?;
        self.lambda = lambda;
        Ok(())
    }

    pub fn is_better_than(&self, other: &Nest, direction: Direction) -> bool {
        direction.is_better(self.fitness, other.fitness)
    }
}

fn validate_lambda(lambda: f64) -> CuckooResult<()> {
    if !check_lambda(lambda) {
        return Err(CuckooError::Validation(format!(
            "lambda must be in range ({}, {}), got {}",
            LAMBDA_LIMITS.0, LAMBDA_LIMITS.1, lambda
        )));
    }
    Ok(())
}

pub(crate) fn clamp_into(bounds: &[Bounds], mut position: Array1<f64>) -> CuckooResult<Array1<f64>> {
    if bounds.len() != position.len() {
        return Err(CuckooError::Configuration(format!(
            "position has {} components but there are {} bounds",
            position.len(),
            bounds.len()
        )));
    }
    for (x, b) in position.iter_mut().zip(bounds) {
        // NaN can only come from a caller-supplied position; pin it to the lower bound
        *x = if x.is_nan() { b.lower } else { b.clamp(*x) };
    }
    Ok(position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ObjectiveFunction;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sphere() -> ObjectiveFunction {
        ObjectiveFunction::new("sphere", 2, Bounds::new(-10.0, 10.0).unwrap(), |x| {
            x.iter().map(|v| v * v).sum()
        })
    }

    #[test]
    fn test_random_nest_in_bounds_with_cached_fitness() {
        let problem = sphere();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let nest = Nest::random(&problem, &mut rng).unwrap();
            assert!(nest.position().iter().all(|x| (-10.0..=10.0).contains(x)));
            assert_eq!(nest.fitness(), problem.evaluate(nest.position()).unwrap());
        }
    }

    #[test]
    fn test_from_position_clamps_before_evaluation() {
        let problem = sphere();
        let nest = Nest::from_position(&problem, array![25.0, -3.0], 1.2).unwrap();
        assert_eq!(nest.position(), &array![10.0, -3.0]);
        assert_eq!(nest.fitness(), 109.0);
        assert_eq!(nest.lambda(), 1.2);
    }

    #[test]
    fn test_from_position_pins_nan_to_lower_bound() {
        let problem = sphere();
        let nest = Nest::from_position(&problem, array![f64::NAN, 2.0], 1.0).unwrap();
        assert_eq!(nest.position(), &array![-10.0, 2.0]);
        assert_eq!(nest.fitness(), 104.0);
    }

    #[test]
    fn test_from_position_rejects_wrong_dimension() {
        let problem = sphere();
        let err = Nest::from_position(&problem, array![1.0, 2.0, 3.0], 1.0).unwrap_err();
        assert!(matches!(err, CuckooError::Configuration(_)));
    }

    #[test]
    fn test_set_alpha_validation() {
        let problem = sphere();
        let mut nest = Nest::from_position(&problem, array![1.0, 1.0], 1.0).unwrap();
        assert!(nest.set_alpha(array![0.5, 0.25]).is_ok());
        assert!(matches!(nest.set_alpha(array![0.5, 0.0]), Err(CuckooError::Validation(_))));
        assert!(matches!(nest.set_alpha(array![0.5, -1.0]), Err(CuckooError::Validation(_))));
        assert!(matches!(nest.set_alpha(array![0.5]), Err(CuckooError::Configuration(_))));
        assert_eq!(nest.alpha(), &array![0.5, 0.25]);
    }

    #[test]
    fn test_set_lambda_validation() {
        let problem = sphere();
        let mut nest = Nest::from_position(&problem, array![1.0, 1.0], 1.0).unwrap();
        assert!(nest.set_lambda(1.99).is_ok());
        for bad in [0.0, 2.0, -1.0] {
            assert!(matches!(nest.set_lambda(bad), Err(CuckooError::Validation(_))));
        }
        assert_eq!(nest.lambda(), 1.99);
        assert!(Nest::from_position(&problem, array![0.0, 0.0], 2.5).is_err());
    }
}
