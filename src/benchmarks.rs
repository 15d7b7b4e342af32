//! Standard test functions for global optimization.
//!
//! Each benchmark builds an [`ObjectiveFunction`] over its customary
//! domain. All of them are minimization problems.

use crate::error::{SearchError, SearchResult};
use cuckoo_optimization::{Bounds, ObjectiveFunction};
use serde::{Deserialize, Serialize};
use std::f64::consts::{E, PI};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Benchmark {
    Sphere,
    Ackley,
    Griewank,
    Rastrigin,
    Rosenbrock,
    Michalewicz,
}

impl Benchmark {
    pub const ALL: [Benchmark; 6] = [
        Benchmark::Sphere,
        Benchmark::Ackley,
        Benchmark::Griewank,
        Benchmark::Rastrigin,
        Benchmark::Rosenbrock,
        Benchmark::Michalewicz,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Benchmark::Sphere => "Sphere function",
            Benchmark::Ackley => "Ackley function",
            Benchmark::Griewank => "Griewank function",
            Benchmark::Rastrigin => "Rastrigin function",
            Benchmark::Rosenbrock => "Rosenbrock function",
            Benchmark::Michalewicz => "Michalewicz function",
        }
    }

    /// Dimension the function is usually benchmarked at.
    pub fn default_dim(self) -> usize {
        match self {
            Benchmark::Sphere | Benchmark::Griewank => 50,
            Benchmark::Ackley => 20,
            Benchmark::Rastrigin | Benchmark::Rosenbrock => 30,
            Benchmark::Michalewicz => 2,
        }
    }

    pub fn bounds(self) -> Bounds {
        let (lower, upper) = match self {
            Benchmark::Sphere => (-100.0, 100.0),
            Benchmark::Ackley => (-32.768, 32.768),
            Benchmark::Griewank => (-600.0, 600.0),
            Benchmark::Rastrigin => (-5.12, 5.12),
            Benchmark::Rosenbrock => (-5.0, 10.0),
            Benchmark::Michalewicz => (0.0, PI),
        };
        Bounds { lower, upper }
    }

    /// Known global minimum value, where one is known in closed form.
    pub fn global_minimum(self, dim: usize) -> Option<f64> {
        match self {
            Benchmark::Michalewicz if dim == 2 => Some(-1.801_303_4),
            Benchmark::Michalewicz => None,
            _ => Some(0.0),
        }
    }

    pub fn objective(self, dim: usize) -> ObjectiveFunction {
        let f: fn(&[f64]) -> f64 = match self {
            Benchmark::Sphere => sphere,
            Benchmark::Ackley => ackley,
            Benchmark::Griewank => griewank,
            Benchmark::Rastrigin => rastrigin,
            Benchmark::Rosenbrock => rosenbrock,
            Benchmark::Michalewicz => michalewicz,
        };
        ObjectiveFunction::new(self.name(), dim, self.bounds(), move |x| match x.as_slice() {
            Some(slice) => f(slice),
            None => f(&x.to_vec()),
        })
    }

    pub fn default_objective(self) -> ObjectiveFunction {
        self.objective(self.default_dim())
    }
}

impl fmt::Display for Benchmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Benchmark {
    type Err = SearchError;

    fn from_str(s: &str) -> SearchResult<Self> {
        let key = s.trim().to_ascii_lowercase();
        let key = key.strip_suffix(" function").unwrap_or(&key);
        match key {
            "sphere" => Ok(Benchmark::Sphere),
            "ackley" => Ok(Benchmark::Ackley),
            "griewank" => Ok(Benchmark::Griewank),
            "rastrigin" => Ok(Benchmark::Rastrigin),
            "rosenbrock" => Ok(Benchmark::Rosenbrock),
            "michalewicz" => Ok(Benchmark::Michalewicz),
            _ => Err(SearchError::UnknownBenchmark(s.to_string())),
        }
    }
}

pub fn sphere(x: &[f64]) -> f64 {
    x.iter().map(|v| v * v).sum()
}

pub fn ackley(x: &[f64]) -> f64 {
    const A: f64 = 20.0;
    const B: f64 = 0.2;
    const C: f64 = 2.0 * PI;
    let n = x.len() as f64;
    let square_sum: f64 = x.iter().map(|v| v * v).sum();
    let cos_sum: f64 = x.iter().map(|v| (C * v).cos()).sum();
    -A * (-B * (square_sum / n).sqrt()).exp() - (cos_sum / n).exp() + A + E
}

pub fn griewank(x: &[f64]) -> f64 {
    let sum: f64 = x.iter().map(|v| v * v).sum::<f64>() / 4000.0;
    let product: f64 = x
        .iter()
        .enumerate()
        .map(|(i, v)| (v / ((i + 1) as f64).sqrt()).cos())
        .product();
    sum - product + 1.0
}

pub fn rastrigin(x: &[f64]) -> f64 {
    10.0 * x.len() as f64
        + x.iter()
            .map(|v| v * v - 10.0 * (2.0 * PI * v).cos())
            .sum::<f64>()
}

pub fn rosenbrock(x: &[f64]) -> f64 {
    x.windows(2)
        .map(|w| 100.0 * (w[1] - w[0] * w[0]).powi(2) + (w[0] - 1.0).powi(2))
        .sum()
}

pub fn michalewicz(x: &[f64]) -> f64 {
    const M: i32 = 10;
    -x.iter()
        .enumerate()
        .map(|(i, v)| v.sin() * ((i + 1) as f64 * v * v / PI).sin().powi(2 * M))
        .sum::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuckoo_optimization::Problem;
    use ndarray::Array1;

    #[test]
    fn test_minima_at_known_points() {
        assert_eq!(sphere(&[0.0; 5]), 0.0);
        assert!(ackley(&[0.0; 4]).abs() < 1e-12);
        assert!(griewank(&[0.0; 6]).abs() < 1e-12);
        assert!(rastrigin(&[0.0; 3]).abs() < 1e-12);
        assert_eq!(rosenbrock(&[1.0; 7]), 0.0);
    }

    #[test]
    fn test_michalewicz_two_dimensional_minimum() {
        let value = michalewicz(&[2.20, 1.57]);
        assert!((value - (-1.8013)).abs() < 1e-3, "got {}", value);
    }

    #[test]
    fn test_objective_uses_standard_bounds() {
        let rastrigin = Benchmark::Rastrigin.objective(4);
        assert_eq!(rastrigin.dim(), 4);
        assert_eq!(rastrigin.bounds()[3], Bounds { lower: -5.12, upper: 5.12 });
        assert_eq!(rastrigin.name(), "Rastrigin function");
        let value = rastrigin.evaluate(&Array1::zeros(4)).unwrap();
        assert!(value.abs() < 1e-12);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("sphere".parse::<Benchmark>().unwrap(), Benchmark::Sphere);
        assert_eq!("Ackley function".parse::<Benchmark>().unwrap(), Benchmark::Ackley);
        assert!(matches!("booth".parse::<Benchmark>(), Err(SearchError::UnknownBenchmark(_))));
        for b in Benchmark::ALL {
            assert_eq!(b.name().parse::<Benchmark>().unwrap(), b);
        }
    }
}
