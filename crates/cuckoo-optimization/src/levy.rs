//! Heavy-tailed step generation via Mantegna's algorithm.
//!
//! Each component is `x / |y|^(1/lambda)` with `x ~ N(0, sigma_x)` and
//! `y ~ N(0, 1)`, which approximates a symmetric Levy-stable variable of
//! index `lambda`. The sampler holds no state; callers own the generator.

use crate::common::{check_lambda, LAMBDA_LIMITS};
use crate::error::{CuckooError, CuckooResult};
use ndarray::Array1;
use rand::Rng;
use rand_distr::StandardNormal;
use std::f64::consts::PI;

pub struct LevyFlight;

impl LevyFlight {
    /// Mantegna scale `sigma_x` for exponent `lambda`.
    pub fn sigma(lambda: f64) -> CuckooResult<f64> {
        if !check_lambda(lambda) {
            return Err(CuckooError::Domain(format!(
                "Levy flight lambda must be in range ({}, {}), got {}",
                LAMBDA_LIMITS.0, LAMBDA_LIMITS.1, lambda
            )));
        }
        let numerator = gamma(1.0 + lambda) * (PI * lambda / 2.0).sin();
        let divider = gamma((lambda + 1.0) / 2.0) * lambda * 2.0f64.powf((lambda - 1.0) / 2.0);
        Ok((numerator / divider).powf(1.0 / lambda))
    }

    /// Draws `dim` independent Levy-distributed values.
    pub fn sample<R: Rng + ?Sized>(lambda: f64, dim: usize, rng: &mut R) -> CuckooResult<Array1<f64>> {
        let sigma_x = Self::sigma(lambda)?;
        let inv_lambda = 1.0 / lambda;

        let mut step = Array1::zeros(dim);
        for value in step.iter_mut() {
            let x: f64 = rng.sample::<f64, _>(StandardNormal) * sigma_x;
            // |y|^(1/lambda) underflows for small lambda; redraw rather than divide by zero
            let divisor = loop {
                let y: f64 = rng.sample(StandardNormal);
                let d = y.abs().powf(inv_lambda);
                if d > 0.0 {
                    break d;
                }
            };
            *value = x / divisor;
        }
        Ok(step)
    }
}

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// Gamma function (Lanczos approximation, reflection below 0.5).
pub fn gamma(x: f64) -> f64 {
    if x < 0.5 {
        return PI / ((PI * x).sin() * gamma(1.0 - x));
    }
    let x = x - 1.0;
    let mut acc = LANCZOS_COEFFICIENTS[0];
    for (i, c) in LANCZOS_COEFFICIENTS.iter().enumerate().skip(1) {
        acc += c / (x + i as f64);
    }
    let t = x + LANCZOS_G + 0.5;
    (2.0 * PI).sqrt() * t.powf(x + 0.5) * (-t).exp() * acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_gamma_known_values() {
        assert!((gamma(1.0) - 1.0).abs() < 1e-12);
        assert!((gamma(1.5) - PI.sqrt() / 2.0).abs() < 1e-12);
        assert!((gamma(5.0) - 24.0).abs() < 1e-9);
        assert!((gamma(0.5) - PI.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_sigma() {
        assert!((LevyFlight::sigma(1.0).unwrap() - 1.0).abs() < 1e-9);
        assert!((LevyFlight::sigma(1.5).unwrap() - 0.696_574_5).abs() < 1e-6);
    }

    #[test]
    fn test_lambda_outside_open_interval_is_domain_error() {
        let mut rng = StdRng::seed_from_u64(1);
        for lambda in [0.0, 2.0, -0.5, 3.0, f64::NAN] {
            assert!(matches!(
                LevyFlight::sample(lambda, 3, &mut rng),
                Err(CuckooError::Domain(_))
            ));
        }
    }

    #[test]
    fn test_sample_dimension_and_finiteness() {
        let mut rng = StdRng::seed_from_u64(7);
        for lambda in [0.1, 0.5, 1.0, 1.5, 1.99] {
            let step = LevyFlight::sample(lambda, 16, &mut rng).unwrap();
            assert_eq!(step.len(), 16);
            assert!(step.iter().all(|v| !v.is_nan()));
        }
    }

    #[test]
    fn test_same_seed_same_steps() {
        let a = LevyFlight::sample(1.3, 8, &mut StdRng::seed_from_u64(99)).unwrap();
        let b = LevyFlight::sample(1.3, 8, &mut StdRng::seed_from_u64(99)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_heavy_tail() {
        // P(|N(0,1)| > 10) is about 1.5e-23, so a normal sample would show none
        let mut rng = StdRng::seed_from_u64(2024);
        let samples = LevyFlight::sample(1.5, 100_000, &mut rng).unwrap();
        let beyond = samples.iter().filter(|v| v.abs() > 10.0).count();
        assert!(beyond > 100, "expected a heavy tail, got {} samples beyond 10", beyond);
    }
}
