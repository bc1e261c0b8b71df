use super::levenberg_marquardt::{CurveModel, FitError, LmOptions, levenberg_marquardt};
use super::potentials::{lennard_jones_12_6, lennard_jones_12_6_gradient};
use crate::core::models::energy::{EnergySample, FittedSample};
use nalgebra::Vector2;

const MIN_INITIAL_EPSILON: f64 = 1e-6;

/// Lennard-Jones 12-6 parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LennardJones {
    /// Well depth (same unit as the fitted energies).
    pub epsilon: f64,
    /// Distance at which the potential crosses zero.
    pub sigma: f64,
}

impl LennardJones {
    pub fn energy(&self, r: f64) -> f64 {
        lennard_jones_12_6(r, self.epsilon, self.sigma)
    }

    /// Starting point for a fit: the lowest sample is taken as the well.
    ///
    /// `σ₀ = r_min / 2^(1/6)`, `ε₀ = max(-u_min, 1e-6)`.
    pub fn initial_guess(samples: &[EnergySample]) -> Option<Self> {
        let lowest = samples.iter().min_by(|a, b| a.u.total_cmp(&b.u))?;
        Some(Self {
            epsilon: (-lowest.u).max(MIN_INITIAL_EPSILON),
            sigma: lowest.r / 2f64.powf(1.0 / 6.0),
        })
    }

    fn as_vector(&self) -> Vector2<f64> {
        Vector2::new(self.epsilon, self.sigma)
    }

    fn from_vector(v: &Vector2<f64>) -> Self {
        Self {
            epsilon: v.x,
            sigma: v.y,
        }
    }
}

struct LennardJonesModel;

impl CurveModel for LennardJonesModel {
    fn value(&self, x: f64, params: &Vector2<f64>) -> f64 {
        lennard_jones_12_6(x, params.x, params.y)
    }

    fn gradient(&self, x: f64, params: &Vector2<f64>) -> Vector2<f64> {
        lennard_jones_12_6_gradient(x, params.x, params.y)
    }
}

/// Result of fitting a Lennard-Jones curve to a set of samples.
#[derive(Debug, Clone, PartialEq)]
pub struct LjFit {
    pub params: LennardJones,
    /// Mean squared error of the fitted energies over the samples.
    pub mse: f64,
    /// Every input sample with its fitted energy, in input order.
    pub fitted: Vec<FittedSample>,
    pub evaluations: usize,
}

/// Fits `U(r) = 4ε[(σ/r)^12 - (σ/r)^6]` to `samples`, starting from
/// [`LennardJones::initial_guess`].
pub fn fit_lennard_jones(samples: &[EnergySample], options: &LmOptions) -> Result<LjFit, FitError> {
    let initial = LennardJones::initial_guess(samples).ok_or(FitError::InsufficientData {
        found: 0,
        required: 2,
    })?;
    fit_lennard_jones_from(samples, initial, options)
}

pub fn fit_lennard_jones_from(
    samples: &[EnergySample],
    initial: LennardJones,
    options: &LmOptions,
) -> Result<LjFit, FitError> {
    let xs: Vec<f64> = samples.iter().map(|s| s.r).collect();
    let ys: Vec<f64> = samples.iter().map(|s| s.u).collect();

    let outcome = levenberg_marquardt(&LennardJonesModel, &xs, &ys, initial.as_vector(), options)?;
    let params = LennardJones::from_vector(&outcome.params);

    let fitted: Vec<FittedSample> = samples
        .iter()
        .map(|s| FittedSample {
            r: s.r,
            u: s.u,
            u_calc: params.energy(s.r),
        })
        .collect();
    let mse = fitted.iter().map(|f| (f.u - f.u_calc).powi(2)).sum::<f64>() / fitted.len() as f64;

    Ok(LjFit {
        params,
        mse,
        fitted,
        evaluations: outcome.evaluations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic(epsilon: f64, sigma: f64) -> Vec<EnergySample> {
        (0..50)
            .map(|i| {
                let r = 2.9 + i as f64 * 0.1;
                EnergySample {
                    r,
                    u: lennard_jones_12_6(r, epsilon, sigma),
                }
            })
            .collect()
    }

    #[test]
    fn initial_guess_places_the_well_at_the_lowest_sample() {
        let guess = LennardJones::initial_guess(&[
            EnergySample { r: 3.0, u: -0.01 },
            EnergySample { r: 3.5, u: -0.02 },
            EnergySample { r: 5.0, u: -0.001 },
        ])
        .unwrap();
        assert!((guess.epsilon - 0.02).abs() < 1e-12);
        assert!((guess.sigma * 2f64.powf(1.0 / 6.0) - 3.5).abs() < 1e-12);
    }

    #[test]
    fn initial_guess_keeps_a_positive_epsilon_for_repulsive_data() {
        let guess = LennardJones::initial_guess(&[
            EnergySample { r: 2.0, u: 0.3 },
            EnergySample { r: 2.5, u: 0.1 },
        ])
        .unwrap();
        assert!(guess.epsilon > 0.0);
        assert!(LennardJones::initial_guess(&[]).is_none());
    }

    #[test]
    fn recovers_parameters_of_noise_free_data() {
        let samples = synthetic(0.012, 3.1);
        let fit = fit_lennard_jones(&samples, &LmOptions::default()).unwrap();

        assert!((fit.params.epsilon - 0.012).abs() < 1e-6);
        assert!((fit.params.sigma - 3.1).abs() < 1e-6);
        assert!(fit.mse < 1e-12);
        assert_eq!(fit.fitted.len(), samples.len());
    }

    #[test]
    fn recovers_parameters_from_an_explicit_start() {
        let samples = synthetic(0.02, 2.8);
        let initial = LennardJones {
            epsilon: 0.03,
            sigma: 2.7,
        };
        let fit = fit_lennard_jones_from(&samples, initial, &LmOptions::default()).unwrap();
        assert!((fit.params.epsilon - 0.02).abs() < 1e-6);
        assert!((fit.params.sigma - 2.8).abs() < 1e-6);
    }

    #[test]
    fn fitted_samples_carry_the_model_energy() {
        let samples = synthetic(0.01, 3.0);
        let fit = fit_lennard_jones(&samples, &LmOptions::default()).unwrap();
        for f in &fit.fitted {
            assert!((f.u_calc - fit.params.energy(f.r)).abs() < 1e-15);
        }
    }

    #[test]
    fn single_sample_cannot_be_fitted() {
        let err = fit_lennard_jones(&[EnergySample { r: 3.0, u: -0.1 }], &LmOptions::default())
            .unwrap_err();
        assert!(matches!(err, FitError::InsufficientData { found: 1, .. }));
    }

    #[test]
    fn empty_samples_cannot_be_fitted() {
        let err = fit_lennard_jones(&[], &LmOptions::default()).unwrap_err();
        assert!(matches!(err, FitError::InsufficientData { found: 0, .. }));
    }
}
