use nalgebra::{Matrix2, Vector2};
use thiserror::Error;

const DIAGONAL_FLOOR: f64 = 1e-12;
const MIN_DAMPING: f64 = 1e-12;
const MAX_DAMPING: f64 = 1e16;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FitError {
    #[error("Not enough samples to fit: found {found}, need at least {required}")]
    InsufficientData { found: usize, required: usize },
    #[error("Residuals are not finite at the initial parameters")]
    NonFinite,
    #[error("Normal equations are singular; the parameters cannot be determined")]
    Singular,
    #[error("Fit did not converge within {evaluations} function evaluations")]
    NotConverged { evaluations: usize },
}

/// A scalar model `y = f(x; p)` with two parameters and an analytic gradient.
pub trait CurveModel {
    fn value(&self, x: f64, params: &Vector2<f64>) -> f64;

    /// `∂f/∂p` at `x`.
    fn gradient(&self, x: f64, params: &Vector2<f64>) -> Vector2<f64>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LmOptions {
    /// Upper bound on the number of residual evaluations.
    pub max_evaluations: usize,
    /// Relative reduction of the residual sum of squares below which the fit stops.
    pub ftol: f64,
    /// Relative step size below which the fit stops.
    pub xtol: f64,
    pub initial_damping: f64,
}

impl Default for LmOptions {
    fn default() -> Self {
        Self {
            max_evaluations: 100_000,
            ftol: 1.49012e-8,
            xtol: 1.49012e-8,
            initial_damping: 1e-3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LmFit {
    pub params: Vector2<f64>,
    pub residual_sum_sq: f64,
    pub evaluations: usize,
    pub iterations: usize,
}

fn residual_sum_sq<M: CurveModel>(model: &M, xs: &[f64], ys: &[f64], params: &Vector2<f64>) -> f64 {
    xs.iter()
        .zip(ys)
        .map(|(&x, &y)| (y - model.value(x, params)).powi(2))
        .sum()
}

fn normal_equations<M: CurveModel>(
    model: &M,
    xs: &[f64],
    ys: &[f64],
    params: &Vector2<f64>,
) -> (Matrix2<f64>, Vector2<f64>) {
    xs.iter().zip(ys).fold(
        (Matrix2::zeros(), Vector2::zeros()),
        |(jtj, jtr), (&x, &y)| {
            let g = model.gradient(x, params);
            let r = y - model.value(x, params);
            (jtj + g * g.transpose(), jtr + g * r)
        },
    )
}

/// Least-squares fit of `model` to `(xs, ys)` by Levenberg-Marquardt with
/// Marquardt's diagonal scaling.
///
/// Stops when either the relative reduction of the residual sum of squares
/// or the relative step falls below the tolerances in `options`, or when no
/// damped step improves the residual any further.
pub fn levenberg_marquardt<M: CurveModel>(
    model: &M,
    xs: &[f64],
    ys: &[f64],
    initial: Vector2<f64>,
    options: &LmOptions,
) -> Result<LmFit, FitError> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return Err(FitError::InsufficientData {
            found: n,
            required: 2,
        });
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);

    let mut params = initial;
    let mut cost = residual_sum_sq(model, xs, ys, &params);
    let mut evaluations = 1;
    let mut iterations = 0;
    if !cost.is_finite() {
        return Err(FitError::NonFinite);
    }
    let mut damping = options.initial_damping;

    let finish = |params: Vector2<f64>, cost: f64, evaluations: usize, iterations: usize| LmFit {
        params,
        residual_sum_sq: cost,
        evaluations,
        iterations,
    };

    loop {
        if cost == 0.0 {
            return Ok(finish(params, cost, evaluations, iterations));
        }
        let (jtj, jtr) = normal_equations(model, xs, ys, &params);
        if !jtj.iter().chain(jtr.iter()).all(|v| v.is_finite()) {
            return Err(FitError::NonFinite);
        }
        let scaling = Matrix2::from_diagonal(&jtj.diagonal().map(|d| d.max(DIAGONAL_FLOOR)));

        loop {
            if evaluations >= options.max_evaluations {
                return Err(FitError::NotConverged { evaluations });
            }

            let Some(cholesky) = (jtj + scaling * damping).cholesky() else {
                damping *= 10.0;
                if damping > MAX_DAMPING {
                    return Err(FitError::Singular);
                }
                continue;
            };
            let step = cholesky.solve(&jtr);
            let candidate = params + step;
            let candidate_cost = residual_sum_sq(model, xs, ys, &candidate);
            evaluations += 1;

            if candidate_cost.is_finite() && candidate_cost <= cost {
                let reduction = (cost - candidate_cost) / cost;
                let relative_step = step.norm() / (params.norm() + options.xtol);
                params = candidate;
                cost = candidate_cost;
                iterations += 1;
                damping = (damping * 0.1).max(MIN_DAMPING);

                if reduction < options.ftol || relative_step < options.xtol {
                    return Ok(finish(params, cost, evaluations, iterations));
                }
                break;
            }

            damping *= 10.0;
            if damping > MAX_DAMPING {
                return Ok(finish(params, cost, evaluations, iterations));
            }
        }
    }
}
