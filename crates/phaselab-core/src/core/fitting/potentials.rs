use nalgebra::Vector2;

const MIN_DISTANCE: f64 = 1e-6;
const CORE_ENERGY: f64 = 1e10;

/// Lennard-Jones 12-6 potential in the `(epsilon, sigma)` form:
/// `4ε[(σ/r)^12 - (σ/r)^6]`.
#[inline]
pub fn lennard_jones_12_6(dist: f64, epsilon: f64, sigma: f64) -> f64 {
    if dist < MIN_DISTANCE {
        return CORE_ENERGY;
    }
    let sr6 = (sigma / dist).powi(6);
    4.0 * epsilon * (sr6 * sr6 - sr6)
}

/// Partial derivatives of [`lennard_jones_12_6`] with respect to `(epsilon, sigma)`.
#[inline]
pub fn lennard_jones_12_6_gradient(dist: f64, epsilon: f64, sigma: f64) -> Vector2<f64> {
    if dist < MIN_DISTANCE || sigma.abs() < MIN_DISTANCE {
        return Vector2::zeros();
    }
    let sr6 = (sigma / dist).powi(6);
    let sr12 = sr6 * sr6;
    Vector2::new(
        4.0 * (sr12 - sr6),
        4.0 * epsilon * (12.0 * sr12 - 6.0 * sr6) / sigma,
    )
}

/// Distance at which the 12-6 potential reaches its minimum of `-ε`.
#[inline]
pub fn lennard_jones_minimum_distance(sigma: f64) -> f64 {
    sigma * 2f64.powf(1.0 / 6.0)
}
