use nalgebra::{Point3, Vector3};

/// A single atom together with its collapse metrics.
///
/// Records are produced once by the loaders in [`crate::core::io`] and are not
/// modified afterwards. Presentation of a record is left to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomRecord {
    /// 1-based position of the atom in the input, in read order.
    pub index: usize,
    /// Fractional coordinates `(x, y, z)`. Values are not range-checked.
    pub position: Point3<f64>,
    /// Normalized per-axis deviation `(degX, degY, degZ)` from the nearest
    /// reference lattice position, after folding.
    pub deviation: Vector3<f64>,
    /// Mean of the three axis deviations: the atom's degree of collapse.
    pub degree: f64,
}

impl AtomRecord {
    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    pub fn z(&self) -> f64 {
        self.position.z
    }
}
