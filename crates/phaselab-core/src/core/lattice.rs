use thiserror::Error;

/// Canonical fractional positions of the beta phase along one cell axis.
pub const BETA_POSITIONS: [f64; 7] = [
    0.0,
    1.0 / 6.0,
    1.0 / 3.0,
    1.0 / 2.0,
    2.0 / 3.0,
    5.0 / 6.0,
    1.0,
];

/// Expected maximum shift of a beta-phase atom from its canonical position,
/// in fractional units. Deviations are normalized by this value.
pub const BETA_DELTA: f64 = ((1.0 / 6.0) / 3.0) / 2.0;

#[derive(Debug, Error, PartialEq)]
pub enum LatticeError {
    #[error("Reference lattice must contain at least one position")]
    Empty,
    #[error("Reference lattice position {index} is not finite (value: {value})")]
    NonFinite { index: usize, value: f64 },
    #[error(
        "Reference lattice must be strictly increasing (position {index}: {value} follows {previous})"
    )]
    NotIncreasing {
        index: usize,
        value: f64,
        previous: f64,
    },
}

/// An ordered set of canonical fractional positions along a single axis.
///
/// Positions are validated to be finite and strictly increasing when the
/// lattice is constructed and cannot be modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLattice {
    positions: Vec<f64>,
}

impl ReferenceLattice {
    pub fn new(positions: Vec<f64>) -> Result<Self, LatticeError> {
        if positions.is_empty() {
            return Err(LatticeError::Empty);
        }
        for (index, &value) in positions.iter().enumerate() {
            if !value.is_finite() {
                return Err(LatticeError::NonFinite { index, value });
            }
            if index > 0 {
                let previous = positions[index - 1];
                if value <= previous {
                    return Err(LatticeError::NotIncreasing {
                        index,
                        value,
                        previous,
                    });
                }
            }
        }
        Ok(Self { positions })
    }

    /// The seven-position beta lattice `{0, 1/6, 1/3, 1/2, 2/3, 5/6, 1}`.
    pub fn beta() -> Self {
        Self {
            positions: BETA_POSITIONS.to_vec(),
        }
    }

    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Returns the lattice entry closest to `value`.
    ///
    /// The two entries bracketing `value` are compared and the lower one wins
    /// only when it is strictly closer, so exact ties resolve to the upper
    /// entry. Values outside the lattice clamp to the first or last entry.
    pub fn nearest(&self, value: f64) -> f64 {
        let positions = &self.positions;
        if positions.len() == 1 {
            return positions[0];
        }

        let insertion = positions.partition_point(|&p| p < value);
        let idx = insertion.clamp(1, positions.len() - 1);
        let left = positions[idx - 1];
        let right = positions[idx];

        if value - left < right - value {
            left
        } else {
            right
        }
    }
}

impl Default for ReferenceLattice {
    fn default() -> Self {
        Self::beta()
    }
}

#[inline]
pub fn nearest_lattice_position(lattice: &ReferenceLattice, value: f64) -> f64 {
    lattice.nearest(value)
}
