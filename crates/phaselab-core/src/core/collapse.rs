use crate::core::lattice::{BETA_DELTA, ReferenceLattice};
use crate::core::models::atom::AtomRecord;
use nalgebra::{Point3, Vector3};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

/// Raw deviations above this value are not brought back into `[0, 1]` by a
/// single fold.
pub const SINGLE_FOLD_LIMIT: f64 = 2.0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CollapseError {
    #[error("No atoms were found in the input; statistics are undefined")]
    EmptyInput,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown fold policy '{0}'. Expected 'single' or 'periodic'.")]
pub struct UnknownFoldPolicy(pub String);

/// How normalized deviations above 1 are brought back towards the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FoldPolicy {
    /// `raw > 1` becomes `1 - (raw - 1)`, applied once. Raw deviations above
    /// [`SINGLE_FOLD_LIMIT`] stay out of band.
    #[default]
    Single,
    /// Triangle-wave fold with period 2: the result always lies in `[0, 1]`.
    Periodic,
}

impl FoldPolicy {
    pub fn apply(self, raw: f64) -> f64 {
        match self {
            FoldPolicy::Single => {
                if raw > 1.0 {
                    1.0 - (raw - 1.0)
                } else {
                    raw
                }
            }
            FoldPolicy::Periodic => {
                let phase = raw.rem_euclid(2.0);
                if phase > 1.0 { 2.0 - phase } else { phase }
            }
        }
    }
}

impl FromStr for FoldPolicy {
    type Err = UnknownFoldPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(FoldPolicy::Single),
            "periodic" => Ok(FoldPolicy::Periodic),
            _ => Err(UnknownFoldPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for FoldPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FoldPolicy::Single => write!(f, "single"),
            FoldPolicy::Periodic => write!(f, "periodic"),
        }
    }
}

/// `|value - nearest| / delta`, before any folding.
#[inline]
pub fn raw_deviation(value: f64, lattice: &ReferenceLattice, delta: f64) -> f64 {
    let nearest = lattice.nearest(value);
    ((value - nearest) / delta).abs()
}

/// Normalized deviation of `value` from its nearest lattice position, folded
/// once when it exceeds 1.
#[inline]
pub fn axis_deviation(value: f64, lattice: &ReferenceLattice, delta: f64) -> f64 {
    FoldPolicy::Single.apply(raw_deviation(value, lattice, delta))
}

/// Degree of collapse of an atom at fractional position `(x, y, z)` against
/// the beta lattice.
pub fn atom_degree(x: f64, y: f64, z: f64) -> f64 {
    DegreeCalculator::default().degree(&Point3::new(x, y, z))
}

/// Computes collapse metrics against a fixed lattice, tolerance and fold policy.
#[derive(Debug, Clone, PartialEq)]
pub struct DegreeCalculator {
    lattice: ReferenceLattice,
    delta: f64,
    fold: FoldPolicy,
}

impl Default for DegreeCalculator {
    fn default() -> Self {
        Self::new(ReferenceLattice::beta(), BETA_DELTA, FoldPolicy::Single)
    }
}

impl DegreeCalculator {
    pub fn new(lattice: ReferenceLattice, delta: f64, fold: FoldPolicy) -> Self {
        Self {
            lattice,
            delta,
            fold,
        }
    }

    pub fn with_fold_policy(fold: FoldPolicy) -> Self {
        Self {
            fold,
            ..Self::default()
        }
    }

    pub fn lattice(&self) -> &ReferenceLattice {
        &self.lattice
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn fold_policy(&self) -> FoldPolicy {
        self.fold
    }

    pub fn axis_deviation(&self, value: f64) -> f64 {
        self.fold
            .apply(raw_deviation(value, &self.lattice, self.delta))
    }

    pub fn deviations(&self, position: &Point3<f64>) -> Vector3<f64> {
        position.coords.map(|v| self.axis_deviation(v))
    }

    pub fn degree(&self, position: &Point3<f64>) -> f64 {
        self.deviations(position).mean()
    }

    /// Whether any axis of `position` deviates by more than a single fold can
    /// absorb. Only meaningful under [`FoldPolicy::Single`].
    pub fn exceeds_single_fold(&self, position: &Point3<f64>) -> bool {
        self.fold == FoldPolicy::Single
            && position
                .coords
                .iter()
                .any(|&v| raw_deviation(v, &self.lattice, self.delta) > SINGLE_FOLD_LIMIT)
    }

    pub fn record(&self, index: usize, position: Point3<f64>) -> AtomRecord {
        let deviation = self.deviations(&position);
        AtomRecord {
            index,
            position,
            degree: deviation.mean(),
            deviation,
        }
    }

    /// Records for `positions` in order, indexed from 1. Atoms a single fold
    /// leaves out of band are logged but kept.
    pub fn records(&self, positions: &[Point3<f64>]) -> Vec<AtomRecord> {
        positions
            .iter()
            .enumerate()
            .map(|(i, position)| {
                if self.exceeds_single_fold(position) {
                    warn!(
                        "Atom {} deviates by more than two tolerance units; its folded degree is out of band.",
                        i + 1
                    );
                }
                self.record(i + 1, *position)
            })
            .collect()
    }
}

/// Aggregate degree of collapse over a set of atoms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DegreeSummary {
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub count: usize,
}

pub fn summarize(atoms: &[AtomRecord]) -> Result<DegreeSummary, CollapseError> {
    if atoms.is_empty() {
        return Err(CollapseError::EmptyInput);
    }
    let n = atoms.len() as f64;
    let mean = atoms.iter().map(|a| a.degree).sum::<f64>() / n;
    let variance = atoms
        .iter()
        .map(|a| (a.degree - mean).powi(2))
        .sum::<f64>()
        / n;

    Ok(DegreeSummary {
        mean,
        std_dev: variance.sqrt(),
        count: atoms.len(),
    })
}
