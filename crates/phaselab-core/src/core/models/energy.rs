use serde::{Deserialize, Serialize};

/// One point of a pair-energy curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergySample {
    /// Interatomic distance in Angstroms.
    pub r: f64,
    /// Pair energy in eV.
    pub u: f64,
}

/// A sample together with the energy predicted by a fitted potential.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FittedSample {
    pub r: f64,
    pub u: f64,
    pub u_calc: f64,
}

/// Open interval of energies kept for fitting: `min < u < max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyWindow {
    pub min: f64,
    pub max: f64,
}

impl EnergyWindow {
    pub fn contains(&self, u: f64) -> bool {
        u > self.min && u < self.max
    }
}

impl Default for EnergyWindow {
    fn default() -> Self {
        Self {
            min: -0.05,
            max: 0.01,
        }
    }
}

/// A named set of energy samples, typically one per input file.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyCurve {
    pub name: String,
    pub samples: Vec<EnergySample>,
}

impl EnergyCurve {
    pub fn new(name: impl Into<String>, samples: Vec<EnergySample>) -> Self {
        Self {
            name: name.into(),
            samples,
        }
    }

    /// Keeps only the samples whose energy falls inside `window`, preserving order.
    pub fn filtered(&self, window: EnergyWindow) -> Self {
        Self {
            name: self.name.clone(),
            samples: self
                .samples
                .iter()
                .copied()
                .filter(|s| window.contains(s.u))
                .collect(),
        }
    }

    /// The sample with the lowest energy, if any.
    pub fn minimum(&self) -> Option<EnergySample> {
        self.samples
            .iter()
            .copied()
            .min_by(|a, b| a.u.total_cmp(&b.u))
    }

    pub fn distances(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.r)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
