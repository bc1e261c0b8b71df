use serde::{Deserialize, Serialize};

/// One SVET measurement: probe position and the in-phase current density.
///
/// Field names follow the column headers exported by the instrument software.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanPoint {
    /// Absolute probe x coordinate (micrometres).
    #[serde(rename = "X")]
    pub x: f64,
    /// Absolute probe y coordinate (micrometres).
    #[serde(rename = "Y")]
    pub y: f64,
    /// In-phase current density (uA/cm²).
    #[serde(rename = "YPSDInPh_uApsqcm")]
    pub current: f64,
}

/// Axis-aligned bounds of a set of points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Extent {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// All points of one scan, under a display name.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanMap {
    pub name: String,
    pub points: Vec<ScanPoint>,
}

impl ScanMap {
    pub fn new(name: impl Into<String>, points: Vec<ScanPoint>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }

    pub fn extent(&self) -> Option<Extent> {
        let first = self.points.first()?;
        let init = Extent {
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
        };
        Some(self.points.iter().fold(init, |e, p| Extent {
            min_x: e.min_x.min(p.x),
            max_x: e.max_x.max(p.x),
            min_y: e.min_y.min(p.y),
            max_y: e.max_y.max(p.y),
        }))
    }

    /// `(min, max)` of the measured current, if the map has any points.
    pub fn current_range(&self) -> Option<(f64, f64)> {
        let first = self.points.first()?.current;
        Some(
            self.points
                .iter()
                .fold((first, first), |(lo, hi), p| (lo.min(p.current), hi.max(p.current))),
        )
    }

    /// Median spacing between distinct probe positions along x and y.
    ///
    /// Falls back to a tenth of the extent (or 1.0 for a degenerate extent)
    /// when an axis has a single distinct coordinate.
    pub fn grid_spacing(&self) -> (f64, f64) {
        let Some(extent) = self.extent() else {
            return (1.0, 1.0);
        };
        let xs: Vec<f64> = self.points.iter().map(|p| p.x).collect();
        let ys: Vec<f64> = self.points.iter().map(|p| p.y).collect();
        (
            axis_spacing(xs, extent.width()),
            axis_spacing(ys, extent.height()),
        )
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

fn axis_spacing(mut values: Vec<f64>, span: f64) -> f64 {
    let tolerance = span.abs() * 1e-9;
    values.sort_by(f64::total_cmp);
    values.dedup_by(|a, b| (*a - *b).abs() <= tolerance);

    let gaps: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    match median(&gaps) {
        Some(gap) => gap,
        None if span > 0.0 => span / 10.0,
        None => 1.0,
    }
}

/// Median of a slice of finite values; `None` when empty.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}
