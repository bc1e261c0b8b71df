use phf::{Map, phf_map};
use plotters::style::RGBColor;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const PUOR: &[(u8, u8, u8)] = &[
    (0x7f, 0x3b, 0x08),
    (0xb3, 0x58, 0x06),
    (0xe0, 0x82, 0x14),
    (0xfd, 0xb8, 0x63),
    (0xfe, 0xe0, 0xb6),
    (0xf7, 0xf7, 0xf7),
    (0xd8, 0xda, 0xeb),
    (0xb2, 0xab, 0xd2),
    (0x80, 0x73, 0xac),
    (0x54, 0x27, 0x88),
    (0x2d, 0x00, 0x4b),
];

const RDBU: &[(u8, u8, u8)] = &[
    (0x67, 0x00, 0x1f),
    (0xb2, 0x18, 0x2b),
    (0xd6, 0x60, 0x4d),
    (0xf4, 0xa5, 0x82),
    (0xfd, 0xdb, 0xc7),
    (0xf7, 0xf7, 0xf7),
    (0xd1, 0xe5, 0xf0),
    (0x92, 0xc5, 0xde),
    (0x43, 0x93, 0xc3),
    (0x21, 0x66, 0xac),
    (0x05, 0x30, 0x61),
];

/// Named diverging colormaps. The boolean marks reversed variants.
static COLORMAPS: Map<&'static str, (&'static [(u8, u8, u8)], bool)> = phf_map! {
    "PuOr" => (PUOR, false),
    "PuOr_r" => (PUOR, true),
    "RdBu" => (RDBU, false),
    "RdBu_r" => (RDBU, true),
};

pub const DEFAULT_COLORMAP: &str = "PuOr_r";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown colormap '{name}' (expected one of: {available})")]
pub struct UnknownColormap {
    pub name: String,
    pub available: String,
}

/// A piecewise-linear colormap over evenly spaced anchor colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colormap {
    name: &'static str,
    anchors: &'static [(u8, u8, u8)],
    reversed: bool,
}

impl Colormap {
    pub fn named(name: &str) -> Result<Self, UnknownColormap> {
        let (key, (anchors, reversed)) =
            COLORMAPS.get_entry(name).ok_or_else(|| UnknownColormap {
                name: name.to_string(),
                available: Self::available().join(", "),
            })?;
        Ok(Self {
            name: *key,
            anchors: *anchors,
            reversed: *reversed,
        })
    }

    /// Names of every registered colormap, sorted.
    pub fn available() -> Vec<&'static str> {
        let mut names: Vec<_> = COLORMAPS.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Colour at `t` in `[0, 1]`; values outside are clamped, NaN maps to the midpoint.
    pub fn color(&self, t: f64) -> RGBColor {
        let t = if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) };
        let t = if self.reversed { 1.0 - t } else { t };

        let last = self.anchors.len() - 1;
        let scaled = t * last as f64;
        let lower = (scaled.floor() as usize).min(last);
        let upper = (lower + 1).min(last);
        let frac = scaled - lower as f64;

        let (r0, g0, b0) = self.anchors[lower];
        let (r1, g1, b1) = self.anchors[upper];
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
        RGBColor(mix(r0, r1), mix(g0, g1), mix(b0, b1))
    }
}

impl Default for Colormap {
    fn default() -> Self {
        Self {
            name: DEFAULT_COLORMAP,
            anchors: PUOR,
            reversed: true,
        }
    }
}

impl FromStr for Colormap {
    type Err = UnknownColormap;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::named(s.trim())
    }
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown normalization '{0}' (expected 'linear' or 'power')")]
pub struct UnknownNormalization(pub String);

/// Maps a data value onto `[0, 1]` for a fixed `(min, max)` range.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Normalization {
    #[default]
    Linear,
    /// `((v - min) / (max - min))^gamma`.
    Power { gamma: f64 },
}

pub const DEFAULT_GAMMA: f64 = 0.75;

impl Normalization {
    pub fn parse(name: &str, gamma: f64) -> Result<Self, UnknownNormalization> {
        match name.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "power" => Ok(Self::Power { gamma }),
            _ => Err(UnknownNormalization(name.to_string())),
        }
    }

    pub fn apply(&self, value: f64, min: f64, max: f64) -> f64 {
        let span = max - min;
        if span <= 0.0 || !span.is_finite() {
            return 0.5;
        }
        let t = ((value - min) / span).clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Power { gamma } => t.powf(*gamma),
        }
    }
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => f.write_str("linear"),
            Self::Power { gamma } => write!(f, "power (gamma = {gamma})"),
        }
    }
}

/// Snaps `t` in `[0, 1]` to the centre of one of `levels` equal bands.
pub fn quantize(t: f64, levels: usize) -> f64 {
    if levels == 0 {
        return t;
    }
    let band = ((t.clamp(0.0, 1.0) * levels as f64).floor() as usize).min(levels - 1);
    (band as f64 + 0.5) / levels as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_match_first_and_last_anchor() {
        let cmap = Colormap::named("PuOr").unwrap();
        assert_eq!(cmap.color(0.0), RGBColor(0x7f, 0x3b, 0x08));
        assert_eq!(cmap.color(1.0), RGBColor(0x2d, 0x00, 0x4b));
        assert_eq!(cmap.color(0.5), RGBColor(0xf7, 0xf7, 0xf7));
    }

    #[test]
    fn reversed_variant_swaps_the_ends() {
        let cmap = Colormap::named("RdBu_r").unwrap();
        assert_eq!(cmap.color(0.0), RGBColor(0x05, 0x30, 0x61));
        assert_eq!(cmap.color(1.0), RGBColor(0x67, 0x00, 0x1f));
    }

    #[test]
    fn colours_between_anchors_are_interpolated() {
        let cmap = Colormap::named("RdBu").unwrap();
        let c = cmap.color(0.05);
        assert_eq!(c, RGBColor(0x8d, 0x0c, 0x25));
    }

    #[test]
    fn out_of_range_input_is_clamped() {
        let cmap = Colormap::default();
        assert_eq!(cmap.color(-3.0), cmap.color(0.0));
        assert_eq!(cmap.color(7.0), cmap.color(1.0));
    }

    #[test]
    fn default_is_reversed_puor() {
        assert_eq!(Colormap::default(), Colormap::named("PuOr_r").unwrap());
        assert_eq!(Colormap::default().to_string(), "PuOr_r");
    }

    #[test]
    fn unknown_colormap_lists_alternatives() {
        let err = "viridis".parse::<Colormap>().unwrap_err();
        assert_eq!(err.name, "viridis");
        assert_eq!(err.available, "PuOr, PuOr_r, RdBu, RdBu_r");
    }

    #[test]
    fn linear_normalization_maps_the_range_to_unit_interval() {
        let n = Normalization::Linear;
        assert_eq!(n.apply(-2000.0, -2000.0, 2000.0), 0.0);
        assert_eq!(n.apply(0.0, -2000.0, 2000.0), 0.5);
        assert_eq!(n.apply(5000.0, -2000.0, 2000.0), 1.0);
    }

    #[test]
    fn power_normalization_raises_to_gamma() {
        let n = Normalization::parse("Power", 0.5).unwrap();
        assert!((n.apply(0.25, 0.0, 1.0) - 0.5).abs() < 1e-12);
        assert!(Normalization::parse("symlog", 1.0).is_err());
    }

    #[test]
    fn degenerate_range_maps_to_the_midpoint() {
        assert_eq!(Normalization::Linear.apply(3.0, 1.0, 1.0), 0.5);
    }

    #[test]
    fn quantize_snaps_to_band_centres() {
        assert_eq!(quantize(0.0, 4), 0.125);
        assert_eq!(quantize(0.3, 4), 0.375);
        assert_eq!(quantize(1.0, 4), 0.875);
        assert_eq!(quantize(0.3, 0), 0.3);
    }
}
