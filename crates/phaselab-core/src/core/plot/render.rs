use super::colormap::{Colormap, Normalization, quantize};
use crate::core::fitting::lennard_jones::LennardJones;
use crate::core::models::energy::FittedSample;
use crate::core::models::scan::{Extent, ScanMap};
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;

const CURVE_RESOLUTION: usize = 200;
const COLORBAR_STEPS: usize = 256;
const MIN_FIGURE_SIDE: u32 = 320;
const MAX_FIGURE_SIDE: u32 = 4000;
const FIGURE_INCHES_PER_MM: (f64, f64) = (1.400, 1.725);
const POINT_OVERLAY_OPACITY: f64 = 0.2;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Drawing failed: {0}")]
    Drawing(String),
    #[error("Nothing to draw for '{0}'")]
    NoData(String),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for RenderError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        Self::Drawing(err.to_string())
    }
}

/// Colour settings shared by every map of a batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapStyle {
    pub colormap: Colormap,
    pub normalization: Normalization,
    pub min: f64,
    pub max: f64,
    pub dpi: u32,
}

impl MapStyle {
    fn color_of(&self, value: f64, levels: Option<usize>) -> RGBColor {
        let t = self.normalization.apply(value, self.min, self.max);
        let t = levels.map_or(t, |n| quantize(t, n));
        self.colormap.color(t)
    }
}

/// Widens an empty or inverted range so a chart can be built on it.
fn padded_range(min: f64, max: f64, fraction: f64) -> (f64, f64) {
    let span = max - min;
    if !span.is_finite() || span <= 0.0 {
        let pad = if min.abs() > 0.0 { min.abs() * 0.1 } else { 1.0 };
        return (min - pad, min + pad);
    }
    (min - span * fraction, max + span * fraction)
}

/// Pixel size of a map figure covering `extent` (micrometres).
pub fn figure_size(extent: &Extent, dpi: u32) -> (u32, u32) {
    let side = |length: f64, inches_per_mm: f64| {
        let px = length / 1000.0 * inches_per_mm * dpi as f64;
        if px.is_finite() {
            (px.round() as u32).clamp(MIN_FIGURE_SIDE, MAX_FIGURE_SIDE)
        } else {
            MIN_FIGURE_SIDE
        }
    };
    (
        side(extent.width(), FIGURE_INCHES_PER_MM.0),
        side(extent.height(), FIGURE_INCHES_PER_MM.1),
    )
}

/// Data points in red and the fitted Lennard-Jones curve in blue.
pub fn render_fit_chart(
    path: &Path,
    name: &str,
    samples: &[FittedSample],
    params: &LennardJones,
    size: (u32, u32),
) -> Result<(), RenderError> {
    if samples.is_empty() {
        return Err(RenderError::NoData(name.to_string()));
    }

    let (r_lo, r_hi) = samples
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
            (lo.min(s.r), hi.max(s.r))
        });
    let curve: Vec<(f64, f64)> = (0..=CURVE_RESOLUTION)
        .map(|i| {
            let r = r_lo + (r_hi - r_lo) * i as f64 / CURVE_RESOLUTION as f64;
            (r, params.energy(r))
        })
        .collect();
    let (u_lo, u_hi) = samples
        .iter()
        .map(|s| s.u)
        .chain(curve.iter().map(|&(_, u)| u))
        .filter(|u| u.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), u| {
            (lo.min(u), hi.max(u))
        });

    let (x_min, x_max) = padded_range(r_lo, r_hi, 0.02);
    let (y_min, y_max) = padded_range(u_lo, u_hi, 0.05);

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{name} interaction"), ("sans-serif", 20))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Rij (angstrom)")
        .y_desc("Energy (eV)")
        .draw()?;

    chart.draw_series(
        samples
            .iter()
            .map(|s| Circle::new((s.r, s.u), 3, RED.filled())),
    )?;
    chart.draw_series(LineSeries::new(curve, ShapeStyle::from(&BLUE).stroke_width(2)))?;

    root.present()?;
    Ok(())
}

fn render_cells(
    path: &Path,
    map: &ScanMap,
    style: &MapStyle,
    levels: Option<usize>,
    overlay_points: bool,
) -> Result<(), RenderError> {
    let extent = map
        .extent()
        .ok_or_else(|| RenderError::NoData(map.name.clone()))?;
    let (dx, dy) = map.grid_spacing();
    let (hx, hy) = (dx / 2.0, dy / 2.0);

    let (x_min, x_max) = padded_range(extent.min_x - hx, extent.max_x + hx, 0.0);
    let (y_min, y_max) = padded_range(extent.min_y - hy, extent.max_y + hy, 0.0);

    let root = SVGBackend::new(path, figure_size(&extent, style.dpi)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(&map.name, ("sans-serif", 18))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart.configure_mesh().disable_mesh().draw()?;

    chart.draw_series(map.points.iter().map(|p| {
        Rectangle::new(
            [(p.x - hx, p.y - hy), (p.x + hx, p.y + hy)],
            style.color_of(p.current, levels).filled(),
        )
    }))?;

    if overlay_points {
        chart.draw_series(
            map.points
                .iter()
                .map(|p| Circle::new((p.x, p.y), 1, BLACK.mix(POINT_OVERLAY_OPACITY).filled())),
        )?;
    }

    root.present()?;
    Ok(())
}

/// Continuous cell map of one scan with the sample points overlaid.
pub fn render_scan_map(path: &Path, map: &ScanMap, style: &MapStyle) -> Result<(), RenderError> {
    render_cells(path, map, style, None, true)
}

/// Cell map with colours snapped to `levels` discrete bands.
pub fn render_levels_map(
    path: &Path,
    map: &ScanMap,
    style: &MapStyle,
    levels: usize,
) -> Result<(), RenderError> {
    render_cells(path, map, style, Some(levels.max(1)), false)
}

/// Vertical colour bar spanning the shared range of `style`.
pub fn render_colorbar(path: &Path, style: &MapStyle, label: &str) -> Result<(), RenderError> {
    let (min, max) = padded_range(style.min, style.max, 0.0);
    let step = (max - min) / COLORBAR_STEPS as f64;

    let root = SVGBackend::new(path, (180, 640)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(15)
        .x_label_area_size(10)
        .y_label_area_size(80)
        .build_cartesian_2d(0.0..1.0, min..max)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(0)
        .y_desc(label)
        .draw()?;

    chart.draw_series((0..COLORBAR_STEPS).map(|i| {
        let lo = min + step * i as f64;
        let value = lo + step / 2.0;
        Rectangle::new([(0.0, lo), (1.0, lo + step)], style.color_of(value, None).filled())
    }))?;

    root.present()?;
    Ok(())
}
