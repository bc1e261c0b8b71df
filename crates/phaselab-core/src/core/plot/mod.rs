//! # Plot Module
//!
//! SVG rendering for fitted energy curves and SVET current maps.
//!
//! - [`colormap`] - Named diverging colormaps, value normalization and level quantization
//! - [`render`] - Chart, cell map, level map and colour bar writers built on `plotters`

pub mod colormap;
pub mod render;
