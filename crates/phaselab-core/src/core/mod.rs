//! # Core Module
//!
//! Stateless building blocks shared by every PhaseLab workflow.
//!
//! ## Architecture
//!
//! - **Reference Geometry** ([`lattice`]) - The beta reference lattice and nearest-position lookup
//! - **Collapse Metrics** ([`collapse`]) - Per-axis deviations, per-atom degree and summary statistics
//! - **Data Models** ([`models`]) - Atom records, energy samples and SVET scan maps
//! - **File I/O** ([`io`]) - Position lists, POSCAR/CONTCAR structures and CSV data files
//! - **Curve Fitting** ([`fitting`]) - Lennard-Jones potentials and a Levenberg-Marquardt solver
//! - **Rendering** ([`plot`]) - Colormaps and SVG output
//!
//! Nothing in this layer keeps global state: loaders return owned collections
//! and every computation is a pure function of its inputs.

pub mod collapse;
pub mod fitting;
pub mod io;
pub mod lattice;
pub mod models;
pub mod plot;
