//! # Workflows Module
//!
//! End-to-end analyses. Each workflow takes resolved configuration and a
//! [`ProgressReporter`](crate::engine::progress::ProgressReporter), reads its
//! inputs, writes its outputs and returns a structured result for reporting.
//!
//! - **Degree of Collapse** ([`degree`]) - Per-atom and mean beta-to-omega collapse from a positions or POSCAR file
//! - **Lennard-Jones Fitting** ([`lj_fit`]) - Single-file and batch fits of pair-energy curves with CSV and SVG export
//! - **SVET Maps** ([`svet`]) - Batch rendering of current-density scans on a shared colour range

pub mod degree;
pub mod lj_fit;
pub mod svet;
