//! # PhaseLab Core Library
//!
//! Materials-science analysis routines: the degree of beta-to-omega collapse of
//! atomic positions, Lennard-Jones fits of pair-energy curves and current maps
//! from scanning vibrating electrode technique (SVET) measurements.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer layout:
//!
//! - **[`core`]: The Foundation.** Stateless data models, the reference lattice,
//!   collapse metrics, curve fitting, file formats and SVG rendering.
//!
//! - **[`engine`]: Run Support.** Configuration builders, the workflow error type,
//!   batch execution over input directories and progress reporting.
//!
//! - **[`workflows`]: The Public API.** Complete procedures (degree of collapse,
//!   Lennard-Jones fitting, SVET map rendering) that tie `core` and `engine`
//!   together behind a single `run` call each.

pub mod core;
pub mod engine;
pub mod workflows;
