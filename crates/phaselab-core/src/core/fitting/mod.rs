//! # Fitting Module
//!
//! Least-squares fitting of pair-interaction energy curves.
//!
//! ## Key Components
//!
//! - [`potentials`] - Closed-form Lennard-Jones 12-6 energy and its parameter gradient
//! - [`levenberg_marquardt`] - A damped least-squares solver for two-parameter models
//! - [`lennard_jones`] - Lennard-Jones fits of `(r, u)` samples with fitted energies and MSE
//!
//! ## Usage
//!
//! ```ignore
//! use phaselab::core::fitting::lennard_jones::fit_lennard_jones;
//! use phaselab::core::fitting::levenberg_marquardt::LmOptions;
//!
//! let fit = fit_lennard_jones(&samples, &LmOptions::default())?;
//! println!("epsilon={} sigma={}", fit.params.epsilon, fit.params.sigma);
//! ```

pub mod lennard_jones;
pub mod levenberg_marquardt;
pub mod potentials;
