//! # Core Models Module
//!
//! Plain value types shared by the analysis routines. Each type holds data only;
//! computing, reading and presenting it is done elsewhere in the crate.
//!
//! ## Key Components
//!
//! - [`atom`] - An atom's fractional position and its collapse metrics
//! - [`energy`] - Pair energy samples `u(r)` and named energy curves
//! - [`scan`] - SVET current-density samples over a scanned surface

pub mod atom;
pub mod energy;
pub mod scan;
