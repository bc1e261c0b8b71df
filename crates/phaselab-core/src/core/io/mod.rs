//! Readers and writers for the text and CSV formats consumed by the analyses.
//!
//! Every reader implements [`traits::DataFile`], which provides the path-based
//! entry points on top of a format-specific `read_from`.

pub mod energy;
pub mod poscar;
pub mod positions;
pub mod scan;
pub mod traits;
