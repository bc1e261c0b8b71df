//! # Engine Module
//!
//! Run-level machinery shared by the workflows.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Resolved settings for each analysis and their builders
//! - **Batch Processing** ([`batch`]) - Input discovery, results directories and per-file execution
//! - **Progress Monitoring** ([`progress`]) - Progress events for front ends
//! - **Error Handling** ([`error`]) - The error type every workflow returns
//!
//! Batches run their files on the `rayon` pool when the `parallel` feature is
//! enabled (the default); a failing file is recorded and the batch continues.

pub mod batch;
pub mod config;
pub mod error;
pub mod progress;
