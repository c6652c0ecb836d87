//! Bridge benchmarking suite
//!
//! Benchmarks for the console's hot paths: search filtering, store
//! reconciliation of registry responses, and configuration parsing.

pub mod common;

pub use common::*;
