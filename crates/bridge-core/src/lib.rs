//! # bridge-core
//!
//! Core types shared across all Bridge crates.
//!
//! This crate provides:
//! - `Resource`, its write payload `ResourceFields` and the `ResourceUpdate` edit
//! - `Namespace` identifiers
//! - `BridgeError` enum for unified error handling, and the cloneable
//!   `ErrorKind` projection stored in console state
//!
//! ## Architecture
//!
//! - `types`: registry data model
//! - `error`: error types and result aliases

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{BridgeError, BridgeResult, ErrorKind};
pub use types::{Namespace, Resource, ResourceFields, ResourceId, ResourceUpdate};
