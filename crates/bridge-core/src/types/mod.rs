//! Core data types of the registry.
//!
//! This module provides the fundamental types used throughout Bridge:
//! - Namespace identifiers
//! - Resource records and the payloads used to create and edit them

pub mod namespace;
pub mod resource;

// Re-export all public types
pub use namespace::Namespace;
pub use resource::{Resource, ResourceFields, ResourceId, ResourceUpdate};
