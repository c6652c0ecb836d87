//! Namespace selection and resource cache for the Bridge console
//!
//! This crate keeps an in-memory view of the selected namespace and its
//! resources consistent with a remote registry while operator actions
//! overlap. Namespace loads are versioned by a selection epoch so a response
//! for a namespace that is no longer selected is dropped instead of
//! overwriting the current view. Cache mutations are applied only after the
//! registry confirms them.

pub mod events;
pub mod filter;
pub mod store;

// Re-export main types
pub use events::StoreEvent;
pub use filter::{filter, FilterView};
pub use store::{LastError, Store, StoreSnapshot};

use bridge_core::error::BridgeError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, BridgeError>;
