//! Notifications published after each store state transition

use bridge_core::error::ErrorKind;
use bridge_core::types::Namespace;

/// A state transition of the [`Store`](crate::Store).
///
/// Subscribers re-read [`Store::snapshot`](crate::Store::snapshot) on receipt;
/// events carry just enough to log or target a redraw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// The namespace list was (re)loaded
    NamespacesLoaded { count: usize },
    /// A new selection was made and its load issued
    SelectionChanged { namespace: Namespace, epoch: u64 },
    /// The selected namespace finished loading
    ResourcesLoaded { namespace: Namespace, count: usize },
    /// The selection was cleared because the registry has no namespaces
    SelectionCleared,
    ResourceAdded { namespace: Namespace, name: String },
    ResourceUpdated { namespace: Namespace, name: String },
    ResourceDeleted { namespace: Namespace, name: String },
    NamespaceAdded { namespace: Namespace },
    /// A response arrived for a superseded selection and was discarded
    StaleResponseDropped { namespace: Namespace, epoch: u64 },
    /// An operation failed and was recorded as the last error
    Failed { kind: ErrorKind, message: String },
}

impl StoreEvent {
    /// True for events that change what the resource table shows
    pub fn affects_resources(&self) -> bool {
        matches!(
            self,
            StoreEvent::SelectionChanged { .. }
                | StoreEvent::ResourcesLoaded { .. }
                | StoreEvent::SelectionCleared
                | StoreEvent::ResourceAdded { .. }
                | StoreEvent::ResourceUpdated { .. }
                | StoreEvent::ResourceDeleted { .. }
        )
    }
}
