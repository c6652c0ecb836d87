//! Namespace selection and resource cache

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use bridge_core::error::{BridgeError, ErrorKind};
use bridge_core::types::{Namespace, Resource, ResourceFields, ResourceUpdate};
use bridge_registry::Registry;

use crate::events::StoreEvent;
use crate::filter::filter;
use crate::StoreResult;

/// Capacity of the event channel; slow subscribers observe `Lagged`
const EVENT_CAPACITY: usize = 64;

/// Last failure recorded by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&BridgeError> for LastError {
    fn from(err: &BridgeError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Point-in-time copy of the store state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    /// Selected namespace; empty until the namespace list first resolves
    pub current_namespace: Option<Namespace>,
    /// Namespaces known to the console, in registry order
    pub namespaces: Vec<Namespace>,
    /// Cached resources of `current_namespace` only
    pub resources: Vec<Resource>,
    /// A namespace load is in flight
    pub pending: bool,
    pub last_error: Option<LastError>,
    /// Selection epoch, bumped on every selection
    pub epoch: u64,
    /// Responses discarded because their selection was superseded
    pub stale_dropped: u64,
}

impl StoreSnapshot {
    /// Resources matching a search term, see [`filter`]
    pub fn visible_resources(&self, term: &str) -> Vec<&Resource> {
        filter(&self.resources, term)
    }

    /// Cached resource with the given name
    pub fn resource(&self, name: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.name == name)
    }

    pub fn knows_namespace(&self, namespace: &Namespace) -> bool {
        self.namespaces.contains(namespace)
    }
}

/// Selection and cache store over a [`Registry`].
///
/// All operations take `&self` and may overlap; the state lock is never held
/// across a registry call. A namespace load is applied only if no other
/// selection happened while it was in flight. Add, update and delete results
/// are applied only if the selection they were issued under is still current.
pub struct Store<R> {
    registry: R,
    state: Mutex<StoreSnapshot>,
    events: broadcast::Sender<StoreEvent>,
    /// Selected by `initialize` instead of the first namespace when present
    preferred_namespace: Option<Namespace>,
}

impl<R: Registry> Store<R> {
    /// Create an empty store; call [`Store::initialize`] to load it
    pub fn new(registry: R) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            registry,
            state: Mutex::new(StoreSnapshot::default()),
            events,
            preferred_namespace: None,
        }
    }

    /// Prefer `namespace` over the first listed one on initialize
    pub fn with_preferred_namespace(mut self, namespace: Option<Namespace>) -> Self {
        self.preferred_namespace = namespace;
        self
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> StoreSnapshot {
        self.state.lock().clone()
    }

    /// Receive an event after every state transition
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub fn current_namespace(&self) -> Option<Namespace> {
        self.state.lock().current_namespace.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.state.lock().pending
    }

    pub fn last_error(&self) -> Option<LastError> {
        self.state.lock().last_error.clone()
    }

    /// Load the namespace list and select a namespace.
    ///
    /// Keeps the current selection if the registry still lists it, otherwise
    /// selects the preferred namespace or the first entry. On failure the
    /// namespace list keeps its last loaded value.
    pub async fn initialize(&self) -> StoreResult<()> {
        let issued = self.state.lock().epoch;

        let namespaces = match self.registry.list_namespaces().await {
            Ok(namespaces) => namespaces,
            Err(err) => {
                self.record_failure(&err);
                return Err(err);
            }
        };

        let (target, cleared) = {
            let mut state = self.state.lock();
            state.namespaces = namespaces;

            if state.epoch != issued {
                // An explicit selection happened while the list was loading
                (None, false)
            } else if state.namespaces.is_empty() {
                let cleared = state.current_namespace.take().is_some();
                if cleared {
                    state.epoch += 1;
                    state.resources.clear();
                    state.pending = false;
                }
                (None, cleared)
            } else {
                let target = state
                    .current_namespace
                    .clone()
                    .filter(|ns| state.namespaces.contains(ns))
                    .or_else(|| {
                        self.preferred_namespace
                            .clone()
                            .filter(|ns| state.namespaces.contains(ns))
                    })
                    .or_else(|| state.namespaces.first().cloned());
                (target, false)
            }
        };

        let count = self.state.lock().namespaces.len();
        debug!("loaded {} namespaces", count);
        self.emit(StoreEvent::NamespacesLoaded { count });
        if cleared {
            self.emit(StoreEvent::SelectionCleared);
        }

        match target {
            Some(namespace) => self.select_namespace(namespace).await,
            None => Ok(()),
        }
    }

    /// Select `namespace` and load its resources.
    ///
    /// If another selection is made before the load resolves, the load's
    /// result (success or failure) is discarded.
    pub async fn select_namespace(&self, namespace: Namespace) -> StoreResult<()> {
        let issued = {
            let mut state = self.state.lock();
            if !state.namespaces.contains(&namespace) {
                return Err(BridgeError::UnknownNamespace {
                    namespace: namespace.to_string(),
                });
            }
            state.epoch += 1;
            state.current_namespace = Some(namespace.clone());
            state.resources.clear();
            state.pending = true;
            state.last_error = None;
            state.epoch
        };
        debug!("selecting namespace '{}' (epoch {})", namespace, issued);
        self.emit(StoreEvent::SelectionChanged {
            namespace: namespace.clone(),
            epoch: issued,
        });

        let result = self.registry.list_resources(&namespace).await;

        let outcome = {
            let mut state = self.state.lock();
            if state.epoch != issued {
                state.stale_dropped += 1;
                None
            } else {
                state.pending = false;
                Some(match result {
                    Ok(resources) => {
                        let count = resources.len();
                        state.resources = resources;
                        Ok(count)
                    }
                    Err(err) => {
                        state.resources.clear();
                        state.last_error = Some(LastError::from(&err));
                        Err(err)
                    }
                })
            }
        };

        match outcome {
            None => {
                warn!(
                    "dropping resources of '{}' loaded under superseded epoch {}",
                    namespace, issued
                );
                self.emit(StoreEvent::StaleResponseDropped {
                    namespace,
                    epoch: issued,
                });
                Ok(())
            }
            Some(Ok(count)) => {
                debug!("loaded {} resources in '{}'", count, namespace);
                self.emit(StoreEvent::ResourcesLoaded { namespace, count });
                Ok(())
            }
            Some(Err(err)) => {
                self.emit_failure(&err);
                Err(err)
            }
        }
    }

    /// Reload the selected namespace
    pub async fn refresh(&self) -> StoreResult<()> {
        let namespace = self
            .current_namespace()
            .ok_or(BridgeError::NoNamespaceSelected)?;
        self.select_namespace(namespace).await
    }

    /// Create a resource in the selected namespace.
    ///
    /// Returns the registry's representation even when the selection changed
    /// meanwhile and the cache was therefore left alone.
    pub async fn add_resource(&self, fields: ResourceFields) -> StoreResult<Resource> {
        let (namespace, issued) = self.begin_write()?;

        let created = match self.registry.create_resource(&namespace, &fields).await {
            Ok(created) => created,
            Err(err) => return Err(self.write_failed(namespace, issued, err)),
        };

        let applied = self.apply_if_current(issued, |resources| {
            // A reload that landed first may already list the new entry
            match resources.iter().position(|r| r.name == created.name) {
                Some(index) => resources[index] = created.clone(),
                None => resources.push(created.clone()),
            }
        });
        if applied {
            info!("added resource '{}' to '{}'", created.name, namespace);
            self.emit(StoreEvent::ResourceAdded {
                namespace,
                name: created.name.clone(),
            });
        } else {
            self.emit_stale(namespace, issued);
        }
        Ok(created)
    }

    /// Edit the cached resource named `name`.
    ///
    /// The update is merged into the cached record and the full record is
    /// sent. The cache entry is replaced by the registry's response; nothing
    /// changes locally before the registry confirms.
    pub async fn update_resource(&self, name: &str, update: ResourceUpdate) -> StoreResult<Resource> {
        let (namespace, issued, fields) = {
            let mut state = self.state.lock();
            let namespace = state
                .current_namespace
                .clone()
                .ok_or(BridgeError::NoNamespaceSelected)?;
            let fields = match state.resources.iter().find(|r| r.name == name) {
                Some(cached) => cached.merged_with(&update).to_fields(),
                None => {
                    return Err(BridgeError::NotFound {
                        target: format!("resource '{}' in namespace '{}'", name, namespace),
                    })
                }
            };
            state.last_error = None;
            (namespace, state.epoch, fields)
        };

        let updated = match self.registry.update_resource(&namespace, name, &fields).await {
            Ok(updated) => updated,
            Err(err) => return Err(self.write_failed(namespace, issued, err)),
        };

        let applied = self.apply_if_current(issued, |resources| {
            if let Some(slot) = resources.iter_mut().find(|r| r.name == name) {
                *slot = updated.clone();
            }
        });
        if applied {
            info!("updated resource '{}' in '{}'", name, namespace);
            self.emit(StoreEvent::ResourceUpdated {
                namespace,
                name: name.to_string(),
            });
        } else {
            self.emit_stale(namespace, issued);
        }
        Ok(updated)
    }

    /// Delete the resource named `name` from the selected namespace
    pub async fn delete_resource(&self, name: &str) -> StoreResult<()> {
        let (namespace, issued) = self.begin_write()?;

        if let Err(err) = self.registry.delete_resource(&namespace, name).await {
            return Err(self.write_failed(namespace, issued, err));
        }

        let applied = self.apply_if_current(issued, |resources| {
            resources.retain(|r| r.name != name);
        });
        if applied {
            info!("deleted resource '{}' from '{}'", name, namespace);
            self.emit(StoreEvent::ResourceDeleted {
                namespace,
                name: name.to_string(),
            });
        } else {
            self.emit_stale(namespace, issued);
        }
        Ok(())
    }

    /// Create a namespace and select it
    pub async fn add_namespace(&self, namespace: Namespace) -> StoreResult<()> {
        self.state.lock().last_error = None;

        if let Err(err) = self.registry.create_namespace(&namespace).await {
            self.record_failure(&err);
            return Err(err);
        }

        {
            let mut state = self.state.lock();
            if !state.namespaces.contains(&namespace) {
                state.namespaces.push(namespace.clone());
            }
        }
        info!("created namespace '{}'", namespace);
        self.emit(StoreEvent::NamespaceAdded {
            namespace: namespace.clone(),
        });

        self.select_namespace(namespace).await
    }

    /// Capture the selection a write is issued under
    fn begin_write(&self) -> StoreResult<(Namespace, u64)> {
        let mut state = self.state.lock();
        let namespace = state
            .current_namespace
            .clone()
            .ok_or(BridgeError::NoNamespaceSelected)?;
        state.last_error = None;
        Ok((namespace, state.epoch))
    }

    /// Mutate the cache if the selection epoch is still `issued`
    fn apply_if_current<F>(&self, issued: u64, mutate: F) -> bool
    where
        F: FnOnce(&mut Vec<Resource>),
    {
        let mut state = self.state.lock();
        if state.epoch != issued {
            state.stale_dropped += 1;
            return false;
        }
        mutate(&mut state.resources);
        true
    }

    /// Record a failed write unless its selection was superseded
    fn write_failed(&self, namespace: Namespace, issued: u64, err: BridgeError) -> BridgeError {
        let current = {
            let mut state = self.state.lock();
            if state.epoch == issued {
                state.last_error = Some(LastError::from(&err));
                true
            } else {
                state.stale_dropped += 1;
                false
            }
        };

        if current {
            self.emit_failure(&err);
        } else {
            debug!("dropping failure of superseded write: {}", err);
            self.emit_stale(namespace, issued);
        }
        err
    }

    fn record_failure(&self, err: &BridgeError) {
        self.state.lock().last_error = Some(LastError::from(err));
        self.emit_failure(err);
    }

    fn emit_failure(&self, err: &BridgeError) {
        debug!("store operation failed: {}", err);
        self.emit(StoreEvent::Failed {
            kind: err.kind(),
            message: err.to_string(),
        });
    }

    fn emit_stale(&self, namespace: Namespace, epoch: u64) {
        warn!(
            "selection changed while writing to '{}'; cache left untouched",
            namespace
        );
        self.emit(StoreEvent::StaleResponseDropped { namespace, epoch });
    }

    fn emit(&self, event: StoreEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}
