//! Client for the Bridge resource registry
//!
//! This crate provides a thin typed wrapper over the registry's REST surface.
//! It owns no state: every call is a single request/response pair with no
//! retries, batching or caching.

pub mod api;
pub mod client;

// Re-export main types
pub use api::{ErrorBody, NamespaceList, NewNamespace, ResourcePage};
pub use client::{ClientConfig, RegistryClient};

use bridge_core::error::BridgeError;
use bridge_core::types::{Namespace, Resource, ResourceFields};

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, BridgeError>;

/// Operations the console needs from a registry.
///
/// [`RegistryClient`] is the HTTP implementation; the console store is
/// generic over this trait so it can be driven by an in-memory registry.
#[allow(async_fn_in_trait)]
pub trait Registry {
    /// `GET /namespaces`
    async fn list_namespaces(&self) -> RegistryResult<Vec<Namespace>>;

    /// `GET /resource/{namespace}/all`
    async fn list_resources(&self, namespace: &Namespace) -> RegistryResult<Vec<Resource>>;

    /// `GET /resource/{namespace}/{name}`
    async fn get_resource(&self, namespace: &Namespace, name: &str) -> RegistryResult<Resource>;

    /// `POST /resource/{namespace}`
    async fn create_resource(
        &self,
        namespace: &Namespace,
        fields: &ResourceFields,
    ) -> RegistryResult<Resource>;

    /// `PUT /resource/{namespace}/{name}`
    ///
    /// The registry overwrites every field, so `fields` must be the complete
    /// record.
    async fn update_resource(
        &self,
        namespace: &Namespace,
        name: &str,
        fields: &ResourceFields,
    ) -> RegistryResult<Resource>;

    /// `DELETE /resource/{namespace}/{name}`
    async fn delete_resource(&self, namespace: &Namespace, name: &str) -> RegistryResult<()>;

    /// `POST /namespace`
    async fn create_namespace(&self, namespace: &Namespace) -> RegistryResult<()>;
}
