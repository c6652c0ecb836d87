//! Common utilities for benchmarks

use std::collections::HashMap;
use std::time::Duration;

use criterion::Criterion;
use parking_lot::Mutex;

use bridge_core::error::BridgeError;
use bridge_core::types::{Namespace, Resource, ResourceFields};
use bridge_registry::{Registry, RegistryResult};

/// Criterion settings shared by every bench
pub fn criterion_config() -> Criterion {
    Criterion::default()
        .warm_up_time(Duration::from_secs(2))
        .measurement_time(Duration::from_secs(5))
        .sample_size(50)
}

/// `count` resources with a mix of name shapes
pub fn generate_resources(count: usize) -> Vec<Resource> {
    const PREFIXES: [&str; 5] = ["db", "Cache", "queue", "API-key", "bucket"];

    (0..count)
        .map(|i| {
            let name = format!("{}-{:05}", PREFIXES[i % PREFIXES.len()], i);
            Resource::from_fields(
                i as i64,
                ResourceFields::new(name.clone())
                    .arn(format!("arn:bridge:{}", name))
                    .resource_type("parameter")
                    .value("v1"),
            )
        })
        .collect()
}

/// Registry answering from memory without yielding
#[derive(Default)]
pub struct InMemoryRegistry {
    namespaces: Mutex<HashMap<Namespace, Vec<Resource>>>,
    next_id: Mutex<i64>,
}

impl InMemoryRegistry {
    /// Registry whose namespaces each hold `per_namespace` resources
    pub fn seeded(namespaces: &[&str], per_namespace: usize) -> Self {
        let registry = Self::default();
        {
            let mut map = registry.namespaces.lock();
            for name in namespaces {
                map.insert(Namespace::new(*name), generate_resources(per_namespace));
            }
        }
        *registry.next_id.lock() = per_namespace as i64;
        registry
    }

    fn missing(namespace: &Namespace, name: &str) -> BridgeError {
        BridgeError::NotFound {
            target: format!("resource '{}' in namespace '{}'", name, namespace),
        }
    }
}

impl Registry for InMemoryRegistry {
    async fn list_namespaces(&self) -> RegistryResult<Vec<Namespace>> {
        let mut names: Vec<Namespace> = self.namespaces.lock().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn list_resources(&self, namespace: &Namespace) -> RegistryResult<Vec<Resource>> {
        self.namespaces
            .lock()
            .get(namespace)
            .cloned()
            .ok_or_else(|| BridgeError::NotFound {
                target: format!("namespace '{}'", namespace),
            })
    }

    async fn get_resource(&self, namespace: &Namespace, name: &str) -> RegistryResult<Resource> {
        self.namespaces
            .lock()
            .get(namespace)
            .and_then(|resources| resources.iter().find(|r| r.name == name).cloned())
            .ok_or_else(|| Self::missing(namespace, name))
    }

    async fn create_resource(
        &self,
        _namespace: &Namespace,
        fields: &ResourceFields,
    ) -> RegistryResult<Resource> {
        // Benches create throwaway entries; the stored set stays fixed
        let mut next_id = self.next_id.lock();
        *next_id += 1;
        Ok(Resource::from_fields(*next_id, fields.clone()))
    }

    async fn update_resource(
        &self,
        namespace: &Namespace,
        name: &str,
        fields: &ResourceFields,
    ) -> RegistryResult<Resource> {
        let current = self.get_resource(namespace, name).await?;
        Ok(Resource::from_fields(current.id, fields.clone()))
    }

    async fn delete_resource(&self, _namespace: &Namespace, _name: &str) -> RegistryResult<()> {
        Ok(())
    }

    async fn create_namespace(&self, namespace: &Namespace) -> RegistryResult<()> {
        self.namespaces
            .lock()
            .entry(namespace.clone())
            .or_default();
        Ok(())
    }
}
