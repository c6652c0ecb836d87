//! HTTP client implementation for the registry REST surface

use std::time::Duration;

use reqwest::{Client, ClientBuilder, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use bridge_core::error::BridgeError;
use bridge_core::types::{Namespace, Resource, ResourceFields};

use crate::api::{ErrorBody, NamespaceList, NewNamespace, ResourcePage};
use crate::{Registry, RegistryResult};

/// Connection settings for [`RegistryClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every registry path is appended to
    pub base_url: String,
    /// Whole-request timeout
    pub timeout: Duration,
    /// TCP connect timeout
    pub connect_timeout: Duration,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: concat!("bridge/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// HTTP client for registry operations
#[derive(Debug, Clone)]
pub struct RegistryClient {
    /// Underlying HTTP client with connection pooling
    client: Client,
    /// Base registry URL
    base_url: Url,
    /// Request timeout, reported in timeout errors
    timeout: Duration,
}

impl RegistryClient {
    /// Create a client for the default local registry
    pub fn new() -> RegistryResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: ClientConfig) -> RegistryResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| BridgeError::ConfigValidation {
            field: "registry.url".to_string(),
            reason: format!("'{}' is not a valid URL: {}", config.base_url, e),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(BridgeError::ConfigValidation {
                field: "registry.url".to_string(),
                reason: format!("'{}' cannot be used as a base URL", config.base_url),
            });
        }

        let client = ClientBuilder::new()
            // Connection pooling configuration
            .pool_max_idle_per_host(8)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .gzip(true)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| BridgeError::transport(format!("Failed to create HTTP client: {}", e), e))?;

        Ok(Self {
            client,
            base_url,
            timeout: config.timeout,
        })
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // `with_config` rejects cannot-be-a-base URLs
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.endpoint(segments);
        debug!("{} {}", method, url.path());
        self.client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    /// Send a request and decode a JSON body.
    ///
    /// `target` names the namespace or resource the call is about; when it is
    /// `None`, 404 and 409 are treated as plain HTTP failures.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        target: Option<String>,
    ) -> RegistryResult<T> {
        let response = self.send(request, target).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| BridgeError::transport(format!("Failed to decode registry response: {}", e), e))
    }

    /// Send a request, discarding the success body
    async fn send_unit(&self, request: RequestBuilder, target: Option<String>) -> RegistryResult<()> {
        let response = self.send(request, target).await?;
        let body = response.text().await.unwrap_or_default();
        if !body.is_empty() {
            debug!("registry replied: {}", body.trim());
        }
        Ok(())
    }

    async fn send(
        &self,
        request: RequestBuilder,
        target: Option<String>,
    ) -> RegistryResult<reqwest::Response> {
        let response = request.send().await.map_err(|e| {
            let message = if e.is_timeout() {
                format!("Request timed out after {:?}", self.timeout)
            } else if e.is_connect() {
                format!("Failed to connect to registry at {}", self.base_url)
            } else {
                format!("Request failed: {}", e)
            };
            BridgeError::transport(message, e)
        })?;

        let status = response.status();
        debug!("registry responded {}", status);
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.describe());
        Err(classify(status, target, body))
    }
}

/// Map a non-success status onto the error taxonomy
fn classify(status: StatusCode, target: Option<String>, body: Option<String>) -> BridgeError {
    match (status, target) {
        (StatusCode::NOT_FOUND, Some(target)) => BridgeError::NotFound { target },
        (StatusCode::CONFLICT, Some(target)) => BridgeError::Conflict { target },
        (status, _) => {
            let message = match body {
                Some(body) => format!("Registry returned status {}: {}", status, body),
                None => format!("Registry returned status {}", status),
            };
            BridgeError::status(status.as_u16(), message)
        }
    }
}

fn namespace_target(namespace: &Namespace) -> String {
    format!("namespace '{}'", namespace)
}

fn resource_target(namespace: &Namespace, name: &str) -> String {
    format!("resource '{}' in namespace '{}'", name, namespace)
}

impl Registry for RegistryClient {
    async fn list_namespaces(&self) -> RegistryResult<Vec<Namespace>> {
        let request = self.request(Method::GET, &["namespaces"]);
        let list: NamespaceList = self.send_json(request, None).await?;
        Ok(list.namespaces)
    }

    async fn list_resources(&self, namespace: &Namespace) -> RegistryResult<Vec<Resource>> {
        let request = self.request(Method::GET, &["resource", namespace.as_str(), "all"]);
        let page: ResourcePage = self
            .send_json(request, Some(namespace_target(namespace)))
            .await?;
        if page.is_truncated() {
            warn!(
                "registry returned {} of {} resources in namespace '{}'",
                page.resources.len(),
                page.total.unwrap_or_default(),
                namespace
            );
        }
        Ok(page.resources)
    }

    async fn get_resource(&self, namespace: &Namespace, name: &str) -> RegistryResult<Resource> {
        let request = self.request(Method::GET, &["resource", namespace.as_str(), name]);
        self.send_json(request, Some(resource_target(namespace, name)))
            .await
    }

    async fn create_resource(
        &self,
        namespace: &Namespace,
        fields: &ResourceFields,
    ) -> RegistryResult<Resource> {
        let request = self
            .request(Method::POST, &["resource", namespace.as_str()])
            .json(fields);
        self.send_json(request, Some(resource_target(namespace, &fields.name)))
            .await
    }

    async fn update_resource(
        &self,
        namespace: &Namespace,
        name: &str,
        fields: &ResourceFields,
    ) -> RegistryResult<Resource> {
        let request = self
            .request(Method::PUT, &["resource", namespace.as_str(), name])
            .json(fields);
        self.send_json(request, Some(resource_target(namespace, name)))
            .await
    }

    async fn delete_resource(&self, namespace: &Namespace, name: &str) -> RegistryResult<()> {
        let request = self.request(Method::DELETE, &["resource", namespace.as_str(), name]);
        self.send_unit(request, Some(resource_target(namespace, name)))
            .await
    }

    async fn create_namespace(&self, namespace: &Namespace) -> RegistryResult<()> {
        let request = self.request(Method::POST, &["namespace"]).json(&NewNamespace {
            namespace: namespace.as_str(),
        });
        self.send_unit(request, Some(namespace_target(namespace)))
            .await
    }
}
