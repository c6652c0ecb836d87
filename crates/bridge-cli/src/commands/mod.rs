//! Command implementations and dispatch logic.
//!
//! Each command opens a fresh [`Store`] over the configured registry, lets it
//! load the namespace list, and then drives it.

use std::collections::HashMap;

use camino::Utf8PathBuf;
use tracing::{debug, info};

use bridge_config::{ConfigLayering, ConfigLoader, ResolvedConfig};
use bridge_core::error::{BridgeError, BridgeResult};
use bridge_core::types::{Namespace, ResourceFields, ResourceUpdate};
use bridge_registry::{ClientConfig, Registry, RegistryClient};
use bridge_store::Store;

pub mod add;
pub mod delete;
pub mod get;
pub mod list;
pub mod namespaces;
pub mod update;
pub mod watch;

#[cfg(test)]
mod tests;

use crate::{output::OutputHandler, Commands, FieldArgs, GlobalArgs};

/// Shared context for all commands
pub struct CommandContext {
    pub cwd: Utf8PathBuf,
    pub output: OutputHandler,
    pub config: ResolvedConfig,
}

impl CommandContext {
    /// Resolve configuration for the current directory and flags
    pub async fn new(global: &GlobalArgs) -> BridgeResult<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| BridgeError::io("Failed to get current directory".to_string(), e))?;
        let cwd = Utf8PathBuf::try_from(cwd).map_err(|e| BridgeError::ConfigValidation {
            field: "cwd".to_string(),
            reason: format!("current directory is not valid UTF-8: {}", e),
        })?;

        let config = resolve_config(&cwd, global, ConfigLayering::collect_env_overrides()).await?;

        Ok(Self {
            cwd,
            output: OutputHandler::new(),
            config,
        })
    }

    /// Registry client built from the resolved configuration
    pub fn client(&self) -> BridgeResult<RegistryClient> {
        RegistryClient::with_config(ClientConfig {
            base_url: self.config.api_url.clone(),
            timeout: self.config.timeout,
            connect_timeout: self.config.connect_timeout,
            user_agent: self.config.user_agent.clone(),
        })
    }

    /// Store over the configured registry with its namespace list loaded
    pub async fn open_store(&self) -> BridgeResult<Store<RegistryClient>> {
        let store = Store::new(self.client()?)
            .with_preferred_namespace(self.config.default_namespace.clone().map(Namespace::new));
        store.initialize().await?;
        Ok(store)
    }
}

/// Merge config files, environment overrides and flags
pub async fn resolve_config(
    cwd: &Utf8PathBuf,
    global: &GlobalArgs,
    env_overrides: HashMap<String, String>,
) -> BridgeResult<ResolvedConfig> {
    let loader = ConfigLoader::new(cwd.clone());

    let global_config = loader.load_global_config().await?;
    let project_config = loader.load_project_config(global.config.as_deref()).await?;
    for (_, source) in global_config.iter().chain(project_config.iter()) {
        debug!("loaded config layer {:?}", source);
    }

    let mut cli_overrides = HashMap::new();
    if let Some(url) = &global.api_url {
        cli_overrides.insert("api-url".to_string(), url.clone());
    }
    if let Some(timeout) = global.timeout {
        cli_overrides.insert("timeout".to_string(), timeout.to_string());
    }

    ConfigLayering::new()
        .with_global(global_config.map(|(config, _)| config))
        .with_project(project_config.map(|(config, _)| config))
        .with_env(env_overrides)
        .with_cli(cli_overrides)
        .resolve()
}

/// Dispatch a command to its handler
pub async fn dispatch_command(command: Commands, ctx: &CommandContext) -> BridgeResult<()> {
    info!("Using registry at {}", ctx.config.api_url);

    match command {
        Commands::Namespaces => {
            let store = ctx.open_store().await?;
            namespaces::list(&store, ctx).await
        }
        Commands::List { namespace, search } => {
            let store = ctx.open_store().await?;
            list::execute(&store, namespace, search, ctx).await
        }
        Commands::Get { name, namespace } => {
            let store = ctx.open_store().await?;
            get::execute(&store, &name, namespace, ctx).await
        }
        Commands::Add {
            name,
            fields,
            namespace,
        } => {
            info!("Adding resource: {}", name);
            let store = ctx.open_store().await?;
            add::execute(&store, resource_fields(name, fields)?, namespace, ctx).await
        }
        Commands::Update {
            name,
            fields,
            namespace,
        } => {
            info!("Updating resource: {}", name);
            let store = ctx.open_store().await?;
            update::execute(&store, &name, resource_update(fields), namespace, ctx).await
        }
        Commands::Delete { name, namespace } => {
            info!("Deleting resource: {}", name);
            let store = ctx.open_store().await?;
            delete::execute(&store, &name, namespace, ctx).await
        }
        Commands::CreateNamespace { name } => {
            info!("Creating namespace: {}", name);
            let store = ctx.open_store().await?;
            namespaces::create(&store, &name, ctx).await
        }
        Commands::Watch => watch::execute(ctx).await,
    }
}

/// Select `namespace` unless it is already the current one
pub async fn select<R: Registry>(store: &Store<R>, namespace: Option<String>) -> BridgeResult<Namespace> {
    if let Some(name) = namespace {
        let namespace = Namespace::new(name);
        if store.current_namespace().as_ref() != Some(&namespace) {
            store.select_namespace(namespace).await?;
        }
    }

    store.current_namespace().ok_or(BridgeError::NoNamespaceSelected)
}

/// Fields for a new resource; the registry requires an ARN
pub fn resource_fields(name: String, fields: FieldArgs) -> BridgeResult<ResourceFields> {
    let arn = fields.arn.ok_or_else(|| BridgeError::ConfigValidation {
        field: "arn".to_string(),
        reason: "--arn is required when adding a resource".to_string(),
    })?;

    let mut resource = ResourceFields::new(name).arn(arn);
    if let Some(kind) = fields.resource_type {
        resource = resource.resource_type(kind);
    }
    if let Some(value) = fields.value {
        resource = resource.value(value);
    }
    Ok(resource)
}

/// Partial update carrying only the flags that were given
pub fn resource_update(fields: FieldArgs) -> ResourceUpdate {
    ResourceUpdate {
        arn: fields.arn,
        resource_type: fields.resource_type,
        value: fields.value,
    }
}
