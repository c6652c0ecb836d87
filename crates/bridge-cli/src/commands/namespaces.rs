//! `bridge namespaces` and `bridge create-namespace`

use bridge_core::error::{BridgeError, BridgeResult};
use bridge_core::types::Namespace;
use bridge_registry::Registry;
use bridge_store::Store;

use super::CommandContext;
use crate::output::table;

/// Print the namespace list, marking the selected namespace
pub async fn list<R: Registry>(store: &Store<R>, ctx: &CommandContext) -> BridgeResult<()> {
    let snapshot = store.snapshot();
    if snapshot.namespaces.is_empty() {
        ctx.output.warn("The registry has no namespaces yet");
        ctx.output
            .info("Create one with 'bridge create-namespace <name>'");
        return Ok(());
    }

    ctx.output.raw(&table::render_namespaces(
        &snapshot.namespaces,
        snapshot.current_namespace.as_ref(),
    ));
    Ok(())
}

/// Create a namespace and select it
pub async fn create<R: Registry>(store: &Store<R>, name: &str, ctx: &CommandContext) -> BridgeResult<()> {
    if !Namespace::is_valid_name(name) {
        return Err(BridgeError::ConfigValidation {
            field: "namespace".to_string(),
            reason: format!("'{}' must be non-empty and must not contain '/'", name),
        });
    }

    store.add_namespace(Namespace::new(name)).await?;
    ctx.output.success(&format!("Created namespace '{}'", name));
    Ok(())
}
