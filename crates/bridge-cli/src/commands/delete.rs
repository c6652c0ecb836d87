//! `bridge delete`

use bridge_core::error::BridgeResult;
use bridge_registry::Registry;
use bridge_store::Store;

use super::CommandContext;

pub async fn execute<R: Registry>(
    store: &Store<R>,
    name: &str,
    namespace: Option<String>,
    ctx: &CommandContext,
) -> BridgeResult<()> {
    let namespace = super::select(store, namespace).await?;

    store.delete_resource(name).await?;
    ctx.output
        .success(&format!("Deleted '{}' from '{}'", name, namespace));
    Ok(())
}
