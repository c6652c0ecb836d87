//! `bridge add`

use bridge_core::error::BridgeResult;
use bridge_core::types::ResourceFields;
use bridge_registry::Registry;
use bridge_store::Store;

use super::CommandContext;

pub async fn execute<R: Registry>(
    store: &Store<R>,
    fields: ResourceFields,
    namespace: Option<String>,
    ctx: &CommandContext,
) -> BridgeResult<()> {
    let namespace = super::select(store, namespace).await?;

    let created = store.add_resource(fields).await?;
    ctx.output.success(&format!(
        "Added '{}' to '{}' (id {})",
        created.name, namespace, created.id
    ));
    Ok(())
}
