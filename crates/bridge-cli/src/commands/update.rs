//! `bridge update`

use bridge_core::error::{BridgeError, BridgeResult};
use bridge_core::types::ResourceUpdate;
use bridge_registry::Registry;
use bridge_store::Store;

use super::CommandContext;

pub async fn execute<R: Registry>(
    store: &Store<R>,
    name: &str,
    update: ResourceUpdate,
    namespace: Option<String>,
    ctx: &CommandContext,
) -> BridgeResult<()> {
    if update.is_empty() {
        return Err(BridgeError::ConfigValidation {
            field: "update".to_string(),
            reason: "pass at least one of --arn, --type or --value".to_string(),
        });
    }

    let namespace = super::select(store, namespace).await?;

    let updated = store.update_resource(name, update).await?;
    ctx.output
        .success(&format!("Updated '{}' in '{}'", updated.name, namespace));
    Ok(())
}
