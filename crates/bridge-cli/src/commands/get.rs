//! `bridge get`

use bridge_core::error::BridgeResult;
use bridge_registry::Registry;
use bridge_store::Store;
use tracing::debug;

use super::CommandContext;
use crate::output::table;

pub async fn execute<R: Registry>(
    store: &Store<R>,
    name: &str,
    namespace: Option<String>,
    ctx: &CommandContext,
) -> BridgeResult<()> {
    let namespace = super::select(store, namespace).await?;

    let resource = match store.snapshot().resource(name).cloned() {
        Some(resource) => resource,
        None => {
            // The list endpoint pages server-side; ask for the entry directly
            debug!("'{}' not in the loaded page, fetching it", name);
            store.registry().get_resource(&namespace, name).await?
        }
    };

    ctx.output.raw(&table::render_resource(&resource));
    Ok(())
}
