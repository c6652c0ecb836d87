//! `bridge list`

use bridge_core::error::BridgeResult;
use bridge_registry::Registry;
use bridge_store::{FilterView, Store};

use super::CommandContext;
use crate::output::table;

pub async fn execute<R: Registry>(
    store: &Store<R>,
    namespace: Option<String>,
    search: Option<String>,
    ctx: &CommandContext,
) -> BridgeResult<()> {
    let namespace = super::select(store, namespace).await?;

    let snapshot = store.snapshot();
    let view = FilterView::with_term(search.unwrap_or_default());
    let visible = view.apply(&snapshot.resources);

    if snapshot.resources.is_empty() {
        ctx.output
            .info(&format!("No resources in namespace '{}'", namespace));
    } else if visible.is_empty() {
        ctx.output.info(&format!(
            "No resources in '{}' match '{}'",
            namespace,
            view.term()
        ));
    } else {
        ctx.output.raw(&table::render_resources(&visible));
        if view.is_active() {
            ctx.output.info(&format!(
                "{} of {} resources match '{}'",
                visible.len(),
                snapshot.resources.len(),
                view.term()
            ));
        }
    }
    Ok(())
}
