//! `bridge watch`: line-oriented console over a live store.
//!
//! Input lines are parsed into [`ConsoleCommand`]s. Store operations run as
//! local tasks so a slow namespace load never blocks the prompt, and a second
//! `use` issued before the first load returns supersedes it. A renderer task
//! follows the store's event stream and redraws after each transition.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::bail;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::{self, LocalSet};
use tracing::debug;

use bridge_core::error::{BridgeError, BridgeResult};
use bridge_core::types::{Namespace, ResourceFields, ResourceUpdate};
use bridge_registry::Registry;
use bridge_store::{FilterView, Store, StoreEvent, StoreSnapshot};

use super::CommandContext;
use crate::output::{errors::ErrorFormatter, table, OutputHandler};

const HELP: &str = "\
commands:
  use NS                      select a namespace
  search [TERM]               filter by name (no term clears)
  add NAME ARN [TYPE] [VALUE] create a resource
  set NAME FIELD VALUE        change arn, type or value
  rm NAME                     delete a resource
  mkns NS                     create and select a namespace
  refresh                     reload the selected namespace
  show                        redraw
  quit";

/// One line of console input
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Use(Namespace),
    Search(String),
    Add(ResourceFields),
    Set { name: String, update: ResourceUpdate },
    Remove(String),
    CreateNamespace(Namespace),
    Refresh,
    Show,
    Help,
    Quit,
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> anyhow::Result<Self> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&verb, args)) = words.split_first() else {
            return Ok(ConsoleCommand::Show);
        };

        let command = match (verb, args) {
            ("use", [namespace]) => ConsoleCommand::Use(Namespace::new(*namespace)),
            ("search", term) => ConsoleCommand::Search(term.join(" ")),
            ("add", [name, arn, rest @ ..]) => {
                let mut fields = ResourceFields::new(*name).arn(*arn);
                if let Some((kind, value)) = rest.split_first() {
                    fields = fields.resource_type(*kind);
                    if !value.is_empty() {
                        fields = fields.value(value.join(" "));
                    }
                }
                ConsoleCommand::Add(fields)
            }
            ("set", [name, field, value @ ..]) if !value.is_empty() => {
                let value = value.join(" ");
                let update = match *field {
                    "arn" => ResourceUpdate::default().arn(value),
                    "type" => ResourceUpdate::default().resource_type(value),
                    "value" => ResourceUpdate::default().value(value),
                    other => bail!("unknown field '{}', expected arn, type or value", other),
                };
                ConsoleCommand::Set {
                    name: name.to_string(),
                    update,
                }
            }
            ("rm", [name]) => ConsoleCommand::Remove(name.to_string()),
            ("mkns", [namespace]) => {
                if !Namespace::is_valid_name(namespace) {
                    bail!("'{}' is not a valid namespace name", namespace);
                }
                ConsoleCommand::CreateNamespace(Namespace::new(*namespace))
            }
            ("refresh", []) => ConsoleCommand::Refresh,
            ("show", []) => ConsoleCommand::Show,
            ("help", []) => ConsoleCommand::Help,
            ("quit" | "exit", []) => ConsoleCommand::Quit,
            ("use" | "add" | "set" | "rm" | "mkns" | "refresh" | "show" | "help" | "quit", _) => {
                bail!("wrong arguments for '{}', type 'help' for usage", verb)
            }
            _ => bail!("unknown command '{}', type 'help' for usage", verb),
        };
        Ok(command)
    }
}

pub async fn execute(ctx: &CommandContext) -> BridgeResult<()> {
    let store = Rc::new(ctx.open_store().await?);
    let local = LocalSet::new();
    local.run_until(run(store, ctx.output.clone())).await
}

async fn run<R: Registry + 'static>(store: Rc<Store<R>>, output: OutputHandler) -> BridgeResult<()> {
    let view = Rc::new(RefCell::new(FilterView::new()));
    output.info("type 'help' for commands");
    output.raw(&render(&store.snapshot(), &view.borrow()));

    let renderer = task::spawn_local(follow_events(
        store.subscribe(),
        Rc::clone(&store),
        Rc::clone(&view),
        output.clone(),
    ));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| BridgeError::io("Failed to read console input".to_string(), e))?
    {
        match ConsoleCommand::parse(&line) {
            Ok(ConsoleCommand::Quit) => break,
            Ok(ConsoleCommand::Help) => output.raw(HELP),
            Ok(ConsoleCommand::Show) => output.raw(&render(&store.snapshot(), &view.borrow())),
            Ok(ConsoleCommand::Search(term)) => {
                view.borrow_mut().set_term(term);
                output.raw(&render(&store.snapshot(), &view.borrow()));
            }
            Ok(command) => {
                task::spawn_local(apply(Rc::clone(&store), command, output.clone()));
            }
            Err(err) => output.error(&err.to_string()),
        }
    }

    renderer.abort();
    Ok(())
}

/// Run one store operation, reporting its failure
pub async fn apply<R: Registry>(store: Rc<Store<R>>, command: ConsoleCommand, output: OutputHandler) {
    debug!("console command {:?}", command);
    let result = match command {
        ConsoleCommand::Use(namespace) => store.select_namespace(namespace).await,
        ConsoleCommand::Add(fields) => store.add_resource(fields).await.map(drop),
        ConsoleCommand::Set { name, update } => store.update_resource(&name, update).await.map(drop),
        ConsoleCommand::Remove(name) => store.delete_resource(&name).await,
        ConsoleCommand::CreateNamespace(namespace) => store.add_namespace(namespace).await,
        ConsoleCommand::Refresh => store.refresh().await,
        ConsoleCommand::Search(_) | ConsoleCommand::Show | ConsoleCommand::Help | ConsoleCommand::Quit => Ok(()),
    };

    if let Err(err) = result {
        eprint!("{}", ErrorFormatter::with_colors(*output.colors()).format_error(&err));
    }
}

async fn follow_events<R: Registry>(
    mut events: broadcast::Receiver<StoreEvent>,
    store: Rc<Store<R>>,
    view: Rc<RefCell<FilterView>>,
    output: OutputHandler,
) {
    loop {
        match events.recv().await {
            Ok(event) => {
                if let Some(line) = describe_event(&event) {
                    output.info(&line);
                }
                if event.affects_resources() {
                    output.raw(&render(&store.snapshot(), &view.borrow()));
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                debug!("renderer skipped {} events", skipped);
                output.raw(&render(&store.snapshot(), &view.borrow()));
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// Status line for an event; failures are reported by the issuing command
pub fn describe_event(event: &StoreEvent) -> Option<String> {
    let line = match event {
        StoreEvent::NamespacesLoaded { count } => format!("{} namespaces", count),
        StoreEvent::SelectionChanged { namespace, .. } => format!("loading '{}'", namespace),
        StoreEvent::ResourcesLoaded { .. } => return None,
        StoreEvent::SelectionCleared => "no namespaces left, selection cleared".to_string(),
        StoreEvent::ResourceAdded { name, .. } => format!("added '{}'", name),
        StoreEvent::ResourceUpdated { name, .. } => format!("updated '{}'", name),
        StoreEvent::ResourceDeleted { name, .. } => format!("deleted '{}'", name),
        StoreEvent::NamespaceAdded { namespace } => format!("created namespace '{}'", namespace),
        StoreEvent::StaleResponseDropped { namespace, .. } => {
            format!("ignored a late response for '{}'", namespace)
        }
        StoreEvent::Failed { .. } => return None,
    };
    Some(line)
}

/// Header plus the filtered resource table
pub fn render(snapshot: &StoreSnapshot, view: &FilterView) -> String {
    let Some(namespace) = &snapshot.current_namespace else {
        return "[no namespace selected]".to_string();
    };

    let mut header = format!("[{}]", namespace);
    if view.is_active() {
        header.push_str(&format!(" search: '{}'", view.term()));
    }
    if snapshot.pending {
        return format!("{} loading...", header);
    }
    if let Some(error) = &snapshot.last_error {
        header.push_str(&format!(" last error ({}): {}", error.kind, error.message));
    }

    let visible = view.apply(&snapshot.resources);
    format!("{}\n{}", header, table::render_resources(&visible))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_core::error::ErrorKind;
    use bridge_core::types::Resource;
    use bridge_store::LastError;

    #[test]
    fn test_parse_basic_commands() {
        assert_eq!(ConsoleCommand::parse("").unwrap(), ConsoleCommand::Show);
        assert_eq!(
            ConsoleCommand::parse("use prod").unwrap(),
            ConsoleCommand::Use(Namespace::new("prod"))
        );
        assert_eq!(
            ConsoleCommand::parse("  rm   db ").unwrap(),
            ConsoleCommand::Remove("db".to_string())
        );
        assert_eq!(ConsoleCommand::parse("refresh").unwrap(), ConsoleCommand::Refresh);
        assert_eq!(ConsoleCommand::parse("exit").unwrap(), ConsoleCommand::Quit);
    }

    #[test]
    fn test_parse_search_joins_and_clears() {
        assert_eq!(
            ConsoleCommand::parse("search db primary").unwrap(),
            ConsoleCommand::Search("db primary".to_string())
        );
        assert_eq!(
            ConsoleCommand::parse("search").unwrap(),
            ConsoleCommand::Search(String::new())
        );
    }

    #[test]
    fn test_parse_add() {
        assert_eq!(
            ConsoleCommand::parse("add db arn:aws:db secret hunter 2").unwrap(),
            ConsoleCommand::Add(
                ResourceFields::new("db")
                    .arn("arn:aws:db")
                    .resource_type("secret")
                    .value("hunter 2")
            )
        );
        assert_eq!(
            ConsoleCommand::parse("add db arn:aws:db").unwrap(),
            ConsoleCommand::Add(ResourceFields::new("db").arn("arn:aws:db"))
        );
        assert!(ConsoleCommand::parse("add db").is_err());
    }

    #[test]
    fn test_parse_set() {
        assert_eq!(
            ConsoleCommand::parse("set db value new secret").unwrap(),
            ConsoleCommand::Set {
                name: "db".to_string(),
                update: ResourceUpdate::default().value("new secret"),
            }
        );
        assert!(ConsoleCommand::parse("set db id 4").is_err());
        assert!(ConsoleCommand::parse("set db arn").is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_and_bad_names() {
        let err = ConsoleCommand::parse("frobnicate").unwrap_err();
        assert!(err.to_string().contains("unknown command 'frobnicate'"));
        assert!(ConsoleCommand::parse("mkns a/b").is_err());
        assert!(ConsoleCommand::parse("use").is_err());
    }

    #[test]
    fn test_describe_event() {
        let namespace = Namespace::new("prod");
        assert_eq!(
            describe_event(&StoreEvent::ResourceAdded {
                namespace: namespace.clone(),
                name: "db".to_string()
            })
            .as_deref(),
            Some("added 'db'")
        );
        assert_eq!(
            describe_event(&StoreEvent::Failed {
                kind: ErrorKind::Transport,
                message: "down".to_string()
            }),
            None
        );
    }

    #[test]
    fn test_render_states() {
        let view = FilterView::new();
        assert_eq!(render(&StoreSnapshot::default(), &view), "[no namespace selected]");

        let mut snapshot = StoreSnapshot {
            current_namespace: Some(Namespace::new("prod")),
            namespaces: vec![Namespace::new("prod")],
            pending: true,
            ..Default::default()
        };
        assert_eq!(render(&snapshot, &view), "[prod] loading...");

        snapshot.pending = false;
        snapshot.resources = vec![
            Resource::from_fields(1, ResourceFields::new("db")),
            Resource::from_fields(2, ResourceFields::new("cache")),
        ];
        snapshot.last_error = Some(LastError {
            kind: ErrorKind::Conflict,
            message: "taken".to_string(),
        });

        let text = render(&snapshot, &FilterView::with_term("DB"));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "[prod] search: 'DB' last error (conflict): taken");
        assert_eq!(lines.len(), 3);
        assert!(lines[2].starts_with("db"));
    }
}
