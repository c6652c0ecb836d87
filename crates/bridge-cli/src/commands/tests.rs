//! Unit tests for CLI commands.

use super::*;
use std::rc::Rc;
use std::time::Duration;

use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bridge_core::error::ErrorKind;

fn test_context(server: &MockServer) -> CommandContext {
    CommandContext {
        cwd: Utf8PathBuf::from("."),
        output: OutputHandler::plain(),
        config: ResolvedConfig {
            api_url: format!("{}/api", server.uri()),
            default_namespace: Some("prod".to_string()),
            ..ResolvedConfig::default()
        },
    }
}

fn resource_json(id: i64, name: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "arn": format!("arn:bridge:{}", name),
        "resource_type": "parameter",
        "value": "v1"
    })
}

/// Registry with namespaces dev and prod, each holding one resource
async fn registry() -> MockServer {
    registry_with(&["dev", "prod"]).await
}

async fn registry_with(namespaces: &[&str]) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/namespaces"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "namespaces": namespaces
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/resource/prod/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "resources": [resource_json(1, "db")]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/resource/dev/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "resources": [resource_json(2, "cache")]
        })))
        .mount(&server)
        .await;

    server
}

#[tokio::test]
async fn test_resolve_config_layers_project_file_and_flags() {
    let temp_dir = TempDir::new().unwrap();
    let cwd = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    tokio::fs::write(
        cwd.join("bridge.toml"),
        "[registry]\nurl = \"http://project/api\"\ntimeout_secs = 5\n[console]\ndefault_namespace = \"dev\"",
    )
    .await
    .unwrap();

    let global = GlobalArgs {
        timeout: Some(9),
        ..GlobalArgs::default()
    };
    let env = HashMap::from([("BRIDGE_DEFAULT_NAMESPACE".to_string(), "prod".to_string())]);

    let config = resolve_config(&cwd, &global, env).await.unwrap();
    assert_eq!(config.api_url, "http://project/api");
    assert_eq!(config.timeout, Duration::from_secs(9));
    assert_eq!(config.default_namespace.as_deref(), Some("prod"));
}

#[tokio::test]
async fn test_resolve_config_rejects_bad_flag() {
    let temp_dir = TempDir::new().unwrap();
    let cwd = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    let global = GlobalArgs {
        api_url: Some("ftp://registry/api".to_string()),
        ..GlobalArgs::default()
    };

    let result = resolve_config(&cwd, &global, HashMap::new()).await;
    assert!(matches!(result, Err(BridgeError::ConfigValidation { .. })));
}

#[test]
fn test_resource_fields_requires_arn() {
    let result = resource_fields("db".to_string(), FieldArgs::default());
    assert!(matches!(result, Err(BridgeError::ConfigValidation { ref field, .. }) if field == "arn"));

    let fields = resource_fields(
        "db".to_string(),
        FieldArgs {
            arn: Some("arn:bridge:db".to_string()),
            value: Some("s3cr3t".to_string()),
            ..FieldArgs::default()
        },
    )
    .unwrap();
    assert_eq!(
        fields,
        ResourceFields::new("db").arn("arn:bridge:db").value("s3cr3t")
    );
}

#[test]
fn test_resource_update_keeps_only_given_flags() {
    let update = resource_update(FieldArgs {
        resource_type: Some("secret".to_string()),
        ..FieldArgs::default()
    });
    assert_eq!(update, ResourceUpdate::default().resource_type("secret"));
}

#[tokio::test]
async fn test_open_store_selects_default_namespace() {
    let server = registry().await;
    let ctx = test_context(&server);

    let store = ctx.open_store().await.unwrap();
    let snapshot = store.snapshot();
    assert_eq!(snapshot.current_namespace, Some(Namespace::new("prod")));
    assert_eq!(snapshot.resources[0].name, "db");
}

#[tokio::test]
async fn test_list_switches_namespace() {
    let server = registry().await;
    let ctx = test_context(&server);
    let store = ctx.open_store().await.unwrap();

    list::execute(&store, Some("dev".to_string()), Some("CA".to_string()), &ctx)
        .await
        .unwrap();

    let snapshot = store.snapshot();
    assert_eq!(snapshot.current_namespace, Some(Namespace::new("dev")));
    assert_eq!(snapshot.visible_resources("CA").len(), 1);
}

#[tokio::test]
async fn test_select_unknown_namespace() {
    let server = registry().await;
    let ctx = test_context(&server);
    let store = ctx.open_store().await.unwrap();

    let result = select(&store, Some("qa".to_string())).await;
    assert!(matches!(result, Err(BridgeError::UnknownNamespace { .. })));
    assert_eq!(store.current_namespace(), Some(Namespace::new("prod")));
}

#[tokio::test]
async fn test_add_posts_to_selected_namespace() {
    let server = registry().await;
    Mock::given(method("POST"))
        .and(path("/api/resource/prod"))
        .and(body_json(serde_json::json!({
            "name": "queue",
            "arn": "arn:bridge:queue",
            "resource_type": "",
            "value": ""
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(resource_json(3, "queue")))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = test_context(&server);
    let store = ctx.open_store().await.unwrap();
    let fields = ResourceFields::new("queue").arn("arn:bridge:queue");

    add::execute(&store, fields, None, &ctx).await.unwrap();
    assert!(store.snapshot().resource("queue").is_some());
}

#[tokio::test]
async fn test_update_without_fields_makes_no_request() {
    let server = registry().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = test_context(&server);
    let store = ctx.open_store().await.unwrap();

    let result = update::execute(&store, "db", ResourceUpdate::default(), None, &ctx).await;
    assert!(matches!(result, Err(BridgeError::ConfigValidation { .. })));
}

#[tokio::test]
async fn test_update_replaces_cached_entry() {
    let server = registry().await;
    let mut updated = resource_json(1, "db");
    updated["value"] = serde_json::json!("v2");
    Mock::given(method("PUT"))
        .and(path("/api/resource/prod/db"))
        .and(body_json(serde_json::json!({
            "name": "db",
            "arn": "arn:bridge:db",
            "resource_type": "parameter",
            "value": "v2"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(updated))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = test_context(&server);
    let store = ctx.open_store().await.unwrap();

    update::execute(&store, "db", ResourceUpdate::default().value("v2"), None, &ctx)
        .await
        .unwrap();
    assert_eq!(store.snapshot().resource("db").unwrap().value, "v2");
}

#[tokio::test]
async fn test_get_falls_back_to_registry() {
    let server = registry().await;
    Mock::given(method("GET"))
        .and(path("/api/resource/prod/archived"))
        .respond_with(ResponseTemplate::new(200).set_body_json(resource_json(9, "archived")))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = test_context(&server);
    let store = ctx.open_store().await.unwrap();

    // Cached entries need no extra request
    get::execute(&store, "db", None, &ctx).await.unwrap();
    get::execute(&store, "archived", None, &ctx).await.unwrap();
}

#[tokio::test]
async fn test_delete_reports_registry_failure() {
    let server = registry().await;
    Mock::given(method("DELETE"))
        .and(path("/api/resource/prod/db"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "error": "Resource not found"
        })))
        .mount(&server)
        .await;

    let ctx = test_context(&server);
    let store = ctx.open_store().await.unwrap();

    let result = delete::execute(&store, "db", None, &ctx).await;
    assert!(matches!(result, Err(BridgeError::Transport { .. })));
    // Cache is untouched until the registry confirms
    assert!(store.snapshot().resource("db").is_some());
    assert_eq!(store.last_error().unwrap().kind, ErrorKind::Transport);
}

#[tokio::test]
async fn test_create_namespace_validates_name() {
    let server = registry().await;
    Mock::given(method("POST"))
        .and(path("/api/namespace"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = test_context(&server);
    let store = ctx.open_store().await.unwrap();

    let result = namespaces::create(&store, "team/a", &ctx).await;
    assert!(matches!(result, Err(BridgeError::ConfigValidation { .. })));
}

#[tokio::test]
async fn test_watch_later_use_wins() {
    let server = registry_with(&["dev", "prod", "slow"]).await;
    Mock::given(method("GET"))
        .and(path("/api/resource/slow/all"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "resources": [resource_json(5, "late")] }))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    let ctx = test_context(&server);
    let store = Rc::new(ctx.open_store().await.unwrap());
    let output = OutputHandler::plain();

    let local = tokio::task::LocalSet::new();
    local
        .run_until(async {
            let slow = tokio::task::spawn_local(watch::apply(
                Rc::clone(&store),
                watch::ConsoleCommand::Use(Namespace::new("slow")),
                output.clone(),
            ));
            // Let the slow load get in flight first
            tokio::time::sleep(Duration::from_millis(50)).await;
            let fast = tokio::task::spawn_local(watch::apply(
                Rc::clone(&store),
                watch::ConsoleCommand::Use(Namespace::new("dev")),
                output.clone(),
            ));
            fast.await.unwrap();
            slow.await.unwrap();
        })
        .await;

    let snapshot = store.snapshot();
    assert_eq!(snapshot.current_namespace, Some(Namespace::new("dev")));
    assert_eq!(snapshot.resources.len(), 1);
    assert_eq!(snapshot.resources[0].name, "cache");
    assert_eq!(snapshot.stale_dropped, 1);
    assert!(!snapshot.pending);
}
