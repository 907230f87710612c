//! Integration tests for configuration loading and the CLI run context

use crate::integration::test_utils::{node_stub, with_isolated_env, RecordingNodeClient};
use clap::Parser;
use nodewatch::cli::{load_config, Cli, Commands, OutputFormat, RunContext};
use nodewatch::codec::Encoding;
use nodewatch::config::ConfigLoader;
use nodewatch::dependency::Consistency;
use std::sync::Arc;
use tempfile::TempDir;

fn write_workspace_config(root: &std::path::Path, contents: &str) {
    let dir = root.join("config");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), contents).unwrap();
}

#[test]
fn test_workspace_config_drives_query_options() {
    let temp = TempDir::new().unwrap();
    write_workspace_config(
        temp.path(),
        r#"
[nomad]
address = "http://nomad.internal:4646"
region = "eu"
namespace = "platform"
stale = true
"#,
    );

    let config = with_isolated_env(temp.path(), || ConfigLoader::load(temp.path()).unwrap());
    let opts = config.nomad.query_options();
    assert_eq!(opts.region.as_deref(), Some("eu"));
    assert_eq!(opts.namespace.as_deref(), Some("platform"));
    assert_eq!(opts.consistency, Consistency::Stale);
}

#[test]
fn test_environment_overrides_files() {
    let temp = TempDir::new().unwrap();
    write_workspace_config(
        temp.path(),
        r#"
[nomad]
address = "http://from-file:4646"
"#,
    );

    let config = with_isolated_env(temp.path(), || {
        std::env::set_var("NOMAD_ADDR", "http://from-env:4646");
        std::env::set_var("NOMAD_TOKEN", "token-from-env");
        ConfigLoader::load(temp.path()).unwrap()
    });
    assert_eq!(config.nomad.address, "http://from-env:4646");
    assert_eq!(config.nomad.token.as_deref(), Some("token-from-env"));
}

#[test]
fn test_cli_flags_override_everything() {
    let temp = TempDir::new().unwrap();
    let config_file = temp.path().join("nodewatch.toml");
    std::fs::write(
        &config_file,
        r#"
[nomad]
address = "http://from-file:4646"
region = "file-region"

[codec]
encoding = "bincode"
"#,
    )
    .unwrap();

    let cli = Cli::try_parse_from([
        "nodewatch",
        "--config",
        config_file.to_str().unwrap(),
        "--address",
        "http://from-flag:4646",
        "nodes",
    ])
    .unwrap();

    let config = with_isolated_env(temp.path(), || {
        std::env::set_var("NOMAD_ADDR", "http://from-env:4646");
        load_config(&cli).unwrap()
    });
    assert_eq!(config.nomad.address, "http://from-flag:4646");
    assert_eq!(config.nomad.region.as_deref(), Some("file-region"));
    assert_eq!(config.codec.encoding, Encoding::Bincode);
}

#[test]
fn test_invalid_config_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    write_workspace_config(
        temp.path(),
        r#"
[poll]
min_backoff_ms = 5000
max_backoff_ms = 100
"#,
    );

    let result = with_isolated_env(temp.path(), || ConfigLoader::load(temp.path()));
    let err = result.unwrap_err().to_string();
    assert!(err.contains("min_backoff_ms"), "{}", err);
}

#[tokio::test]
async fn test_run_context_sends_configured_options() {
    let temp = TempDir::new().unwrap();
    write_workspace_config(
        temp.path(),
        r#"
[nomad]
region = "ap"
stale = true
"#,
    );
    let config = with_isolated_env(temp.path(), || ConfigLoader::load(temp.path()).unwrap());

    let client = Arc::new(RecordingNodeClient::new().with_stubs(vec![
        node_stub("2", "web-2", "10.1.0.2", "dc9"),
        node_stub("1", "web-1", "10.1.0.1", "dc9"),
    ]));
    let ctx = RunContext::with_client(config, client.clone(), OutputFormat::Table);

    let out = ctx
        .execute(&Commands::Nodes {
            selector: "@dc9".to_string(),
            by_region: false,
            save: None,
        })
        .await
        .unwrap();

    assert!(out.find("web-1").unwrap() < out.find("web-2").unwrap());
    let sent = client.last_options().unwrap();
    assert_eq!(sent.region.as_deref(), Some("ap"));
    assert_eq!(sent.consistency, Consistency::Stale);
    assert_eq!(sent.filter.as_deref(), Some("Datacenter == dc9"));
}
