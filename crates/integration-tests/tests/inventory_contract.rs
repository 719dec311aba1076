//! Inventory file contract tests
//!
//! Real inventory files through `YamlInventoryLoader`, with the engine mocked.

use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use litmus_core::application::Harness;
use litmus_core::domain::{ExecutionContext, RunOptions, Target};
use litmus_core::port::engine::mocks::{command_record, EngineCall, MockEngine};
use litmus_core::port::id_provider::UuidProvider;
use litmus_core::port::time_provider::SystemTimeProvider;
use litmus_core::port::InventoryLoader;
use litmus_core::AppError;
use litmus_infra_system::YamlInventoryLoader;

/// Shape written by the provisioner: nested groups, uri and name targets
const PROVISIONED: &str = r#"---
version: 2
groups:
- name: docker_nodes
  targets:
  - uri: localhost:52065
    config:
      transport: ssh
      ssh:
        user: root
        password: root
        port: 52065
        host-key-check: false
    facts:
      provisioner: docker
      container_name: centos_7-52065
      platform: litmusimage/centos:7
- name: ssh_nodes
  groups:
  - name: windows
    targets:
    - name: win2019
      uri: 10.0.0.12
- name: winrm_nodes
  targets: []
targets:
- db01.example.com
"#;

fn write_inventory(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("litmus_inventory.yaml");
    std::fs::write(&path, PROVISIONED).unwrap();
    path
}

fn harness(engine: MockEngine) -> Harness {
    Harness::new(
        Arc::new(engine),
        Arc::new(YamlInventoryLoader::new()),
        Arc::new(SystemTimeProvider),
        Arc::new(UuidProvider),
    )
}

#[tokio::test]
async fn test_provisioned_inventory_lists_every_target() {
    let dir = TempDir::new().unwrap();
    let path = write_inventory(&dir);

    let inventory = tokio_test::assert_ok!(YamlInventoryLoader::new().load(&path).await);

    for name in ["localhost:52065", "win2019", "10.0.0.12", "db01.example.com"] {
        assert!(inventory.contains_target(name), "{name} should be declared");
    }
    assert!(!inventory.contains_target("localhost"));
}

#[tokio::test]
async fn test_remote_shell_passes_loaded_inventory() {
    let dir = TempDir::new().unwrap();
    let path = write_inventory(&dir);

    let engine = MockEngine::new();
    engine.push_record(command_record("localhost:52065", 0, "centos_7-52065\n", ""));
    let harness = harness(engine.clone());

    let ctx = ExecutionContext::new(dir.path())
        .with_inventory_path(&path)
        .with_target(Target::Remote("localhost:52065".to_string()));

    let result = harness
        .run_shell(&ctx, "hostname", &RunOptions::default())
        .await
        .unwrap();

    assert_eq!(result.stdout.as_deref(), Some("centos_7-52065\n"));
    assert_eq!(
        engine.calls(),
        vec![EngineCall::Command {
            command: "hostname".to_string(),
            target: "localhost:52065".to_string(),
            with_inventory: true,
        }]
    );
}

#[tokio::test]
async fn test_missing_inventory_file_fails_remote_operations() {
    let dir = TempDir::new().unwrap();
    let engine = MockEngine::new();
    let harness = harness(engine.clone());

    let ctx = ExecutionContext::new(dir.path()).with_target(Target::Remote("db01".to_string()));

    let err = harness
        .run_shell(&ctx, "hostname", &RunOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Inventory(_)));
    assert_eq!(engine.call_count(), 0);
}

#[tokio::test]
async fn test_local_target_ignores_inventory() {
    let dir = TempDir::new().unwrap();
    let engine = MockEngine::new();
    let harness = harness(engine.clone());

    // Default inventory path does not exist; local runs never read it
    let ctx = ExecutionContext::new(dir.path());
    let result = harness
        .run_shell(&ctx, "true", &RunOptions::default())
        .await
        .unwrap();

    assert_eq!(result.exit_code, 0);
    assert_eq!(
        engine.calls(),
        vec![EngineCall::Command {
            command: "true".to_string(),
            target: "localhost".to_string(),
            with_inventory: false,
        }]
    );
}
