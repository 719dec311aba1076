//! Harness + Bolt CLI engine contract tests
//!
//! A shell script stands in for `bolt`: it logs its arguments, copies
//! uploaded files aside, and prints canned JSON reports per subcommand.
#![cfg(unix)]

use serde_json::{json, Value};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use litmus_core::application::Harness;
use litmus_core::domain::{ApplyOptions, ExecutionContext, RunOptions, Target};
use litmus_core::port::id_provider::UuidProvider;
use litmus_core::port::time_provider::SystemTimeProvider;
use litmus_core::AppError;
use litmus_infra_system::{BoltCliEngine, YamlInventoryLoader};

/// Report lookup: `<subcommand>.<call number>.json`, then `<subcommand>.json`
const FAKE_BOLT: &str = r#"#!/bin/sh
dir=$(dirname "$0")
printf '%s\n' "$*" >> "$dir/calls.log"
n=$(wc -l < "$dir/calls.log" | tr -d ' ')
if [ "$1" = "file" ]; then cp "$3" "$dir/uploaded"; fi
if [ -f "$dir/$1.$n.json" ]; then cat "$dir/$1.$n.json"; else cat "$dir/$1.json"; fi
if [ -f "$dir/exit_status" ]; then exit "$(cat "$dir/exit_status")"; fi
"#;

const INVENTORY: &str = r#"---
version: 2
groups:
- name: ssh_nodes
  targets:
  - uri: db01
    config:
      transport: ssh
"#;

struct Rig {
    dir: TempDir,
    bin_dir: PathBuf,
    harness: Harness,
}

impl Rig {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let bin_dir = dir.path().join("bin");
        std::fs::create_dir(&bin_dir).unwrap();
        std::fs::create_dir(dir.path().join("tmp")).unwrap();

        let bolt = bin_dir.join("bolt");
        std::fs::write(&bolt, FAKE_BOLT).unwrap();
        std::fs::set_permissions(&bolt, std::fs::Permissions::from_mode(0o755)).unwrap();
        std::fs::write(dir.path().join("inventory.yaml"), INVENTORY).unwrap();

        let time_provider = Arc::new(SystemTimeProvider);
        let harness = Harness::new(
            Arc::new(BoltCliEngine::new(&bolt, time_provider.clone())),
            Arc::new(YamlInventoryLoader::new()),
            time_provider,
            Arc::new(UuidProvider),
        );

        Self {
            dir,
            bin_dir,
            harness,
        }
    }

    fn local(&self) -> ExecutionContext {
        ExecutionContext::new(self.dir.path())
            .with_inventory_path(self.dir.path().join("inventory.yaml"))
            .with_temp_dir(self.dir.path().join("tmp"))
    }

    fn remote(&self) -> ExecutionContext {
        self.local().with_target(Target::Remote("db01".to_string()))
    }

    fn report(&self, name: &str, items: Value) {
        std::fs::write(self.bin_dir.join(name), json!({ "items": items }).to_string()).unwrap();
    }

    fn bolt_exits_with(&self, status: i32) {
        std::fs::write(self.bin_dir.join("exit_status"), status.to_string()).unwrap();
    }

    fn calls(&self) -> Vec<String> {
        std::fs::read_to_string(self.bin_dir.join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn uploaded(&self) -> String {
        std::fs::read_to_string(self.bin_dir.join("uploaded")).unwrap()
    }

    fn temp_files(&self) -> usize {
        std::fs::read_dir(self.dir.path().join("tmp")).unwrap().count()
    }

    fn inventory_path(&self) -> String {
        self.dir.path().join("inventory.yaml").display().to_string()
    }
}

fn command_item(target: &str, exit_code: i64, stdout: &str) -> Value {
    let mut value = json!({"stdout": stdout, "stderr": "", "exit_code": exit_code});
    let status = if exit_code == 0 {
        "success"
    } else {
        value["_error"] = json!({
            "msg": format!("The command failed with exit code {}", exit_code),
            "kind": "puppetlabs.tasks/command-error",
            "details": {"exit_code": exit_code}
        });
        "failure"
    };
    json!({"target": target, "action": "command", "object": "puppet apply", "status": status, "value": value})
}

fn upload_item(target: &str) -> Value {
    json!({
        "target": target,
        "action": "upload",
        "object": "/tmp",
        "status": "success",
        "value": {"_output": format!("Uploaded to {}", target)}
    })
}

fn file_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_local_apply_runs_materialized_manifest() {
    let rig = Rig::new();
    rig.report("command.json", json!([command_item("localhost", 0, "Notice: Applied catalog")]));

    let result = rig
        .harness
        .apply_manifest(&rig.local(), Some("notify { 'hello': }"), &ApplyOptions::default())
        .await
        .unwrap();

    assert_eq!(result.exit_code, 0);
    assert_eq!(result.stdout.as_deref(), Some("Notice: Applied catalog"));

    let calls = rig.calls();
    assert_eq!(calls.len(), 1);
    let tmp = rig.dir.path().join("tmp").display().to_string();
    let modulepath = rig.dir.path().join("spec/fixtures/modules").display().to_string();
    assert!(calls[0].starts_with(&format!("command run puppet apply '{}/manifest_", tmp)));
    assert!(calls[0].contains(&format!(".pp' --modulepath '{}' --targets localhost --format json", modulepath)));
    assert!(!calls[0].contains("--inventoryfile"));
    assert_eq!(rig.temp_files(), 0);
}

#[tokio::test]
async fn test_remote_apply_uploads_then_runs() {
    let rig = Rig::new();
    rig.report("file.json", json!([upload_item("db01")]));
    rig.report("command.json", json!([command_item("db01", 0, "")]));

    rig.harness
        .apply_manifest(&rig.remote(), Some("include motd"), &ApplyOptions::default())
        .await
        .unwrap();

    let calls = rig.calls();
    assert_eq!(calls.len(), 2);

    let inventory = format!("--targets db01 --format json --inventoryfile {}", rig.inventory_path());
    assert!(calls[0].starts_with("file upload "));
    assert!(calls[0].ends_with(&inventory));

    let upload_args: Vec<&str> = calls[0].split(' ').collect();
    let remote_path = upload_args[3];
    assert!(remote_path.starts_with("/tmp/manifest_"));
    assert_eq!(file_name(upload_args[2]), file_name(remote_path));
    assert_eq!(rig.uploaded(), "include motd");

    assert_eq!(
        calls[1],
        format!("command run puppet apply '{}' {}", remote_path, inventory)
    );
    assert_eq!(rig.temp_files(), 0);
}

#[tokio::test]
async fn test_failure_report_is_authoritative_over_bolt_exit_status() {
    let rig = Rig::new();
    rig.report("command.json", json!([command_item("localhost", 1, "")]));
    rig.bolt_exits_with(1);

    let err = rig
        .harness
        .run_shell(&rig.local(), "false", &RunOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ExecutionFailed { ref operation, .. } if operation == "shell"));
    assert!(err.to_string().contains("The command failed with exit code 1"));

    let result = rig
        .harness
        .run_shell(&rig.local(), "false", &RunOptions::expecting_failures())
        .await
        .unwrap();
    assert_eq!(result.exit_code, 1);
    assert_eq!(result.stderr.as_deref(), Some(""));
}

#[tokio::test]
async fn test_idempotent_apply_detects_changes_on_second_run() {
    let rig = Rig::new();
    rig.report("command.1.json", json!([command_item("localhost", 2, "changed")]));
    rig.report("command.2.json", json!([command_item("localhost", 2, "changed again")]));

    let err = rig
        .harness
        .idempotent_apply(&rig.local(), Some("file { '/tmp/x': ensure => file }"), &ApplyOptions::default())
        .await
        .unwrap_err();

    assert!(err.to_string().starts_with("apply manifest (changes detected) failed"));

    let calls = rig.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|c| c.contains("--detailed-exitcodes")));

    let manifest = |call: &str| call.split(' ').nth(4).map(str::to_string);
    assert_eq!(manifest(&calls[0]), manifest(&calls[1]));
    assert_eq!(rig.temp_files(), 0);
}

#[tokio::test]
async fn test_task_passes_params_and_modulepath() {
    let rig = Rig::new();
    rig.report(
        "task.json",
        json!([{
            "target": "db01",
            "action": "task",
            "object": "motd::set",
            "status": "success",
            "value": {"_output": "motd updated"}
        }]),
    );

    let result = rig
        .harness
        .run_task(&rig.remote(), "motd::set", &json!({"content": "hi"}), &RunOptions::default())
        .await
        .unwrap();

    assert_eq!(result.exit_code, 0);
    assert_eq!(result.stdout.as_deref(), Some("motd updated"));

    let calls = rig.calls();
    let modulepath = rig.dir.path().join("spec/fixtures/modules").display().to_string();
    assert!(calls[0].starts_with("task run motd::set --targets db01 --format json"));
    assert!(calls[0].contains(&format!("--modulepath {}", modulepath)));
    assert!(calls[0].ends_with(r#"--params {"content":"hi"}"#));
}

#[tokio::test]
async fn test_script_arguments_follow_script_path() {
    let rig = Rig::new();
    rig.report("script.json", json!([command_item("localhost", 0, "ok")]));

    let result = rig
        .harness
        .run_script(
            &rig.local(),
            Path::new("spec/fixtures/setup.sh"),
            &RunOptions::default(),
            &["--force".to_string(), "2".to_string()],
        )
        .await
        .unwrap();

    assert_eq!(result.stdout.as_deref(), Some("ok"));
    assert_eq!(
        rig.calls(),
        vec!["script run --targets localhost --format json spec/fixtures/setup.sh --force 2"]
    );
}

#[tokio::test]
async fn test_write_file_remote_uploads_content() {
    let rig = Rig::new();
    rig.report("file.json", json!([upload_item("db01")]));

    rig.harness
        .write_file(&rig.remote(), "motd contents\n", "/etc/motd")
        .await
        .unwrap();

    assert_eq!(rig.uploaded(), "motd contents\n");
    let calls = rig.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].contains(" /etc/motd --targets db01"));
}

#[tokio::test]
async fn test_unknown_remote_target_never_reaches_bolt() {
    let rig = Rig::new();
    let ctx = rig.local().with_target(Target::Remote("web01".to_string()));

    let err = rig
        .harness
        .run_shell(&ctx, "hostname", &RunOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::UnknownTarget { ref target, .. } if target == "web01"));
    assert!(rig.calls().is_empty());
}

#[tokio::test]
async fn test_multiple_targets_rejected() {
    let rig = Rig::new();
    rig.report(
        "command.json",
        json!([command_item("localhost", 0, ""), command_item("localhost", 0, "")]),
    );

    let err = rig
        .harness
        .run_shell(&rig.local(), "uptime", &RunOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::MultipleTargets(2)));
}

#[tokio::test]
async fn test_unparseable_report_is_engine_error() {
    let rig = Rig::new();
    std::fs::write(rig.bin_dir.join("command.json"), "Error: unknown target").unwrap();

    let err = rig
        .harness
        .run_shell(&rig.local(), "uptime", &RunOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Engine(_)));
}
