use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Runs the binary against an isolated data root and an unreachable backend.
fn sakani(root: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("sakani").unwrap();
    cmd.env("SAKANI_HOME", root.path())
        .env("SAKANI_BASE_URL", "http://127.0.0.1:9")
        .env_remove("SAKANI_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn json_stdout(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

#[test]
fn enqueue_then_list_as_json() {
    let root = TempDir::new().unwrap();

    sakani(&root)
        .args(["enqueue", "create", "/api/properties", "--data", r#"{"title":"Villa"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("Queued"))
        .stderr(predicate::str::contains("Saved locally"));
    sakani(&root)
        .args(["enqueue", "delete", "/api/favorites/3"])
        .assert()
        .success();

    let listed = json_stdout(sakani(&root).args(["list", "--output", "json"]));
    assert_eq!(listed["count"], 2);
    assert_eq!(listed["items"][0]["type"], "CREATE");
    assert_eq!(listed["items"][0]["data"]["title"], "Villa");
    assert_eq!(listed["items"][0]["retryCount"], 0);
    assert_eq!(listed["items"][1]["type"], "DELETE");
    assert!(listed["items"][1].get("data").is_none());

    assert!(root.path().join("sakani.db").exists());
}

#[test]
fn create_without_data_fails() {
    let root = TempDir::new().unwrap();

    sakani(&root)
        .args(["enqueue", "create", "/api/properties"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("requires a data payload"));
}

#[test]
fn empty_endpoint_fails() {
    let root = TempDir::new().unwrap();

    sakani(&root)
        .args(["enqueue", "delete", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("endpoint must not be empty"));
}

#[test]
fn clear_requires_force() {
    let root = TempDir::new().unwrap();
    for i in 0..5 {
        sakani(&root)
            .args(["enqueue", "update", &format!("/api/properties/{i}"), "-d", "{}"])
            .assert()
            .success();
    }

    sakani(&root)
        .arg("clear")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    sakani(&root)
        .args(["clear", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 5"));

    let status = json_stdout(sakani(&root).args(["status", "-o", "json"]));
    assert_eq!(status["pending"], 0);
}

#[test]
fn replay_while_backend_unreachable_keeps_queue() {
    let root = TempDir::new().unwrap();
    sakani(&root)
        .args(["enqueue", "create", "/api/properties", "-d", r#"{"title":"X"}"#])
        .assert()
        .success();

    sakani(&root)
        .arg("replay")
        .assert()
        .success()
        .stdout(predicate::str::contains("Offline"));

    let status = json_stdout(sakani(&root).args(["status", "-o", "json"]));
    assert_eq!(status["pending"], 1);
    assert_eq!(status["awaiting_retry"], 0);
}

#[test]
fn config_init_and_show() {
    let root = TempDir::new().unwrap();

    sakani(&root)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.yaml"));
    assert!(root.path().join("config.yaml").exists());

    sakani(&root)
        .args(["config", "init"])
        .assert()
        .failure();

    sakani(&root)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("max_retries: 3"))
        .stdout(predicate::str::contains("http://127.0.0.1:9"));
}

#[test]
fn invalid_config_is_reported() {
    let root = TempDir::new().unwrap();
    std::fs::write(root.path().join("config.yaml"), "sync: [not, a, map]").unwrap();

    sakani(&root)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load configuration"));
}

#[test]
fn zero_replay_interval_is_rejected() {
    let root = TempDir::new().unwrap();
    std::fs::write(
        root.path().join("config.yaml"),
        "sync:\n  replay_interval_secs: 0\n",
    )
    .unwrap();

    sakani(&root)
        .arg("watch")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("replay_interval_secs must be at least 1"));
}

#[test]
fn completions_ignore_broken_config_and_missing_home() {
    let root = TempDir::new().unwrap();
    std::fs::write(root.path().join("config.yaml"), "sync: [not, a, map]").unwrap();

    sakani(&root)
        .env_remove("HOME")
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sakani"));

    Command::cargo_bin("sakani")
        .unwrap()
        .env_remove("HOME")
        .env_remove("SAKANI_HOME")
        .args(["completions", "bash"])
        .assert()
        .success();
}

#[test]
fn completions_are_generated() {
    let root = TempDir::new().unwrap();

    sakani(&root)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sakani"));
}
