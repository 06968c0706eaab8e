//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a temporary config file and only
//! exercise commands that work without network access.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use tempfile::TempDir;

/// Run a CLI command with `--config` pointed into `dir` and return output.
fn run_cli(dir: &Path, args: &[&str]) -> (String, String, i32) {
    run_cli_with_stdin(dir, args, None)
}

fn run_cli_with_stdin(dir: &Path, args: &[&str], stdin: Option<&str>) -> (String, String, i32) {
    let config = dir.join("config.toml");
    let mut child = Command::new(env!("CARGO_BIN_EXE_organisely-cli"))
        .arg("--config")
        .arg(&config)
        .args(args)
        .env_remove("ORGANISELY_API_KEY")
        .env_remove("ORGANISELY_BASE_URL")
        .env_remove("ORGANISELY_USER_ID")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");

    if let Some(input) = stdin {
        child
            .stdin
            .take()
            .expect("stdin is piped")
            .write_all(input.as_bytes())
            .expect("Failed to write stdin");
    } else {
        drop(child.stdin.take());
    }

    let output = child.wait_with_output().expect("Failed to wait for CLI");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn parse_json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_config_path_uses_override() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "path"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), dir.path().join("config.toml").display().to_string());
}

#[test]
fn test_config_set_then_get() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "set", "retries", "5"]);
    assert_eq!(code, 0, "config set failed");
    assert_eq!(stdout.trim(), "ok");

    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "retries"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "5");

    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "base_url"]);
    assert_eq!(stdout.trim(), "https://api.organisely.com/v1");
}

#[test]
fn test_config_set_rejects_unknown_key() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "colour", "blue"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
    assert!(stderr.contains("colour"));
}

#[test]
fn test_config_get_unknown_key_is_config_error() {
    let dir = TempDir::new().unwrap();
    let (stdout, stderr, code) = run_cli(dir.path(), &["config", "get", "colour"]);
    assert_eq!(code, 1);
    assert!(stdout.is_empty());
    assert!(stderr.contains("error: Configuration error: Unknown configuration key: colour"));
}

#[test]
fn test_integrations_resolve_rejects_malformed_registry_file() {
    let dir = TempDir::new().unwrap();
    let registry = dir.path().join("broken.json");
    std::fs::write(&registry, "[{not json").unwrap();

    let (_, stderr, code) = run_cli(
        dir.path(),
        &["integrations", "resolve", "gmail", "--registry", registry.to_str().unwrap()],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("error: JSON error:"));
}

#[test]
fn test_config_show_masks_api_key() {
    let dir = TempDir::new().unwrap();
    run_cli(dir.path(), &["config", "set", "api_key", "sk_secret"]);

    let (stdout, _, code) = run_cli(dir.path(), &["config", "show"]);
    assert_eq!(code, 0);
    let config = parse_json(&stdout);
    assert_eq!(config["api_key"], "***");
    assert!(!stdout.contains("sk_secret"));
}

#[test]
fn test_habits_list_requires_user_id() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["habits", "list"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("User ID is required"));
}

#[test]
fn test_integrations_bases() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["integrations", "bases"]);
    assert_eq!(code, 0);
    let bases = parse_json(&stdout);
    let ids: Vec<&str> = bases
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["calendar-base", "email-base", "habits-base"]);
}

#[test]
fn test_integrations_resolve_and_can_install() {
    let dir = TempDir::new().unwrap();
    let registry = dir.path().join("extra.json");
    std::fs::write(
        &registry,
        r#"[{
            "id": "gmail",
            "name": "Gmail",
            "type": "oauth2",
            "status": "active",
            "scopes": ["read:profile"],
            "event_triggers": ["email.important"],
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z",
            "user_id": "u1",
            "version": "1.0.0",
            "extends": ["email-base"]
        }]"#,
    )
    .unwrap();
    let registry = registry.to_str().unwrap();

    let (stdout, _, code) = run_cli(
        dir.path(),
        &["integrations", "resolve", "gmail", "--registry", registry],
    );
    assert_eq!(code, 0);
    let resolved = parse_json(&stdout);
    assert_eq!(
        resolved["all_scopes"],
        serde_json::json!(["read:profile", "read:emails", "write:emails"])
    );
    assert_eq!(resolved["is_standalone"], false);

    let (stdout, _, _) = run_cli(
        dir.path(),
        &[
            "integrations",
            "can-install",
            "gmail",
            "--scopes",
            "read:profile,read:emails,write:emails",
            "--registry",
            registry,
        ],
    );
    assert_eq!(stdout.trim(), "true");

    let (stdout, _, _) = run_cli(
        dir.path(),
        &[
            "integrations",
            "can-install",
            "gmail",
            "--scopes",
            "read:profile",
            "--registry",
            registry,
        ],
    );
    assert_eq!(stdout.trim(), "false");
}

#[test]
fn test_integrations_resolve_unknown_fails() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["integrations", "resolve", "nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error: Registry error: Integration nope not found"));
}

#[test]
fn test_integrations_extend_warns_on_overlap() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(
        dir.path(),
        &["integrations", "extend", "email-base", "--scopes", "read:emails,read:profile"],
    );
    assert_eq!(code, 0);
    let out = parse_json(&stdout);
    assert_eq!(out["request"]["name"], "Extended Email");
    assert_eq!(out["request"]["extends"], serde_json::json!(["email-base"]));
    assert_eq!(out["validation"]["valid"], true);
    assert_eq!(out["validation"]["warnings"].as_array().unwrap().len(), 1);

    let (_, stderr, code) = run_cli(dir.path(), &["integrations", "extend", "fax-base"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("fax-base"));
}

#[test]
fn test_oauth_url() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(
        dir.path(),
        &[
            "oauth",
            "url",
            "--client-id",
            "app_1",
            "--redirect-uri",
            "http://localhost/cb",
            "--scope",
            "read:habits",
            "--scope",
            "write:habits",
            "--state",
            "s1",
        ],
    );
    assert_eq!(code, 0);
    let url = stdout.trim();
    assert!(url.starts_with("https://organisely.com/oauth/authorize?client_id=app_1"));
    assert!(url.contains("response_type=code"));
    assert!(url.contains("scope=read%3Ahabits+write%3Ahabits"));
    assert!(url.ends_with("state=s1"));
}

const PAYLOAD: &str = r#"{
    "event": "habit.completed",
    "data": {"habit_id": "h1"},
    "userId": "u1",
    "timestamp": "2025-03-01T08:00:00Z",
    "eventId": "evt_1",
    "secret": "k"
}"#;

#[test]
fn test_webhook_handle_accepts_valid_secret() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli_with_stdin(
        dir.path(),
        &["webhook", "handle", "--secret", "k"],
        Some(PAYLOAD),
    );
    assert_eq!(code, 0);
    let out = parse_json(&stdout);
    assert_eq!(out["status"], 200);
    assert_eq!(out["events"][0]["event_type"], "habit.completed");
    assert_eq!(out["events"][0]["user_id"], "u1");
}

#[test]
fn test_webhook_handle_rejects_wrong_secret() {
    let dir = TempDir::new().unwrap();
    let (stdout, stderr, code) = run_cli_with_stdin(
        dir.path(),
        &["webhook", "handle", "--secret", "other"],
        Some(PAYLOAD),
    );
    assert_eq!(code, 1);
    let out = parse_json(&stdout);
    assert_eq!(out["status"], 400);
    assert_eq!(out["events"], serde_json::json!([]));
    assert!(stderr.contains("status 400"));
    assert!(stderr.contains("webhook_failed"));
}

#[test]
fn test_webhook_handle_rejects_get() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli_with_stdin(
        dir.path(),
        &["webhook", "handle", "--method", "GET"],
        Some(PAYLOAD),
    );
    assert_eq!(code, 1);
    assert_eq!(parse_json(&stdout)["status"], 405);
}
