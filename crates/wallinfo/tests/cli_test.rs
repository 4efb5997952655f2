//! Integration tests for the `wallinfo` CLI binary.
//!
//! Every test points the settings and connections files into a fresh temp
//! directory so the user's real configuration is never read or written.
#![allow(clippy::unwrap_used)]

use std::path::Path;
use std::time::Duration;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `wallinfo` binary with env isolation.
fn wallinfo_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("wallinfo");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .env("USER", "tester")
        .env("NO_COLOR", "1")
        .env_remove("USERNAME")
        .env_remove("RUST_LOG")
        .env_remove("WALLINFO_CONFIG")
        .env_remove("WALLINFO_CONNECTIONS_FILE")
        .env_remove("WALLINFO_OUTPUT")
        .env_remove("WALLINFO_TIMEOUT_SECS")
        .env_remove("WALLINFO_TEMPLATE")
        .env_remove("WALLINFO_NOTE");
    cmd
}

/// A command bound to `settings.toml` inside `dir`.
fn with_settings(dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = wallinfo_cmd(dir.path());
    cmd.arg("--config").arg(dir.path().join("settings.toml"));
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let dir = TempDir::new().unwrap();
    let output = wallinfo_cmd(dir.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let dir = TempDir::new().unwrap();
    wallinfo_cmd(dir.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("render")
            .and(predicate::str::contains("connections"))
            .and(predicate::str::contains("place")),
    );
}

#[test]
fn test_version_flag() {
    let dir = TempDir::new().unwrap();
    wallinfo_cmd(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("wallinfo"));
}

#[test]
fn test_completions_zsh() {
    let dir = TempDir::new().unwrap();
    wallinfo_cmd(dir.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Render ──────────────────────────────────────────────────────────

#[test]
fn test_render_builtin_and_note() {
    let dir = TempDir::new().unwrap();
    with_settings(&dir)
        .args(["render", "-t", "User: {user} {API:missing}", "--note", "back soon"])
        .assert()
        .success()
        .stdout("User: tester {API:missing}\nNote: back soon\n");
}

#[test]
fn test_render_json_output() {
    let dir = TempDir::new().unwrap();
    let output = with_settings(&dir)
        .args(["-o", "json", "render", "-t", "{user}"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["text"], "tester");
    assert_eq!(value["connections"], serde_json::json!([]));
}

#[test]
fn test_render_from_file_connection() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("status.json");
    std::fs::write(&data, r#"{"build":{"state":"green"}}"#).unwrap();

    with_settings(&dir)
        .args(["connections", "add", "ci", "--url"])
        .arg(&data)
        .args(["--json-path", "build.state"])
        .assert()
        .success()
        .stderr(predicate::str::contains("{API:ci}"));

    with_settings(&dir)
        .args(["render", "-t", "CI: {API:ci}"])
        .assert()
        .success()
        .stdout("CI: green\n");
}

#[cfg(unix)]
#[test]
fn test_render_command_connection_with_regex() {
    let dir = TempDir::new().unwrap();
    with_settings(&dir)
        .args([
            "connections",
            "add",
            "load",
            "--url",
            "cmd://echo load=0.42",
            "--regex",
            r"load=([\d.]+)",
        ])
        .assert()
        .success();

    with_settings(&dir)
        .args(["render", "-t", "{API:load}|{API:load}"])
        .assert()
        .success()
        .stdout("0.42|0.42\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_render_http_connection_and_explain() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"now": {"temp": 21}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    with_settings(&dir)
        .args(["connections", "add", "weather", "--url"])
        .arg(format!("{}/weather", server.uri()))
        .args(["-j", "now.temp"])
        .assert()
        .success();

    with_settings(&dir)
        .args(["render", "--explain", "-t", "{API:weather}C"])
        .assert()
        .success()
        .stdout("21C\n")
        .stderr(predicate::str::contains("weather").and(predicate::str::contains("ok")));
}

#[test]
fn test_render_failed_source_shows_marker() {
    let dir = TempDir::new().unwrap();
    with_settings(&dir)
        .args(["connections", "add", "gone", "--url", "http://127.0.0.1:1/x"])
        .assert()
        .success();

    with_settings(&dir)
        .args(["--timeout", "2", "render", "-t", "[{API:gone}]"])
        .assert()
        .success()
        .stdout("[(error)]\n");
}

// ── Connections ─────────────────────────────────────────────────────

#[test]
fn test_connections_list_in_insertion_order() {
    let dir = TempDir::new().unwrap();
    for name in ["zeta", "alpha"] {
        with_settings(&dir)
            .args(["connections", "add", name, "--url", "cmd://true"])
            .assert()
            .success();
    }

    with_settings(&dir)
        .args(["-o", "plain", "connections", "list"])
        .assert()
        .success()
        .stdout("zeta\nalpha\n");
}

#[test]
fn test_duplicate_add_is_conflict() {
    let dir = TempDir::new().unwrap();
    with_settings(&dir)
        .args(["connections", "add", "a", "--url", "cmd://true"])
        .assert()
        .success();

    let output = with_settings(&dir)
        .args(["connections", "add", "a", "--url", "cmd://false"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(6));
    assert!(combined_output(&output).contains("already exists"));
}

#[test]
fn test_show_missing_connection_exits_not_found() {
    let dir = TempDir::new().unwrap();
    let output = with_settings(&dir)
        .args(["connections", "show", "nope"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("not found"));
}

#[test]
fn test_update_renames_connection() {
    let dir = TempDir::new().unwrap();
    with_settings(&dir)
        .args(["connections", "add", "old", "--url", "cmd://true"])
        .assert()
        .success();
    with_settings(&dir)
        .args(["connections", "update", "old", "--rename", "new"])
        .assert()
        .success();

    with_settings(&dir)
        .args(["-o", "plain", "connections", "list"])
        .assert()
        .success()
        .stdout("new\n");
}

#[test]
fn test_delete_without_yes_fails_non_interactive() {
    let dir = TempDir::new().unwrap();
    with_settings(&dir)
        .args(["connections", "add", "a", "--url", "cmd://true"])
        .assert()
        .success();

    let output = with_settings(&dir)
        .args(["connections", "delete", "a"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--yes"));

    with_settings(&dir)
        .args(["connections", "delete", "a", "--yes"])
        .assert()
        .success();
    with_settings(&dir)
        .args(["connections", "show", "a"])
        .assert()
        .code(4);
}

#[cfg(unix)]
#[test]
fn test_connection_test_shows_raw() {
    let dir = TempDir::new().unwrap();
    with_settings(&dir)
        .args(["connections", "add", "c", "--url", "cmd://echo value=7", "-r", r"value=(\d+)"])
        .assert()
        .success();

    with_settings(&dir)
        .args(["connections", "test", "c"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Status:     ok")
                .and(predicate::str::contains("Value:      7"))
                .and(predicate::str::contains("value=7")),
        );
}

// ── Place ───────────────────────────────────────────────────────────

#[test]
fn test_place_maps_preview_to_target() {
    let dir = TempDir::new().unwrap();
    with_settings(&dir)
        .args([
            "place",
            "--left",
            "100",
            "--top",
            "50",
            "--target-width",
            "1920",
            "--target-height",
            "1080",
            "--scale",
            "0.5",
        ])
        .assert()
        .success()
        .stdout("Preview: 100, 50\nScaled: 200, 100\n");
}

#[test]
fn test_place_json_output() {
    let dir = TempDir::new().unwrap();
    let output = with_settings(&dir)
        .args([
            "-o",
            "json",
            "place",
            "--left",
            "900",
            "--top",
            "50",
            "--target-width",
            "1920",
            "--target-height",
            "1080",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    // left is pulled back so the 300px block stays on the 960px preview
    let json = String::from_utf8(output.stdout).unwrap();
    insta::assert_snapshot!(json.trim_end(), @r#"
    {
      "rect": {
        "left": 660,
        "top": 50,
        "width": 300,
        "height": 150
      },
      "scale": {
        "preview_width": 960,
        "preview_height": 540,
        "target_width": 1920,
        "target_height": 1080
      },
      "target": {
        "x": 1320,
        "y": 100
      }
    }
    "#);
}

#[test]
fn test_place_zero_scale_is_usage_error() {
    let dir = TempDir::new().unwrap();
    with_settings(&dir)
        .args(["place", "--scale", "0"])
        .assert()
        .code(2);
}

// ── Watch ───────────────────────────────────────────────────────────

#[test]
fn test_watch_count_stops_after_first_render() {
    let dir = TempDir::new().unwrap();
    with_settings(&dir)
        .args(["-o", "plain", "watch", "-t", "User: {user}", "--count", "1"])
        .timeout(Duration::from_secs(60))
        .assert()
        .success()
        .stdout("User: tester\n");
}

#[test]
fn test_watch_writes_render_to_file() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("wall.txt");
    with_settings(&dir)
        .args(["watch", "-t", "{user}", "--note", "hi", "-n", "1", "--out"])
        .arg(&out)
        .timeout(Duration::from_secs(60))
        .assert()
        .success()
        .stdout("");

    assert_eq!(std::fs::read_to_string(&out).unwrap(), "tester\nNote: hi");
}

#[test]
fn test_watch_json_emits_one_line_per_render() {
    let dir = TempDir::new().unwrap();
    let output = with_settings(&dir)
        .args(["-o", "json", "watch", "-t", "{user}", "-n", "1"])
        .timeout(Duration::from_secs(60))
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 1);
    let value: serde_json::Value = serde_json::from_str(stdout.trim_end()).unwrap();
    assert_eq!(value["text"], "tester");
    assert!(value["rendered_at"].is_string());
}

// ── Environment layer ───────────────────────────────────────────────

#[test]
fn test_env_scalars_override_text_settings() {
    let dir = TempDir::new().unwrap();
    with_settings(&dir)
        .env("WALLINFO_TEMPLATE", "2024")
        .env("WALLINFO_NOTE", "42")
        .arg("render")
        .assert()
        .success()
        .stdout("2024\nNote: 42\n");
}

#[test]
fn test_env_unparsable_timeout_uses_default() {
    let dir = TempDir::new().unwrap();
    with_settings(&dir)
        .env("WALLINFO_TIMEOUT_SECS", "abc")
        .args(["render", "-t", "{user}"])
        .assert()
        .success()
        .stdout("tester\n");

    with_settings(&dir)
        .env("WALLINFO_TIMEOUT_SECS", "-1")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("timeout_secs = 5"));
}

#[test]
fn test_env_overrides_settings_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("settings.toml"),
        "template = \"from file\"\n[target]\nwidth = 3840\n",
    )
    .unwrap();

    with_settings(&dir)
        .env("WALLINFO_TEMPLATE", "from env")
        .env("WALLINFO_TARGET__WIDTH", "1920")
        .args(["place", "--left", "100", "--top", "50", "--target-height", "1080"])
        .assert()
        .success()
        .stdout("Preview: 100, 50\nScaled: 200, 100\n");

    with_settings(&dir)
        .env("WALLINFO_TEMPLATE", "from env")
        .arg("render")
        .assert()
        .success()
        .stdout("from env\n");
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_init_then_show() {
    let dir = TempDir::new().unwrap();
    with_settings(&dir)
        .args(["config", "init", "--defaults"])
        .assert()
        .success();
    assert!(dir.path().join("settings.toml").exists());
    assert!(dir.path().join("connections.json").exists());

    with_settings(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("timeout_secs = 5"));

    let output = with_settings(&dir)
        .args(["config", "init", "--defaults"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(6));
}

#[test]
fn test_config_path_plain() {
    let dir = TempDir::new().unwrap();
    let settings = dir.path().join("settings.toml");
    let connections = dir.path().join("connections.json");
    with_settings(&dir)
        .args(["-o", "plain", "config", "path"])
        .assert()
        .success()
        .stdout(format!("{}\n{}\n", settings.display(), connections.display()));
}

#[test]
fn test_configured_template_is_default() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("settings.toml"),
        "template = \"hello {user}\"\nnote = \"  \"\n",
    )
    .unwrap();

    with_settings(&dir)
        .arg("render")
        .assert()
        .success()
        .stdout("hello tester\n");
}
