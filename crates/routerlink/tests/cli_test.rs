//! Integration tests for the `routerlink` CLI binary.
//!
//! Argument parsing, config handling and exit codes, plus end-to-end runs
//! against a scripted RouterOS API responder on a local TCP port.
#![allow(clippy::unwrap_used)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::thread::JoinHandle;
use std::time::Duration;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `routerlink` binary with env isolation.
fn routerlink_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("routerlink");
    cmd.env("HOME", "/tmp/routerlink-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/routerlink-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("ROUTERLINK_ROUTER")
        .env_remove("ROUTERLINK_CONFIG")
        .env_remove("ROUTERLINK_OUTPUT")
        .env_remove("ROUTERLINK_DEADLINE");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Write `body` as config.toml in a fresh temp dir.
fn config_file(body: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, body).unwrap();
    (dir, path)
}

fn router_config(port: u16) -> String {
    format!(
        r#"
default_router = "r1"

[routers.r1]
host = "127.0.0.1"
port = {port}
username = "billing"
password = "s3cret"
"#
    )
}

// ── Scripted RouterOS responder ─────────────────────────────────────
//
// Only short words (< 0x80 bytes) are needed, so lengths are one byte.

fn read_sentence(stream: &mut TcpStream) -> Option<Vec<String>> {
    let mut words = Vec::new();
    loop {
        let mut len = [0u8; 1];
        stream.read_exact(&mut len).ok()?;
        assert!(len[0] < 0x80, "test responder only handles short words");
        if len[0] == 0 {
            return Some(words);
        }
        let mut word = vec![0u8; usize::from(len[0])];
        stream.read_exact(&mut word).ok()?;
        words.push(String::from_utf8(word).unwrap());
    }
}

fn write_sentence(stream: &mut TcpStream, words: &[&str]) {
    let mut buf = Vec::new();
    for word in words {
        buf.push(u8::try_from(word.len()).unwrap());
        buf.extend_from_slice(word.as_bytes());
    }
    buf.push(0);
    stream.write_all(&buf).unwrap();
}

/// A router with one PPP secret `u1` (`disabled` as given) and one live
/// session `*80000001`. Serves connections until `/quit` has been seen
/// `sessions` times and returns every command it received.
fn spawn_router(disabled: &'static str, sessions: usize) -> (u16, JoinHandle<Vec<String>>) {
    spawn_slow_router(disabled, sessions, Duration::ZERO)
}

/// Like [`spawn_router`], but holds every `/ppp/secret/print` reply back
/// for `stall`.
fn spawn_slow_router(
    disabled: &'static str,
    sessions: usize,
    stall: Duration,
) -> (u16, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = std::thread::spawn(move || {
        let mut received = Vec::new();
        for _ in 0..sessions {
            let (mut stream, _) = listener.accept().unwrap();
            while let Some(words) = read_sentence(&mut stream) {
                let Some(command) = words.first().cloned() else {
                    continue;
                };
                received.push(words.join(" "));
                match command.as_str() {
                    "/ppp/secret/print" => {
                        std::thread::sleep(stall);
                        let disabled = format!("=disabled={disabled}");
                        write_sentence(
                            &mut stream,
                            &["!re", "=.id=*1", "=name=u1", &disabled, "=profile=10M"],
                        );
                        write_sentence(&mut stream, &["!done"]);
                    }
                    "/ppp/active/print" => {
                        write_sentence(&mut stream, &["!re", "=.id=*80000001"]);
                        write_sentence(&mut stream, &["!done"]);
                    }
                    "/quit" => {
                        write_sentence(&mut stream, &["!fatal", "session terminated on request"]);
                        break;
                    }
                    _ => write_sentence(&mut stream, &["!done"]),
                }
            }
        }
        received
    });

    (port, handle)
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = routerlink_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_flag() {
    routerlink_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("secret")
            .and(predicate::str::contains("active"))
            .and(predicate::str::contains("routers")),
    );
}

#[test]
fn test_version_flag() {
    routerlink_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("routerlink"));
}

#[test]
fn test_completions_zsh() {
    routerlink_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_disable_requires_account() {
    let output = routerlink_cmd().args(["secret", "disable"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Configuration errors ────────────────────────────────────────────

#[test]
fn test_no_routers_configured() {
    let (_dir, path) = config_file("");
    routerlink_cmd()
        .arg("--config")
        .arg(&path)
        .args(["secret", "status", "u1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No routers configured"));
}

#[test]
fn test_unknown_router() {
    let (_dir, path) = config_file(&router_config(8728));
    routerlink_cmd()
        .arg("--config")
        .arg(&path)
        .args(["--router", "nope", "secret", "status", "u1"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("nope"));
}

#[test]
fn test_missing_password_is_auth_error() {
    let (_dir, path) = config_file(
        r#"
[routers.cli-test-no-password]
host = "127.0.0.1"
username = "billing"
password_env = "ROUTERLINK_CLI_TEST_UNSET_PASSWORD"
"#,
    );
    routerlink_cmd()
        .arg("--config")
        .arg(&path)
        .env_remove("ROUTERLINK_CLI_TEST_UNSET_PASSWORD")
        .args(["secret", "disable", "u1"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("set-password"));
}

#[test]
fn test_routers_list_plain() {
    let (_dir, path) = config_file(&router_config(8728));
    routerlink_cmd()
        .arg("--config")
        .arg(&path)
        .args(["-o", "plain", "routers", "list"])
        .assert()
        .success()
        .stdout("r1\n");
}

#[test]
fn test_config_show_redacts_password() {
    let (_dir, path) = config_file(&router_config(8728));
    routerlink_cmd()
        .arg("--config")
        .arg(&path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("********").and(predicate::str::contains("s3cret").not()));
}

#[test]
fn test_config_path_honors_flag() {
    let (_dir, path) = config_file("");
    routerlink_cmd()
        .arg("--config")
        .arg(&path)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

// ── Against a live responder ────────────────────────────────────────

#[test]
fn test_disable_end_to_end() {
    let (port, router) = spawn_router("false", 1);
    let (_dir, path) = config_file(&router_config(port));

    routerlink_cmd()
        .arg("--config")
        .arg(&path)
        .args(["-o", "plain", "secret", "disable", "u1"])
        .assert()
        .success()
        .stdout("u1\tPPP Secret disabled successfully\n");

    let received = router.join().unwrap();
    assert_eq!(
        received,
        [
            "/login =name=billing =password=s3cret",
            "/ppp/secret/print =.proplist=.id,name,disabled ?name=u1",
            "/ppp/secret/set =.id=*1 =disabled=yes",
            "/ppp/active/print =.proplist=.id ?name=u1",
            "/ppp/active/remove =.id=*80000001",
            "/quit",
        ]
    );
}

#[test]
fn test_enable_already_enabled_skips_write() {
    let (port, router) = spawn_router("false", 1);
    let (_dir, path) = config_file(&router_config(port));

    routerlink_cmd()
        .arg("--config")
        .arg(&path)
        .args(["-o", "json-compact", "secret", "enable", "u1"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""message":"Already enabled""#));

    let received = router.join().unwrap();
    assert!(received.iter().all(|c| !c.starts_with("/ppp/secret/set")));
}

#[test]
fn test_status_json() {
    let (port, router) = spawn_router("true", 1);
    let (_dir, path) = config_file(&router_config(port));

    routerlink_cmd()
        .arg("--config")
        .arg(&path)
        .args(["-o", "json-compact", "secret", "status", "u1"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains(r#""account":"u1""#)
                .and(predicate::str::contains(r#""found":true"#))
                .and(predicate::str::contains(r#""disabled":true"#))
                .and(predicate::str::contains(r#""profile":"10M""#)),
        );

    router.join().unwrap();
}

#[test]
fn test_multiple_accounts_use_one_session_each() {
    let (port, router) = spawn_router("true", 2);
    let (_dir, path) = config_file(&router_config(port));

    routerlink_cmd()
        .arg("--config")
        .arg(&path)
        .args(["-o", "plain", "active", "evict", "u1", "u1"])
        .assert()
        .success();

    let received = router.join().unwrap();
    let logins = received.iter().filter(|c| c.starts_with("/login")).count();
    let quits = received.iter().filter(|c| *c == "/quit").count();
    assert_eq!((logins, quits), (2, 2));
}

#[test]
fn test_timed_out_disable_still_finishes_before_exit() {
    let (port, router) = spawn_slow_router("false", 1, Duration::from_millis(1500));
    let (_dir, path) = config_file(&router_config(port));

    routerlink_cmd()
        .arg("--config")
        .arg(&path)
        .args(["--deadline", "1", "-o", "plain", "secret", "disable", "u1"])
        .assert()
        .code(8)
        .stdout("u1\tOperation timeout\n");

    let received = router.join().unwrap();
    assert_eq!(
        received,
        [
            "/login =name=billing =password=s3cret",
            "/ppp/secret/print =.proplist=.id,name,disabled ?name=u1",
            "/ppp/secret/set =.id=*1 =disabled=yes",
            "/ppp/active/print =.proplist=.id ?name=u1",
            "/ppp/active/remove =.id=*80000001",
            "/quit",
        ]
    );
}

#[test]
fn test_unreachable_router_exit_code() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let (_dir, path) = config_file(&router_config(port));

    routerlink_cmd()
        .arg("--config")
        .arg(&path)
        .args(["secret", "disable", "u1"])
        .assert()
        .code(7)
        .stdout(predicate::str::contains("failed"));
}

#[test]
fn test_empty_account_needs_no_router_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let (_dir, path) = config_file(&router_config(port));

    routerlink_cmd()
        .arg("--config")
        .arg(&path)
        .args(["-o", "plain", "secret", "disable", ""])
        .assert()
        .success()
        .stdout("\tNo username provided\n");
}
