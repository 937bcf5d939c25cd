//! End-to-end tests for the entrygate binary.
//!
//! Each test isolates configuration by passing `--config` or pointing the
//! config directories at an empty temp dir.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

const ENTRIES: &str = r#"{"type":"request","content":{"uri":"sw.js","response_status":200}}
{"type":"request","content":{"uri":"/login","response_status":200,"parameters":{"password":"hunter2"}}}
{"type":"request","content":{"uri":"/pay","response_status":500,"parameters":{"password":"hunter2","amount":5},"headers":{"Authorization":"Bearer x"}}}
{"type":"exception","content":{"class":"RuntimeException","message":"boom"}}
{"type":"job","content":{"name":"SendMail","status":"failed"}}
"#;

/// Get a Command for the entrygate binary with a clean environment.
fn entrygate(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("entrygate").expect("entrygate binary should exist");
    cmd.env_remove("ENTRYGATE_CONFIG")
        .env_remove("ENTRYGATE_ENV")
        .env_remove("APP_ENV")
        .env_remove("ENTRYGATE_LOG")
        .env_remove("RUST_LOG")
        .env("ENTRYGATE_CONFIG_DIR", config_home.path())
        .env("XDG_CONFIG_HOME", config_home.path());
    cmd
}

fn parse_lines(stdout: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("stdout line is JSON"))
        .collect()
}

mod filter {
    use super::*;

    #[test]
    fn production_keeps_important_entries_and_masks() {
        let home = TempDir::new().unwrap();
        let output = entrygate(&home)
            .args(["--env", "production", "filter"])
            .write_stdin(ENTRIES)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let kept = parse_lines(&output);
        assert_eq!(kept.len(), 3);
        assert_eq!(kept[0]["content"]["uri"], "/pay");
        assert_eq!(kept[0]["content"]["parameters"]["password"], "********");
        assert_eq!(kept[0]["content"]["parameters"]["amount"], 5);
        assert_eq!(kept[0]["content"]["headers"]["Authorization"], "********");
        assert_eq!(kept[1]["type"], "exception");
        assert_eq!(kept[2]["type"], "job");
    }

    #[test]
    fn local_keeps_everything_but_service_worker() {
        let home = TempDir::new().unwrap();
        let output = entrygate(&home)
            .args(["filter", "--env", "local"])
            .write_stdin(ENTRIES)
            .assert()
            .code(0)
            .get_output()
            .stdout
            .clone();

        let kept = parse_lines(&output);
        assert_eq!(kept.len(), 4);
        assert_eq!(kept[0]["content"]["parameters"]["password"], "hunter2");
    }

    #[test]
    fn environment_variable_selects_environment() {
        let home = TempDir::new().unwrap();
        let output = entrygate(&home)
            .env("APP_ENV", "local")
            .arg("filter")
            .write_stdin(ENTRIES)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        assert_eq!(parse_lines(&output).len(), 4);
    }

    #[test]
    fn stats_are_written_to_stderr() {
        let home = TempDir::new().unwrap();
        entrygate(&home)
            .args(["filter", "--stats"])
            .write_stdin(ENTRIES)
            .assert()
            .success()
            .stderr(predicate::str::contains(r#""seen":5"#))
            .stderr(predicate::str::contains(r#""dropped_service_worker":1"#));
    }

    #[test]
    fn malformed_lines_are_skipped_with_partial_exit() {
        let home = TempDir::new().unwrap();
        let input = format!("not json\n{}", ENTRIES);
        let output = entrygate(&home)
            .arg("filter")
            .write_stdin(input)
            .assert()
            .code(1)
            .get_output()
            .stdout
            .clone();
        assert_eq!(parse_lines(&output).len(), 3);
    }

    #[test]
    fn invalid_utf8_line_is_skipped_and_reading_continues() {
        let home = TempDir::new().unwrap();
        let mut input = b"{\"type\":\"exception\",\"content\":{}}\n".to_vec();
        input.extend_from_slice(b"{\"type\":\"job\",\"content\":{\"name\":\"\xff\xfe\"}}\n");
        input.extend_from_slice(b"{\"type\":\"job\",\"content\":{\"status\":\"failed\"}}\n");

        let output = entrygate(&home)
            .args(["--env", "production", "filter", "--stats"])
            .write_stdin(input)
            .assert()
            .code(1)
            .stderr(predicate::str::contains(r#""malformed":1"#))
            .get_output()
            .stdout
            .clone();

        let kept = parse_lines(&output);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[1]["type"], "job");
        assert_eq!(kept[1]["content"]["status"], "failed");
    }

    #[test]
    fn invalid_utf8_line_under_strict_reports_its_line() {
        let home = TempDir::new().unwrap();
        let mut input = b"{\"type\":\"exception\"}\n".to_vec();
        input.extend_from_slice(b"\xc3\x28\n");
        entrygate(&home)
            .args(["filter", "--strict"])
            .write_stdin(input)
            .assert()
            .code(12)
            .stderr(predicate::str::contains("line 2"));
    }

    #[test]
    fn local_output_matches_input_documents() {
        let home = TempDir::new().unwrap();
        let input = r#"{"type":"request","family_hash":"abc","user":{"id":1},"content":{"uri":"/"}}
{"uuid":"6f1c2a0e-5d1b-4c7e-9a3f-0b8e2d4c6a10","type":"schedule","content":{"command":"inspire"},"tags":[],"recorded_at":"2026-01-15T14:30:22+00:00"}
{"type":"request","content":{"uri":"/login","parameters":{"password":"hunter2"},"headers":{"Cookie":"s=1"}},"tags":["b","a"]}
{"type":"livewire","content":null,"sequence":7}
"#;
        let output = entrygate(&home)
            .args(["--env", "local", "filter"])
            .write_stdin(input)
            .assert()
            .code(0)
            .get_output()
            .stdout
            .clone();

        let expected: Vec<Value> = input
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(parse_lines(&output), expected);
    }

    #[test]
    fn strict_mode_fails_on_malformed_line() {
        let home = TempDir::new().unwrap();
        entrygate(&home)
            .args(["filter", "--strict"])
            .write_stdin("{\"type\":\"request\",\"content\":[1]}\n")
            .assert()
            .code(12)
            .stderr(predicate::str::contains("line 1"));
    }

    #[test]
    fn reads_input_and_writes_output_files() {
        let home = TempDir::new().unwrap();
        let input = home.path().join("in.jsonl");
        let output = home.path().join("out.jsonl");
        fs::write(&input, ENTRIES).unwrap();

        entrygate(&home)
            .arg("filter")
            .arg("--input")
            .arg(&input)
            .arg("--output")
            .arg(&output)
            .assert()
            .success()
            .stdout(predicate::str::is_empty());

        let written = fs::read(&output).unwrap();
        assert_eq!(parse_lines(&written).len(), 3);
    }

    #[test]
    fn missing_input_file_is_io_error() {
        let home = TempDir::new().unwrap();
        entrygate(&home)
            .args(["filter", "--input"])
            .arg(home.path().join("missing.jsonl"))
            .assert()
            .code(21);
    }

    #[test]
    fn config_file_extends_hidden_parameters() {
        let home = TempDir::new().unwrap();
        let config = home.path().join("custom.json");
        fs::write(
            &config,
            r#"{"environment": "staging", "redaction": {"hidden_parameters": ["amount"]}}"#,
        )
        .unwrap();

        let output = entrygate(&home)
            .arg("--config")
            .arg(&config)
            .arg("filter")
            .write_stdin(ENTRIES)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let kept = parse_lines(&output);
        assert_eq!(kept[0]["content"]["parameters"]["amount"], "********");
        assert_eq!(kept[0]["content"]["parameters"]["password"], "********");
    }
}

mod explain {
    use super::*;

    #[test]
    fn prints_one_decision_per_entry() {
        let home = TempDir::new().unwrap();
        let output = entrygate(&home)
            .args(["explain", "--env", "production"])
            .write_stdin(ENTRIES)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let decisions = parse_lines(&output);
        let reasons: Vec<&str> = decisions
            .iter()
            .map(|d| d["reason"].as_str().unwrap())
            .collect();
        assert_eq!(
            reasons,
            [
                "service_worker",
                "not_important",
                "failed_request",
                "reportable_exception",
                "failed_job"
            ]
        );
        assert_eq!(decisions[2]["decision"], "keep");
        assert_eq!(decisions[2]["masked"], 2);
        assert_eq!(decisions[0]["decision"], "drop");
    }
}

mod config {
    use super::*;

    #[test]
    fn check_reports_resolved_settings() {
        let home = TempDir::new().unwrap();
        entrygate(&home)
            .args(["check", "--env", "staging"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""status": "ok""#))
            .stdout(predicate::str::contains(r#""environment": "staging""#))
            .stdout(predicate::str::contains(r#""environment_source": "cli_argument""#));
    }

    #[test]
    fn invalid_config_exits_with_config_error() {
        let home = TempDir::new().unwrap();
        let config = home.path().join("bad.json");
        fs::write(&config, r#"{"redaction": {"placeholder": ""}}"#).unwrap();

        entrygate(&home)
            .arg("--config")
            .arg(&config)
            .arg("check")
            .assert()
            .code(11)
            .stderr(predicate::str::contains("configuration error"));
    }

    #[test]
    fn unknown_config_keys_are_rejected() {
        let home = TempDir::new().unwrap();
        let config = home.path().join("typo.json");
        fs::write(&config, r#"{"monitored_tag": ["billing"]}"#).unwrap();

        entrygate(&home)
            .arg("--config")
            .arg(&config)
            .arg("check")
            .assert()
            .code(11);
    }

    #[test]
    fn defaults_output_is_a_loadable_config() {
        let home = TempDir::new().unwrap();
        let output = entrygate(&home)
            .arg("defaults")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let path = home.path().join("entrygate.json");
        fs::write(&path, &output).unwrap();
        entrygate(&home).arg("check").assert().success().stdout(
            predicate::str::contains(r#""config_source": "environment""#),
        );
    }
}

mod args {
    use super::*;

    #[test]
    fn unknown_command_is_args_error() {
        let home = TempDir::new().unwrap();
        entrygate(&home)
            .arg("nonexistent-command")
            .assert()
            .code(10)
            .stderr(predicate::str::contains("error"));
    }

    #[test]
    fn invalid_log_level_is_args_error() {
        let home = TempDir::new().unwrap();
        entrygate(&home)
            .args(["--log-level", "loud", "check"])
            .assert()
            .code(10);
    }

    #[test]
    fn help_exits_cleanly() {
        let home = TempDir::new().unwrap();
        entrygate(&home)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("filter"));
    }
}
