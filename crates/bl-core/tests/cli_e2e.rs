//! End-to-end CLI tests for bayes-lab.
//!
//! Every test runs the real binary with the config lookup pinned to an
//! empty temp directory, so a developer's own settings never leak in.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

struct Env {
    dir: TempDir,
}

impl Env {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("bayes-lab");
        cmd.env_remove("BAYES_LAB_CONFIG")
            .env_remove("BAYES_LAB_LOG")
            .env_remove("BAYES_LAB_LOG_FORMAT")
            .env_remove("RUST_LOG")
            .env("BAYES_LAB_CONFIG_DIR", self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path())
            .env("HOME", self.dir.path());
        cmd
    }

    fn write_config(&self, name: &str, body: &str) -> std::path::PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, body).expect("write config");
        path
    }
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("stdout is JSON")
}

// ============================================================================
// compute
// ============================================================================

mod compute {
    use super::*;

    #[test]
    fn rare_disease_json() {
        let env = Env::new();
        let json = stdout_json(env.cmd().args(["compute", "-p", "1", "-s", "95", "-t", "95"]));

        assert_eq!(json["command"], "compute");
        assert_eq!(json["schema_version"], bl_common::SCHEMA_VERSION);
        assert!(json["session_id"].as_str().is_some());
        let posterior = json["result"]["posterior"].as_f64().unwrap();
        assert!((posterior - 0.161017).abs() < 1e-5);
        assert_eq!(json["rounded"]["true_positive"], 10);
        assert_eq!(json["rounded"]["false_positive"], 50);
    }

    #[test]
    fn scenario_fills_rates() {
        let env = Env::new();
        let json = stdout_json(env.cmd().args(["compute", "--scenario", "specialist clinic"]));
        assert_eq!(json["scenario"], "Specialist clinic");
        assert_eq!(json["inputs"]["prevalence"], 30.0);
        assert!(json["insight"].as_str().is_some());
    }

    #[test]
    fn flag_overrides_scenario() {
        let env = Env::new();
        let json = stdout_json(env.cmd().args([
            "compute",
            "--scenario",
            "Rare disease screening",
            "-t",
            "99",
        ]));
        assert_eq!(json["inputs"]["specificity"], 99.0);
        assert_eq!(json["inputs"]["prevalence"], 1.0);
    }

    #[test]
    fn summary_format() {
        let env = Env::new();
        env.cmd()
            .args(["-f", "summary", "compute", "-p", "1", "-s", "95", "-t", "95"])
            .assert()
            .success()
            .stdout(predicate::str::contains("P(D|+) = 16.10% (TP 10, FP 50)"));
    }

    #[test]
    fn prose_format() {
        let env = Env::new();
        env.cmd()
            .args(["-f", "prose", "compute", "-p", "1", "-s", "95", "-t", "95"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Out of 1000 people"))
            .stdout(predicate::str::contains("16.10%"));
    }

    #[test]
    fn markdown_format() {
        let env = Env::new();
        env.cmd()
            .args(["-f", "md", "compute", "--scenario", "Fraud detection"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with("# Fraud detection"));
    }

    #[test]
    fn exitcode_format_is_silent() {
        let env = Env::new();
        env.cmd()
            .args(["-f", "exitcode", "compute", "-p", "1", "-s", "95", "-t", "95"])
            .assert()
            .code(0)
            .stdout(predicate::str::is_empty());
    }

    #[test]
    fn out_of_range_rate_is_args_error() {
        let env = Env::new();
        env.cmd()
            .args(["compute", "-p", "150", "-s", "95", "-t", "95"])
            .assert()
            .code(10)
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("ERR_ARGS"));
    }

    #[test]
    fn missing_rate_is_args_error() {
        let env = Env::new();
        env.cmd()
            .args(["-f", "summary", "compute", "-p", "1", "-s", "95"])
            .assert()
            .code(10)
            .stderr(predicate::str::contains("--specificity"));
    }

    #[test]
    fn unknown_scenario() {
        let env = Env::new();
        env.cmd()
            .args(["compute", "--scenario", "Nope"])
            .assert()
            .code(12)
            .stderr(predicate::str::contains("ERR_SCENARIO"));
    }
}

// ============================================================================
// explain
// ============================================================================

mod explain {
    use super::*;

    #[test]
    fn specificity_raise() {
        let env = Env::new();
        let json = stdout_json(env.cmd().args(["explain", "--from", "1,95,95", "--to", "1,95,99"]));
        assert_eq!(json["command"], "explain");
        assert_eq!(
            json["explanation"]["text"],
            "You changed specificity (avoiding false alarms). Posterior increased by 32.87 points."
        );
        assert_eq!(json["explanation"]["changes"]["specificity"], true);
        assert_eq!(json["explanation"]["changes"]["prevalence"], false);
    }

    #[test]
    fn between_scenarios_prose() {
        let env = Env::new();
        env.cmd()
            .args([
                "-f",
                "prose",
                "explain",
                "--from-scenario",
                "Specialist clinic",
                "--to-scenario",
                "Fraud detection",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Posterior decreased by 38.92 points."));
    }

    #[test]
    fn malformed_triple() {
        let env = Env::new();
        env.cmd()
            .args(["explain", "--from", "1,95", "--to", "1,95,99"])
            .assert()
            .code(10);
    }

    #[test]
    fn from_and_from_scenario_conflict() {
        let env = Env::new();
        env.cmd()
            .args([
                "explain",
                "--from",
                "1,95,95",
                "--from-scenario",
                "Fraud detection",
                "--to",
                "1,95,99",
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("cannot be used with"));
    }
}

// ============================================================================
// scenarios / sweep
// ============================================================================

mod scenarios {
    use super::*;

    #[test]
    fn list_builtins() {
        let env = Env::new();
        let json = stdout_json(env.cmd().args(["scenarios", "list"]));
        let names: Vec<&str> = json["scenarios"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            ["Rare disease screening", "Specialist clinic", "Fraud detection"]
        );
        assert!(json["scenarios"][0]["posterior"].as_f64().is_some());
    }

    #[test]
    fn show_is_case_insensitive() {
        let env = Env::new();
        let json = stdout_json(env.cmd().args(["scenarios", "show", "FRAUD DETECTION"]));
        assert_eq!(json["scenario"], "Fraud detection");
        assert_eq!(json["inputs"]["specificity"], 98.0);
    }

    #[test]
    fn show_unknown() {
        let env = Env::new();
        env.cmd()
            .args(["scenarios", "show", "Weather"])
            .assert()
            .code(12);
    }

    #[test]
    fn configured_scenarios_are_appended() {
        let env = Env::new();
        let path = env.write_config(
            "custom.json",
            r#"{"scenarios": [{"name": "Mammography", "prevalence": 0.8, "sensitivity": 90, "specificity": 93}]}"#,
        );
        let json = stdout_json(
            env.cmd()
                .arg("--config")
                .arg(&path)
                .args(["scenarios", "list"]),
        );
        let list = json["scenarios"].as_array().unwrap();
        assert_eq!(list.len(), 4);
        assert_eq!(list[3]["name"], "Mammography");
    }
}

mod sweep {
    use super::*;

    #[test]
    fn prevalence_sweep() {
        let env = Env::new();
        let json = stdout_json(env.cmd().args([
            "sweep",
            "--parameter",
            "prevalence",
            "--start",
            "1",
            "--end",
            "3",
            "--step",
            "1",
            "-s",
            "95",
            "-t",
            "95",
        ]));
        let points = json["points"].as_array().unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0]["value"], 1.0);
        assert_eq!(points[2]["value"], 3.0);
        let first = points[0]["posterior"].as_f64().unwrap();
        let last = points[2]["posterior"].as_f64().unwrap();
        assert!(last > first);
    }

    #[test]
    fn swept_parameter_needs_no_flag() {
        let env = Env::new();
        env.cmd()
            .args([
                "-f",
                "summary",
                "sweep",
                "--parameter",
                "specificity",
                "-p",
                "1",
                "-s",
                "95",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("specificity"));
    }

    #[test]
    fn reversed_range_is_rejected() {
        let env = Env::new();
        env.cmd()
            .args([
                "sweep",
                "--parameter",
                "prevalence",
                "--start",
                "50",
                "--end",
                "10",
                "--scenario",
                "Fraud detection",
            ])
            .assert()
            .code(10);
    }

    #[test]
    fn zero_step_is_rejected() {
        let env = Env::new();
        env.cmd()
            .args([
                "sweep",
                "--parameter",
                "prevalence",
                "--step",
                "0",
                "--scenario",
                "Fraud detection",
            ])
            .assert()
            .code(10);
    }
}

// ============================================================================
// lab
// ============================================================================

mod lab {
    use super::*;

    fn steps(stdout: &[u8]) -> Vec<Value> {
        String::from_utf8_lossy(stdout)
            .lines()
            .map(|l| serde_json::from_str(l).expect("JSONL step"))
            .collect()
    }

    #[test]
    fn scripted_session_streams_steps() {
        let env = Env::new();
        let output = env
            .cmd()
            .arg("lab")
            .write_stdin("specificity=99\nquit\nprevalence=50\n")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let steps = steps(&output);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0]["scenario"], "Rare disease screening");
        assert_eq!(
            steps[0]["explanation"]["text"],
            bl_core::inference::ONBOARDING_MESSAGE
        );
        assert_eq!(
            steps[1]["explanation"]["text"],
            "You changed specificity (avoiding false alarms). Posterior increased by 32.87 points."
        );
        assert_eq!(steps[0]["session_id"], steps[1]["session_id"]);
    }

    #[test]
    fn rejected_line_does_not_end_session() {
        let env = Env::new();
        let output = env
            .cmd()
            .args(["lab", "--scenario", "Fraud detection"])
            .write_stdin("accuracy=5\nsensitivity=150\nsensitivity=95\n")
            .assert()
            .success()
            .stderr(predicate::str::contains("accuracy"))
            .get_output()
            .stdout
            .clone();

        let steps = steps(&output);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1]["inputs"]["sensitivity"], 95.0);
    }

    #[test]
    fn prose_lines() {
        let env = Env::new();
        env.cmd()
            .args(["-f", "prose", "lab", "--scenario", "Specialist clinic"])
            .write_stdin("show\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("Move one slider at a time."))
            .stdout(predicate::str::contains("Posterior stayed nearly unchanged."));
    }

    #[test]
    fn unknown_start_scenario() {
        let env = Env::new();
        env.cmd()
            .args(["lab", "--scenario", "Nope"])
            .write_stdin("")
            .assert()
            .code(12);
    }
}

// ============================================================================
// check / config errors
// ============================================================================

mod check {
    use super::*;

    #[test]
    fn defaults_are_ok() {
        let env = Env::new();
        let json = stdout_json(env.cmd().arg("check"));
        assert_eq!(json["status"], "ok");
        assert_eq!(json["snapshot"]["config_source"], "builtin default");
    }

    #[test]
    fn valid_file() {
        let env = Env::new();
        let path = env.write_config("ok.json", r#"{"reference_population": 10000}"#);
        let json = stdout_json(env.cmd().arg("--config").arg(&path).arg("check"));
        assert_eq!(json["status"], "ok");
        assert_eq!(json["snapshot"]["summary"]["reference_population"], 10000.0);
    }

    #[test]
    fn invalid_file() {
        let env = Env::new();
        let path = env.write_config("bad.json", r#"{"reference_population": -1}"#);
        env.cmd()
            .arg("--config")
            .arg(&path)
            .arg("check")
            .assert()
            .code(11)
            .stdout(predicate::str::contains("\"status\": \"error\""));
    }

    #[test]
    fn duplicate_scenario_names_are_rejected() {
        let env = Env::new();
        let path = env.write_config(
            "dup.json",
            r#"{"scenarios": [{"name": "fraud detection", "prevalence": 1, "sensitivity": 1, "specificity": 1}]}"#,
        );
        env.cmd()
            .arg("--config")
            .arg(&path)
            .arg("check")
            .assert()
            .code(11);
    }

    #[test]
    fn missing_explicit_file() {
        let env = Env::new();
        let missing = env.dir.path().join("absent.json");
        env.cmd()
            .arg("--config")
            .arg(&missing)
            .args(["compute", "--scenario", "Fraud detection"])
            .assert()
            .code(11)
            .stderr(predicate::str::contains("ERR_CONFIG"));
    }

    #[test]
    fn env_path_is_used() {
        let env = Env::new();
        let path = env.write_config("env.json", "not json");
        env.cmd()
            .env("BAYES_LAB_CONFIG", &path)
            .arg("check")
            .assert()
            .code(11);
    }

    #[test]
    fn config_dir_file_is_picked_up() {
        let env = Env::new();
        env.write_config("bayes-lab.json", r#"{"reference_population": 200}"#);
        let json = stdout_json(env.cmd().args(["compute", "-p", "50", "-s", "50", "-t", "50"]));
        assert_eq!(json["result"]["population"], 200.0);
    }
}

// ============================================================================
// schema / version
// ============================================================================

mod schema {
    use super::*;

    #[test]
    fn list() {
        let env = Env::new();
        env.cmd()
            .args(["schema", "--list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("PosteriorResult"))
            .stdout(predicate::str::contains("LabStep"));
    }

    #[test]
    fn single_type() {
        let env = Env::new();
        let json = stdout_json(env.cmd().args(["schema", "RateInputs"]));
        assert!(json["properties"]["prevalence"].is_object());
    }

    #[test]
    fn unknown_type() {
        let env = Env::new();
        env.cmd()
            .args(["schema", "Nothing"])
            .assert()
            .code(10)
            .stderr(predicate::str::contains("schema --list"));
    }

    #[test]
    fn version_json() {
        let env = Env::new();
        let json = stdout_json(env.cmd().arg("version"));
        assert_eq!(json["schema_version"], bl_common::SCHEMA_VERSION);
        assert_eq!(json["bayes_lab_version"], env!("CARGO_PKG_VERSION"));
    }
}
