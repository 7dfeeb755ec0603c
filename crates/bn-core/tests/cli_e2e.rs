//! End-to-end tests for the bn-core binary.
//!
//! These run the real binary against presets and temporary network files
//! and check payloads and exit codes.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::io::Write;
use tempfile::{Builder, NamedTempFile, TempDir};

/// Get a Command for the bn-core binary with a clean environment.
fn bn_core() -> Command {
    let mut cmd = Command::cargo_bin("bn-core").expect("bn-core binary should exist");
    cmd.env_remove("BAYESNET_NETWORK")
        .env_remove("BAYESNET_CONFIG_DIR")
        .env_remove("BN_LOG")
        .env_remove("RUST_LOG")
        .env_remove("BN_LOG_FORMAT");
    cmd
}

fn json_stdout(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("run bn-core");
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

fn network_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

const RAIN_JSON: &str = r#"{
  "schema_version": "1.0.0",
  "name": "rain-file",
  "nodes": [
    { "name": "Chuva", "domain": ["sim", "não"], "table": { "sim": 0.2, "não": 0.8 } },
    {
      "name": "GramaMolhada",
      "domain": ["sim", "não"],
      "parents": ["Chuva"],
      "table": [
        { "given": ["sim"], "probabilities": { "sim": 0.9, "não": 0.1 } },
        { "given": ["não"], "probabilities": { "sim": 0.1, "não": 0.9 } }
      ]
    }
  ]
}"#;

// ============================================================================
// Inference
// ============================================================================

mod infer {
    use super::*;

    #[test]
    fn posterior_with_evidence() {
        let json = json_stdout(bn_core().args([
            "--preset",
            "rain",
            "infer",
            "--query",
            "Chuva",
            "--evidence",
            "GramaMolhada=sim",
        ]));
        assert_eq!(json["command"], "infer");
        assert_eq!(json["network"]["name"], "rain");
        let p = json["posterior"]["outcomes"][0]["probability"]
            .as_f64()
            .unwrap();
        assert!((p - 0.18 / 0.26).abs() < 1e-9);
        assert_eq!(json["posterior"]["hidden_combinations"], 1);
    }

    #[test]
    fn summary_format() {
        bn_core()
            .args(["-p", "rain", "-f", "summary", "infer", "-Q", "GramaMolhada"])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "P(GramaMolhada): sim=0.2600, não=0.7400",
            ));
    }

    #[test]
    fn markdown_format() {
        bn_core()
            .args(["-p", "medical", "-f", "md", "infer", "-Q", "Doenca"])
            .args(["-e", "Teste=positivo"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with("# P(Doenca | Teste=positivo)"));
    }

    #[test]
    fn exitcode_format_is_silent() {
        bn_core()
            .args(["-p", "rain", "-f", "exitcode", "infer", "-Q", "Chuva"])
            .assert()
            .code(0)
            .stdout(predicate::str::is_empty());
    }

    #[test]
    fn from_json_file() {
        let file = network_file(".json", RAIN_JSON);
        let json = json_stdout(
            bn_core()
                .arg("--network")
                .arg(file.path())
                .args(["infer", "--query", "GramaMolhada"]),
        );
        assert_eq!(json["network"]["name"], "rain-file");
        let p = json["posterior"]["outcomes"][0]["probability"]
            .as_f64()
            .unwrap();
        assert!((p - 0.26).abs() < 1e-9);
    }

    #[test]
    fn from_environment_variable() {
        let file = network_file(".json", RAIN_JSON);
        bn_core()
            .env("BAYESNET_NETWORK", file.path())
            .args(["-f", "summary", "infer", "-Q", "Chuva"])
            .assert()
            .success()
            .stdout(predicate::str::contains("P(Chuva): sim=0.2000"));
    }

    #[test]
    fn from_config_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("network.json"), RAIN_JSON).unwrap();
        bn_core()
            .env("BAYESNET_CONFIG_DIR", dir.path())
            .args(["-f", "summary", "check"])
            .assert()
            .success()
            .stdout(predicate::str::contains("ok: rain-file"));
    }

    #[test]
    fn marginals_of_unobserved_nodes() {
        let json = json_stdout(bn_core().args([
            "-p",
            "medical",
            "marginals",
            "-e",
            "Teste=positivo,Sintoma1=sim",
        ]));
        let marginals = json["marginals"].as_array().unwrap();
        let names: Vec<&str> = marginals
            .iter()
            .map(|m| m["query"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Doenca", "Sintoma2"]);
    }

    #[test]
    fn joint_probability() {
        let json = json_stdout(bn_core().args([
            "-p",
            "rain",
            "joint",
            "--assign",
            "Chuva=sim,GramaMolhada=não",
        ]));
        let p = json["probability"].as_f64().unwrap();
        assert!((p - 0.02).abs() < 1e-12);
        assert!(json["log_probability"].as_f64().unwrap() < 0.0);
    }
}

// ============================================================================
// Errors and exit codes
// ============================================================================

mod errors {
    use super::*;

    #[test]
    fn no_network_is_args_error() {
        let home = TempDir::new().unwrap();
        bn_core()
            .env("HOME", home.path())
            .env("XDG_CONFIG_HOME", home.path())
            .args(["infer", "-Q", "Chuva"])
            .assert()
            .code(10)
            .stdout(predicate::str::contains("\"code\": 13"));
    }

    #[test]
    fn unknown_preset_is_args_error() {
        bn_core()
            .args(["-p", "fog", "-f", "md", "check"])
            .assert()
            .code(10)
            .stderr(predicate::str::contains("Unknown Preset"));
    }

    #[test]
    fn bad_evidence_syntax_is_args_error() {
        bn_core()
            .args(["-p", "rain", "infer", "-Q", "Chuva", "-e", "GramaMolhada"])
            .assert()
            .code(10);
    }

    #[test]
    fn unknown_query_is_query_error() {
        bn_core()
            .args(["-p", "rain", "infer", "-Q", "Nevoa"])
            .assert()
            .code(12)
            .stdout(predicate::str::contains("Nevoa"));
    }

    #[test]
    fn query_in_evidence_is_query_error() {
        bn_core()
            .args(["-p", "rain", "infer", "-Q", "Chuva", "-e", "Chuva=sim"])
            .assert()
            .code(12);
    }

    #[test]
    fn missing_assignment_is_query_error() {
        bn_core()
            .args(["-p", "rain", "joint", "-a", "Chuva=sim"])
            .assert()
            .code(12);
    }

    #[test]
    fn zero_evidence_exit_code() {
        let impossible = RAIN_JSON
            .replace(
                r#"{ "sim": 0.9, "não": 0.1 }"#,
                r#"{ "sim": 0.0, "não": 1.0 }"#,
            )
            .replace(
                r#"{ "sim": 0.1, "não": 0.9 }"#,
                r#"{ "sim": 0.0, "não": 1.0 }"#,
            );
        let file = network_file(".json", &impossible);
        bn_core()
            .arg("--network")
            .arg(file.path())
            .args(["infer", "-Q", "Chuva", "-e", "GramaMolhada=sim"])
            .assert()
            .code(13)
            .stdout(predicate::str::contains("\"code\": 33"));
    }

    #[test]
    fn missing_file_is_network_error() {
        bn_core()
            .args(["--network", "/nonexistent/bn/net.json", "check"])
            .assert()
            .code(11);
    }

    #[test]
    fn unnormalized_row_is_network_error() {
        let bad = RAIN_JSON.replace(r#""sim": 0.2, "não": 0.8"#, r#""sim": 0.3, "não": 0.8"#);
        let file = network_file(".json", &bad);
        bn_core()
            .arg("--network")
            .arg(file.path())
            .args(["-f", "summary", "check"])
            .assert()
            .code(11)
            .stderr(predicate::str::contains("Invalid Network File"));
    }

    #[test]
    fn missing_row_is_network_error() {
        let gap = RAIN_JSON.replace(
            r#",
        { "given": ["não"], "probabilities": { "sim": 0.1, "não": 0.9 } }"#,
            "",
        );
        assert_ne!(gap, RAIN_JSON);
        let file = network_file(".json", &gap);
        bn_core()
            .arg("--network")
            .arg(file.path())
            .arg("check")
            .assert()
            .code(11)
            .stdout(predicate::str::contains("\"code\": 21"));
    }

    #[test]
    fn preset_conflicts_with_network() {
        bn_core()
            .args(["--preset", "rain", "--network", "x.json", "check"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("cannot be used with"));
    }
}

// ============================================================================
// Inspection commands
// ============================================================================

mod inspect {
    use super::*;

    #[test]
    fn presets_listed() {
        bn_core()
            .args(["-f", "summary", "presets"])
            .assert()
            .success()
            .stdout(predicate::str::contains("rain medical weather"));
    }

    #[test]
    fn describe_weather() {
        let json = json_stdout(bn_core().args(["-p", "weather", "describe"]));
        assert_eq!(json["nodes"].as_array().unwrap().len(), 4);
        assert_eq!(json["edges"].as_array().unwrap().len(), 5);
        assert_eq!(json["nodes"][3]["name"], "JogarTenis");
        assert_eq!(json["nodes"][3]["table_rows"], 12);
    }

    #[test]
    fn check_yaml_file() {
        let yaml = "schema_version: \"1.0.0\"\nname: coin\nnodes:\n  - name: Moeda\n    domain: [cara, coroa]\n    table: { cara: 0.5, coroa: 0.5 }\n";
        let file = network_file(".yaml", yaml);
        bn_core()
            .arg("--network")
            .arg(file.path())
            .args(["-f", "summary", "check"])
            .assert()
            .success()
            .stdout(predicate::str::contains("ok: coin (1 nodes, 0 edges, 1 table rows)"));
    }

    #[test]
    fn network_schema() {
        let json = json_stdout(bn_core().arg("schema"));
        assert!(json["properties"]["nodes"].is_object());
    }

    #[test]
    fn posterior_schema() {
        let json = json_stdout(bn_core().args(["schema", "posterior"]));
        assert!(json["properties"]["outcomes"].is_object());
    }

    #[test]
    fn version_json() {
        let json = json_stdout(bn_core().arg("version"));
        assert_eq!(json["schema_version"], "1.0.0");
        assert!(json["bn_core_version"].is_string());
    }

    #[test]
    fn jsonl_logs_go_to_stderr() {
        let output = bn_core()
            .args(["-p", "rain", "-vv", "--log-format", "jsonl", "infer", "-Q", "Chuva"])
            .output()
            .unwrap();
        assert!(output.status.success());
        let stdout: Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(stdout["command"], "infer");
        let stderr = String::from_utf8_lossy(&output.stderr);
        let events: Vec<Value> = stderr
            .lines()
            .filter_map(|l| serde_json::from_str(l).ok())
            .collect();
        assert!(events.iter().any(|e| e["event"] == "infer.started"));

        let loaded = events
            .iter()
            .find(|e| e["event"] == "network.loaded")
            .expect("network.loaded event");
        assert!(loaded["run_id"].as_str().unwrap().starts_with("run-"));
        assert_eq!(loaded["stage"], "load");
        assert_eq!(loaded["network"], "rain");
        assert!(loaded["fields"].get("run_id").is_none());

        let count = |name: &str| events.iter().filter(|e| e["event"] == name).count();
        assert_eq!(count("infer.finished"), 1);
        assert_eq!(count("query.answered"), 1);
    }

    #[test]
    fn rejected_file_logs_validation_code() {
        let bad = RAIN_JSON.replace(r#""sim": 0.2, "não": 0.8"#, r#""sim": 0.3, "não": 0.8"#);
        let file = network_file(".json", &bad);
        let output = bn_core()
            .arg("--network")
            .arg(file.path())
            .args(["--log-format", "jsonl", "check"])
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(11));
        let stderr = String::from_utf8_lossy(&output.stderr);
        let invalid: Value = stderr
            .lines()
            .filter_map(|l| serde_json::from_str::<Value>(l).ok())
            .find(|e| e["event"] == "network.invalid")
            .expect("network.invalid event");
        assert_eq!(invalid["level"], "warn");
        assert_eq!(invalid["stage"], "validate");
        assert!(invalid["fields"]["validation_code"].is_u64());
    }
}
