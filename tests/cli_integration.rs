//! Tests that run the `ragsift` binary

use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    let home = tempfile::tempdir().unwrap();
    Command::new(env!("CARGO_BIN_EXE_ragsift"))
        .args(args)
        .env("HOME", home.path())
        .env_remove("RAGSIFT_LOG")
        .output()
        .unwrap()
}

#[test]
fn test_invalid_request_rejected_before_corpus_is_read() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist.jsonl");
    let output = run(&[
        "--corpus",
        missing.to_str().unwrap(),
        "--top-k",
        "5",
        "--final-k",
        "10",
        "cat",
    ]);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("final_k"), "stderr: {}", stderr);
    assert!(!stderr.contains("corpus"), "corpus touched: {}", stderr);
}

#[test]
fn test_missing_query_is_usage_error() {
    let output = run(&[]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Query required"));
}

#[test]
fn test_config_subcommand_prints_settings() {
    let output = run(&["config"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[retrieval]"));
    assert!(stdout.contains("top_k = 10"));
}
