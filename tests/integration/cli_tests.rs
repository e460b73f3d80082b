//! Tests that drive the command-line binary

use std::process::{Command, Output};

use pretty_assertions::assert_eq;

use crate::common::ScriptDir;

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rust-sqlrewriter"))
        .args(args)
        .output()
        .expect("Failed to run rust-sqlrewriter")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_idempotent_single_file_to_stdout() {
    let dir = ScriptDir::new();
    let script = dir.write("Views/V.sql", "CREATE VIEW dbo.V AS SELECT 1\n");

    let output = run(&[
        "idempotent",
        script.to_str().unwrap(),
        "--line-ending",
        "lf",
    ]);

    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "IF OBJECT_ID(N'dbo.V', N'V') IS NULL\n  EXEC('CREATE VIEW dbo.V AS SELECT 1 AS placeholder')\nGO\nALTER VIEW dbo.V AS SELECT 1\n"
    );
}

#[test]
fn test_directory_rewrite_keeps_layout() {
    let dir = ScriptDir::new();
    dir.write("src/Procs/GetOrders.sql", "CREATE PROC GetOrders AS SELECT 1");
    dir.write("src/Tables/Orders.sql", "CREATE TABLE Orders (Id INT)");
    dir.write("src/bin/Ignored.sql", "CREATE PROC Ignored AS SELECT 1");
    let out = dir.path("out");

    let output = run(&[
        "rename-procedures",
        dir.path("src").to_str().unwrap(),
        "--out-dir",
        out.to_str().unwrap(),
        "--prefix",
        "v2_",
    ]);

    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        dir.read("out/Procs/GetOrders.sql"),
        "CREATE PROC dbo.v2_GetOrders AS SELECT 1"
    );
    assert_eq!(dir.read("out/Tables/Orders.sql"), "CREATE TABLE Orders (Id INT)");
    assert!(!out.join("bin").exists());
}

#[test]
fn test_multiple_scripts_require_out_dir() {
    let dir = ScriptDir::new();
    dir.write("a.sql", "SELECT 1");
    dir.write("b.sql", "SELECT 2");

    let output = run(&["rename-identifiers", dir.root.to_str().unwrap(), "--prefix", "x"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("--out-dir"), "{}", stderr(&output));
}

#[test]
fn test_expand_with_env_file_and_overrides() {
    let dir = ScriptDir::new();
    let script = dir.write(
        "seed.sql",
        "/*{{#if SEED}}EXEC dbo.Seed @db = '{{DB}}'{{/if}}*/",
    );
    let env = dir.write("env.json", r#"{"SEED": true, "DB": "dev"}"#);

    let output = run(&[
        "expand",
        script.to_str().unwrap(),
        "--env",
        env.to_str().unwrap(),
        "--set",
        "DB=qa",
    ]);

    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "EXEC dbo.Seed @db = 'qa'");
}

#[test]
fn test_expand_fails_on_unknown_variable() {
    let dir = ScriptDir::new();
    let script = dir.write("a.sql", "/*{{#if Missing}}x{{/if}}*/");

    let output = run(&["expand", script.to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Missing"), "{}", stderr(&output));
}

#[test]
fn test_check_reports_parse_errors() {
    let dir = ScriptDir::new();
    dir.write("good.sql", "SELECT 1");
    dir.write("bad.sql", "SELECT (1\nGO\n");

    let output = run(&["check", dir.root.to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(stdout(&output).is_empty());
    let errors = stderr(&output);
    assert!(errors.contains("bad.sql:"), "{errors}");
    assert!(!errors.contains("good.sql"), "{errors}");
}

#[test]
fn test_check_compat_level() {
    let dir = ScriptDir::new();
    let script = dir.write("iif.sql", "SELECT IIF(1 = 1, 'a', 'b')");
    let path = script.to_str().unwrap();

    assert!(run(&["check", path]).status.success());
    let old = run(&["check", path, "--compat", "Sql100"]);
    assert!(!old.status.success());
    assert!(stderr(&old).contains("IIF"), "{}", stderr(&old));
}
