use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

fn rill() -> Command {
    Command::new(env!("CARGO_BIN_EXE_rill"))
}

fn write_script(dir: &tempfile::TempDir, name: &str, src: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, src).unwrap();
    path
}

fn stdout_of(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr_of(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn run_prints_numbers_with_two_decimals_and_no_newline() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(&dir, "print.rill", "x = 3; print x;");

    let out = rill().arg("run").arg(&script).output().unwrap();
    assert!(out.status.success(), "stderr: {}", stderr_of(&out));
    assert_eq!(stdout_of(&out), "3.00");
}

#[test]
fn run_prints_strings_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(&dir, "hello.rill", r#"print "hello";"#);

    let out = rill().arg("run").arg(&script).output().unwrap();
    assert!(out.status.success(), "stderr: {}", stderr_of(&out));
    assert_eq!(stdout_of(&out), "hello");
}

#[test]
fn consecutive_prints_are_not_separated() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(&dir, "two.rill", "print 1; print 2;");

    let out = rill().arg("run").arg(&script).output().unwrap();
    assert!(out.status.success());
    assert_eq!(stdout_of(&out), "1.002.00");
}

#[test]
fn runtime_errors_go_to_stderr_with_a_nonzero_exit() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(&dir, "bad.rill", "y + 1;");

    let out = rill().arg("run").arg(&script).output().unwrap();
    assert!(!out.status.success());
    let stderr = stderr_of(&out);
    assert!(stderr.contains("ERROR:"), "stderr: {stderr}");
    assert!(stderr.contains("unknown variable 'y'"), "stderr: {stderr}");
}

#[test]
fn run_dump_tokens_lists_the_token_stream() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(&dir, "toks.rill", "1 + 2;");

    let out = rill()
        .arg("run")
        .arg(&script)
        .arg("--dump-tokens")
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = stdout_of(&out);
    assert!(stdout.contains("Number"), "stdout: {stdout}");
    assert!(stdout.contains("Semicolon"), "stdout: {stdout}");
}

#[test]
fn parse_emits_valid_json() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(&dir, "ast.rill", "1 + 2 * 3;");

    let out = rill()
        .arg("parse")
        .arg(&script)
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", stderr_of(&out));
    let parsed: serde_json::Value = serde_json::from_str(&stdout_of(&out)).unwrap();
    assert!(parsed.is_object() || parsed.is_array());
}

#[test]
fn missing_file_is_an_error() {
    let out = rill().arg("run").arg("/no/such/file.rill").output().unwrap();
    assert!(!out.status.success());
    assert!(stderr_of(&out).contains("ERROR:"));
}

fn run_repl(input: &str) -> Output {
    let mut child = rill()
        .arg("repl")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .as_mut()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn repl_evaluates_each_batch_and_prints_its_value() {
    let out = run_repl("1 + 2;\n");
    assert!(out.status.success(), "stderr: {}", stderr_of(&out));
    assert!(stdout_of(&out).contains("3.00"));
}

#[test]
fn repl_batches_input_until_braces_balance() {
    let out = run_repl("x = 0;\nwhile x < 3 {\nx = x + 1;\n}\nx;\n");
    assert!(out.status.success(), "stderr: {}", stderr_of(&out));
    assert!(stdout_of(&out).contains("3.00"));
}

#[test]
fn repl_keeps_functions_across_batches() {
    let out = run_repl("let add(a, b) { return a + b; }\nadd(1, 2);\n");
    assert!(out.status.success(), "stderr: {}", stderr_of(&out));
    assert!(stdout_of(&out).contains("3.00"));
}

#[test]
fn repl_recovers_from_lex_errors() {
    let out = run_repl("1 ` 2;\n3 + 4;\n");
    assert!(out.status.success(), "stderr: {}", stderr_of(&out));
    assert!(stderr_of(&out).contains("ERROR:"));
    assert!(stdout_of(&out).contains("7.00"));
}

#[test]
fn repl_parse_errors_are_fatal() {
    let out = run_repl("1 + ;\n");
    assert!(!out.status.success());
    let stderr = stderr_of(&out);
    assert!(stderr.contains("ERROR:"), "stderr: {stderr}");
    assert!(stderr.contains("expected operand"), "stderr: {stderr}");
}
