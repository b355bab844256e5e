use std::path::PathBuf;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;

use rox::runner::{EXIT_RUNTIME_ERROR, EXIT_STATIC_ERROR, EXIT_USAGE};

fn rox(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rox"))
        .args(args)
        .output()
        .expect("binary starts")
}

/// Write `source` to a per-test file under the system temp directory.
fn script(name: &str, source: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("rox-{}-{}.lox", std::process::id(), name));
    std::fs::write(&path, source).expect("temp file is writable");
    path
}

#[test]
fn malformed_command_lines_exit_with_usage_status() {
    assert_eq!(rox(&[]).status.code(), Some(EXIT_USAGE));
    assert_eq!(rox(&["frobnicate"]).status.code(), Some(EXIT_USAGE));
    assert_eq!(rox(&["parse"]).status.code(), Some(EXIT_USAGE));
}

#[test]
fn help_is_not_an_error() {
    let output = rox(&["--help"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("run"));
}

#[test]
fn run_reports_program_output_and_errors() {
    let ok = script("ok", "print 1 + 2;");
    let output = rox(&["run", ok.to_str().expect("utf-8 path")]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "3\n");

    let bad_syntax = script("static", "print ;");
    let output = rox(&["run", bad_syntax.to_str().expect("utf-8 path")]);

    assert_eq!(output.status.code(), Some(EXIT_STATIC_ERROR));
    assert_eq!(
        String::from_utf8_lossy(&output.stderr),
        "[line 1] Error at ';': Expect expression.\n"
    );

    let bad_runtime = script("runtime", "print -nil;");
    let output = rox(&["run", bad_runtime.to_str().expect("utf-8 path")]);

    assert_eq!(output.status.code(), Some(EXIT_RUNTIME_ERROR));
    assert_eq!(
        String::from_utf8_lossy(&output.stderr),
        "Operand must be a number.\n[line 1]\n"
    );
}
