use std::path::Path;
use std::process::{Command, Output};

fn run_demo(name: &str) -> Output {
    let program = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join(name);
    Command::new(env!("CARGO_BIN_EXE_ls8"))
        .arg("run")
        .arg(program)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn halt_exits_zero() {
    let output = run_demo("mult.ls8");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "72\n");
    assert!(output.stderr.is_empty());
}

#[test]
fn invalid_opcode_exits_non_zero() {
    let output = run_demo("invalid.ls8");
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.lines().count(), 1);
    assert!(stderr.contains("invalid opcode"));
    assert!(stderr.contains("0x00"));
}

#[test]
fn divide_by_zero_exits_non_zero() {
    let output = run_demo("divzero.ls8");
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.lines().count(), 1);
    assert!(stderr.contains("division by zero"));
    assert!(stderr.contains("0x06"));
}

#[test]
fn missing_file_exits_non_zero() {
    let output = run_demo("no-such-program.ls8");
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read"));
}
