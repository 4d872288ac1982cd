use std::io::Write;
use std::process::Command;

#[test]
fn run_with_config_and_dry_run_works() {
    let binary_path = env!("CARGO_BIN_EXE_gogreen-tasks");
    let config_path = format!("{}/configs/demo.yaml", env!("CARGO_MANIFEST_DIR"));

    let output = Command::new(binary_path)
        .arg("--log-level")
        .arg("error")
        .arg("run")
        .arg("--config")
        .arg(config_path)
        .arg("--dry-run")
        .output()
        .expect("Failed to start gogreen-tasks binary");

    assert!(
        output.status.success(),
        "Process exited with non-zero status: {}\nStdout: {}\nStderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn run_rejects_invalid_config() {
    let mut file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .expect("create temp config");
    writeln!(
        file,
        "engine:\n  before_window_secs: 0\ntasks:\n  - id: T-1\n    title: Sweep lobby"
    )
    .expect("write temp config");

    let output = Command::new(env!("CARGO_BIN_EXE_gogreen-tasks"))
        .arg("run")
        .arg("--config")
        .arg(file.path())
        .arg("--dry-run")
        .output()
        .expect("Failed to start gogreen-tasks binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("photo windows must be at least one second"),
        "unexpected stderr: {stderr}"
    );
}
