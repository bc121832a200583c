use std::process::Command;

fn woostream() -> Command {
    Command::new(env!("CARGO_BIN_EXE_woostream"))
}

#[test]
fn cli_mode_with_flags_and_dry_run_works() {
    let output = woostream()
        .args([
            "--network",
            "testnet",
            "--application-id",
            "app-id",
            "--api-public-key",
            "key",
            "--api-secret-key",
            "secret",
            "--topic",
            "executionreport",
            "--log-level",
            "error",
            "--dry-run",
        ])
        .output()
        .expect("Failed to start woostream binary");

    assert!(
        output.status.success(),
        "Process exited with non-zero status: {}\nStdout: {}\nStderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn cli_mode_with_config_and_dry_run_works() {
    let config_path = format!(
        "{}/config/woostream.example.yaml",
        env!("CARGO_MANIFEST_DIR")
    );

    let output = woostream()
        .arg("--config")
        .arg(config_path)
        .arg("--dry-run")
        .output()
        .expect("Failed to start woostream binary");

    assert!(
        output.status.success(),
        "Process exited with non-zero status: {}\nStderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn cli_mode_without_credentials_fails() {
    let output = woostream()
        .args(["--application-id", "app-id", "--dry-run"])
        .output()
        .expect("Failed to start woostream binary");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing api public key"));
}

#[test]
fn cli_mode_telegram_flags_require_each_other() {
    let output = woostream()
        .args([
            "--application-id",
            "app-id",
            "--api-public-key",
            "key",
            "--api-secret-key",
            "secret",
            "--telegram-token",
            "123:abc",
            "--dry-run",
        ])
        .output()
        .expect("Failed to start woostream binary");

    assert!(!output.status.success());
}
