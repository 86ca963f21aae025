//! Smoke tests for the `rv` binary.

use assert_cmd::Command;
use tempfile::TempDir;

fn rv(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("rv").unwrap();
    cmd.env_remove("RUST_LOG")
        .env("RENTVAULT_DATA_DIR", dir.path())
        .env("RV_EMAIL", "cli@example.com")
        .env("RV_USER_ID", "cli-user")
        .env_remove("RV_PASSWORD");
    cmd
}

fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.arg("--json").output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn version_reports_package_version() {
    let dir = TempDir::new().unwrap();
    let value = stdout_json(rv(&dir).arg("version"));
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn init_then_add_and_list_listing() {
    let dir = TempDir::new().unwrap();

    let init = stdout_json(rv(&dir).arg("init"));
    assert_eq!(init["created"], true);
    assert!(dir.path().join("user_data_cli_example_com.db").exists());

    let added = stdout_json(rv(&dir).args([
        "listing",
        "add",
        "12 Elm St, Springfield, IL, 62701",
        "https://example.com/12",
        "1450",
        "--lease-type",
        "yearly",
        "--utility",
        "water",
    ]));
    let id = added["id"].as_i64().unwrap();

    let listed = stdout_json(rv(&dir).args(["listing", "list"]));
    assert_eq!(listed["count"], 1);
    assert_eq!(listed["listings"][0]["id"], id);
    assert_eq!(listed["listings"][0]["lease_type"], "annual");

    let toggled = stdout_json(rv(&dir).args(["listing", "favorite", &id.to_string()]));
    assert_eq!(toggled["favorite"], true);
}

#[test]
fn wrong_password_exits_with_initialization_code() {
    let dir = TempDir::new().unwrap();
    rv(&dir).arg("init").assert().success();

    let output = rv(&dir)
        .args(["-q", "--password", "not-the-derived-one", "--json", "task", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));

    let error: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(error["error"]["code"], "INITIALIZATION_ERROR");
}

#[test]
fn missing_listing_is_not_found() {
    let dir = TempDir::new().unwrap();
    rv(&dir).arg("init").assert().success();

    let output = rv(&dir).args(["--json", "listing", "show", "77"]).output().unwrap();
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn info_and_destroy() {
    let dir = TempDir::new().unwrap();

    let info = stdout_json(rv(&dir).arg("info"));
    assert_eq!(info["exists"], false);

    rv(&dir).arg("init").assert().success();
    let info = stdout_json(rv(&dir).arg("info"));
    assert_eq!(info["exists"], true);

    rv(&dir).arg("destroy").assert().failure();
    let destroyed = stdout_json(rv(&dir).args(["destroy", "--yes"]));
    assert_eq!(destroyed["deleted"], true);
    assert!(!dir.path().join("user_data_cli_example_com.db").exists());
}
