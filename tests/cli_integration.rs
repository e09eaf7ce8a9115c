//! CLI integration tests
//!
//! These tests run the appdump binary against stand-in `make` and `cargo`
//! scripts selected through `APPDUMP_MAKE` / `APPDUMP_CARGO`, and check:
//! - Command parsing and validation
//! - The JSON written to `--json-path`
//! - Exit codes

use serde_json::Value;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Helper to get the path to the appdump binary
fn appdump_bin() -> PathBuf {
    let mut path = env::current_exe()
        .expect("Failed to get current executable path")
        .parent()
        .expect("No parent")
        .to_path_buf();

    // If we're in deps/, go up one more level
    if path.ends_with("deps") {
        path = path.parent().expect("No parent").to_path_buf();
    }

    path.join("appdump")
}

fn appdump() -> Command {
    let mut command = Command::new(appdump_bin());
    command
        .env_remove("RUST_NIGHTLY")
        .env_remove("APPDUMP_LOG_LEVEL")
        .env_remove("APPDUMP_REQUEST_TIMEOUT")
        .env_remove("RUST_LOG");
    command
}

#[cfg(unix)]
fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}", body)).expect("Failed to write script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
        .expect("Failed to make script executable");
    path
}

/// Stand-in for make: answers `listvariants` and the parameter dump target.
/// The dump fails unless the temporary `.mk` fragment exists.
#[cfg(unix)]
const FAKE_MAKE: &str = r#"
if [ "$1" = "listvariants" ]; then
    echo "make: Entering directory '/app'"
    echo "VARIANTS COIN BTC BTC_TEST"
    exit 0
fi
[ -f "$4" ] || { echo "missing fragment $4" >&2; exit 2; }
grep -q "Start dumping params" "$4" || exit 2
coin="${6#COIN=}"
echo "Start dumping params"
echo "APP_LOAD_PARAMS=--curve secp256k1 --appFlags 0x000"
echo "APPNAME=App $coin"
echo "APPVERSION=2.1.0"
echo "ICONNAME=icons/app_btc_14px.gif"
echo "TARGET="
echo "appFlags=0x050"
echo "curve=secp256k1"
echo "path=44'/0' 49'/0'"
echo "Stop dumping params"
"#;

#[cfg(unix)]
const FAKE_CARGO: &str = r#"
cat <<'JSON'
{"packages":[{"name":"app-boilerplate-rust","version":"1.7.2","metadata":{"ledger":{
"name":"Rust Boilerplate","curve":["secp256k1"],"flags":"0","path":["44'/1'"],
"nanox":{"icon":"crab_14x14.gif"},"nanosplus":{"icon":"crab_14x14.gif"}}}}]}
JSON
"#;

#[cfg(unix)]
fn makefile_app(dir: &TempDir) -> PathBuf {
    let app = dir.path().join("app");
    fs::create_dir_all(&app).expect("Failed to create app directory");
    fs::write(
        app.join("Makefile"),
        "APPNAME = Bitcoin\ninclude $(BOLOS_SDK)/Makefile.standard_app\n",
    )
    .expect("Failed to write Makefile");
    app
}

fn read_json(path: &Path) -> (String, Value) {
    let raw = fs::read_to_string(path).expect("Failed to read JSON output");
    let value = serde_json::from_str(&raw).expect("Output is not valid JSON");
    (raw, value)
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_cli_help() {
    let output = appdump()
        .arg("--help")
        .output()
        .expect("Failed to execute appdump");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("appdump"));
    assert!(stdout.contains("makefile"));
    assert!(stdout.contains("cargo"));
    assert!(stdout.contains("list-apps"));
}

#[test]
fn test_cli_version() {
    let output = appdump()
        .arg("--version")
        .output()
        .expect("Failed to execute appdump");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("appdump"));
}

#[test]
fn test_missing_required_arguments_exit_code() {
    let output = appdump()
        .args(["cargo", "--app-build-path", "app", "--json-path", "out.json"])
        .output()
        .expect("Failed to execute appdump");

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("--device"));
}

#[test]
fn test_invalid_configuration_fails() {
    let output = appdump()
        .env("APPDUMP_REQUEST_TIMEOUT", "0")
        .args(["list-apps"])
        .output()
        .expect("Failed to execute appdump");

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Request timeout"));
}

#[cfg(unix)]
#[test]
fn test_makefile_mode_writes_descriptor() {
    let dir = TempDir::new().unwrap();
    let app = makefile_app(&dir);
    let make = write_script(dir.path(), "make", FAKE_MAKE);
    let json_path = dir.path().join("out.json");

    let output = appdump()
        .env("APPDUMP_MAKE", &make)
        .arg("makefile")
        .arg("--app_build_path")
        .arg(&app)
        .arg("--json_path")
        .arg(&json_path)
        .output()
        .expect("Failed to execute appdump");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(output.stdout.is_empty());

    let (raw, json) = read_json(&json_path);
    assert!(raw.starts_with("{\n    \""));
    assert_eq!(json["BUILD_DIRECTORY"], app.to_string_lossy().as_ref());
    assert_eq!(json["VARIANT_PARAM"], "COIN");
    assert_eq!(json["IS_ALLOWED_MAKEFILE"], true);

    let btc = &json["VARIANTS"]["BTC"];
    assert_eq!(btc["APPNAME"], "App BTC");
    assert_eq!(btc["APP_LOAD_PARAMS"], "--curve secp256k1 --appFlags 0x000");
    assert_eq!(btc["appFlags"], "0x050");
    assert_eq!(btc["curve"], serde_json::json!(["secp256k1"]));
    assert_eq!(btc["path"], serde_json::json!(["44'/0'", "49'/0'"]));
    assert!(btc.get("TARGET").is_none());
    assert_eq!(json["VARIANTS"]["BTC_TEST"]["APPNAME"], "App BTC_TEST");
}

#[cfg(unix)]
#[test]
fn test_makefile_mode_with_device() {
    let dir = TempDir::new().unwrap();
    let app = makefile_app(&dir);
    let make = write_script(dir.path(), "make", FAKE_MAKE);
    let json_path = dir.path().join("out.json");

    let output = appdump()
        .env("APPDUMP_MAKE", &make)
        .arg("makefile")
        .arg("--app-build-path")
        .arg(&app)
        .arg("--json-path")
        .arg(&json_path)
        .args(["--device", "stax"])
        .output()
        .expect("Failed to execute appdump");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let (_, json) = read_json(&json_path);
    let btc = &json["VARIANTS"]["BTC"];
    assert_eq!(btc["appFlags"], "0x250");
    assert_eq!(btc["TARGET"], "stax");
}

#[cfg(unix)]
#[test]
fn test_makefile_mode_nanosp_remaps_target() {
    let dir = TempDir::new().unwrap();
    let app = makefile_app(&dir);
    let make = write_script(dir.path(), "make", FAKE_MAKE);
    let json_path = dir.path().join("out.json");

    let output = appdump()
        .env("APPDUMP_MAKE", &make)
        .arg("makefile")
        .arg("--app-build-path")
        .arg(&app)
        .arg("--json-path")
        .arg(&json_path)
        .args(["--device", "nanosp"])
        .output()
        .expect("Failed to execute appdump");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let (_, json) = read_json(&json_path);
    for variant in ["BTC", "BTC_TEST"] {
        let record = &json["VARIANTS"][variant];
        assert_eq!(record["TARGET"], "nanos2");
        assert_eq!(record["appFlags"], "0x050");
    }
}

#[cfg(unix)]
#[test]
fn test_makefile_mode_build_tool_failure() {
    let dir = TempDir::new().unwrap();
    let app = makefile_app(&dir);
    let make = write_script(dir.path(), "make", "echo 'No rule to make target' >&2\nexit 2\n");
    let json_path = dir.path().join("out.json");

    let output = appdump()
        .env("APPDUMP_MAKE", &make)
        .arg("makefile")
        .arg("--app-build-path")
        .arg(&app)
        .arg("--json-path")
        .arg(&json_path)
        .output()
        .expect("Failed to execute appdump");

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("No rule to make target"));
    assert!(!json_path.exists());
}

#[cfg(unix)]
#[test]
fn test_makefile_mode_without_variants() {
    let dir = TempDir::new().unwrap();
    let app = makefile_app(&dir);
    let make = write_script(dir.path(), "make", "echo 'Nothing to be done'\n");
    let json_path = dir.path().join("out.json");

    let output = appdump()
        .env("APPDUMP_MAKE", &make)
        .arg("makefile")
        .arg("--app-build-path")
        .arg(&app)
        .arg("--json-path")
        .arg(&json_path)
        .output()
        .expect("Failed to execute appdump");

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Invalid variants retrieved"));
    assert!(!json_path.exists());
}

#[cfg(unix)]
#[test]
fn test_cargo_mode_nanosp() {
    let dir = TempDir::new().unwrap();
    let app = dir.path().join("app-rust");
    fs::create_dir_all(&app).unwrap();
    let cargo = write_script(dir.path(), "cargo", FAKE_CARGO);
    let json_path = dir.path().join("out.json");

    let output = appdump()
        .env("APPDUMP_CARGO", &cargo)
        .args(["cargo", "--device", "nanosp"])
        .arg("--app-build-path")
        .arg(&app)
        .arg("--json-path")
        .arg(&json_path)
        .output()
        .expect("Failed to execute appdump");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let (raw, json) = read_json(&json_path);
    assert!(raw.starts_with("{\n    \""));
    assert_eq!(json["VARIANT_PARAM"], "NONE");
    assert!(json.get("IS_ALLOWED_MAKEFILE").is_none());

    let record = &json["VARIANTS"]["app-boilerplate-rust"];
    assert_eq!(record["APPNAME"], "Rust Boilerplate");
    assert_eq!(record["APPVERSION"], "1.7.2");
    assert_eq!(record["ICONNAME"], "crab_14x14.gif");
    assert_eq!(record["TARGET"], "nanos2");
    assert_eq!(record["appFlags"], "0x000");
    assert_eq!(record["path"], serde_json::json!(["44'/1'"]));
}

#[cfg(unix)]
#[test]
fn test_cargo_mode_missing_device_icon() {
    let dir = TempDir::new().unwrap();
    let app = dir.path().join("app-rust");
    fs::create_dir_all(&app).unwrap();
    let cargo = write_script(dir.path(), "cargo", FAKE_CARGO);
    let json_path = dir.path().join("out.json");

    let output = appdump()
        .env("APPDUMP_CARGO", &cargo)
        .args(["cargo", "--device", "flex"])
        .arg("--app-build-path")
        .arg(&app)
        .arg("--json-path")
        .arg(&json_path)
        .output()
        .expect("Failed to execute appdump");

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("ledger.flex.icon"));
    assert!(!json_path.exists());
}

#[test]
fn test_list_apps_unreachable_api_fails() {
    let output = appdump()
        .env("APPDUMP_GITHUB_API", "http://127.0.0.1:9")
        .env("APPDUMP_REQUEST_TIMEOUT", "5")
        .env_remove("GITHUB_TOKEN")
        .args(["list-apps", "-l", "1"])
        .output()
        .expect("Failed to execute appdump");

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

/// Runs against the real `make` when one is installed.
#[test]
fn test_makefile_mode_with_system_make() {
    let make_available = Command::new("make")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);
    if !make_available {
        eprintln!("make not found, skipping");
        return;
    }

    let dir = TempDir::new().unwrap();
    let app = dir.path().join("app");
    fs::create_dir_all(&app).unwrap();
    fs::write(
        app.join("Makefile"),
        "-include $(BOLOS_SDK)/Makefile.standard_app\n\
         ifeq ($(COIN),BTC_TEST)\n\
         APPNAME = Bitcoin Test\n\
         else\n\
         APPNAME = Bitcoin\n\
         endif\n\
         APPVERSION = 2.1.0\n\
         CURVE_APP_LOAD_PARAMS = secp256k1\n\
         PATH_APP_LOAD_PARAMS = 44/0 49/0 84/0\n\
         listvariants:\n\
         \t@echo VARIANTS COIN BTC BTC_TEST\n",
    )
    .unwrap();
    let json_path = dir.path().join("out.json");

    let output = appdump()
        .env_remove("APPDUMP_MAKE")
        .env_remove("BOLOS_SDK")
        .arg("makefile")
        .arg("--app-build-path")
        .arg(&app)
        .arg("--json-path")
        .arg(&json_path)
        .output()
        .expect("Failed to execute appdump");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let (_, json) = read_json(&json_path);
    assert_eq!(json["IS_ALLOWED_MAKEFILE"], true);

    let btc = &json["VARIANTS"]["BTC"];
    assert_eq!(btc["APPNAME"], "Bitcoin");
    assert_eq!(btc["APPVERSION"], "2.1.0");
    assert_eq!(btc["curve"], serde_json::json!(["secp256k1"]));
    assert_eq!(btc["path"], serde_json::json!(["44/0", "49/0", "84/0"]));
    assert_eq!(btc["appFlags"], "0x000");
    assert!(btc.get("ICONNAME").is_none());
    assert_eq!(json["VARIANTS"]["BTC_TEST"]["APPNAME"], "Bitcoin Test");
}
