use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn luamin_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("luamin"))
}

// ============================================================================
// PROJECT INITIALIZATION TESTS
// ============================================================================

#[test]
fn test_init_creates_config_file() {
    let temp_dir = TempDir::new().unwrap();

    luamin_cmd()
        .current_dir(&temp_dir)
        .arg("--init")
        .assert()
        .success()
        .stdout(predicate::str::contains("luamin.yaml"));

    let config = fs::read_to_string(temp_dir.path().join("luamin.yaml")).unwrap();
    assert!(config.contains("minifyOptions"));
    assert!(config.contains("moduleMode"));
    assert!(config.contains("pragmaMarker"));
}

// ============================================================================
// SINGLE FILE TESTS
// ============================================================================

#[test]
fn test_minify_writes_output_and_map() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("app.lua"),
        "--#keep: notice\n-- remove me\nlocal value = 1 + 2 * 3\nreturn value\n",
    )
    .unwrap();

    luamin_cmd()
        .current_dir(&temp_dir)
        .arg("app.lua")
        .assert()
        .success();

    let output = fs::read_to_string(temp_dir.path().join("app.min.lua")).unwrap();
    assert_eq!(
        output,
        "--#keep: notice\nlocal a=1+2*3 return a\n--# sourceMappingURL=app.lua.map\n"
    );

    let map = fs::read_to_string(temp_dir.path().join("app.lua.map")).unwrap();
    let map: serde_json::Value = serde_json::from_str(&map).unwrap();
    assert_eq!(map["version"], 3);
    assert_eq!(map["file"], "app.min.lua");
    assert_eq!(map["sources"][0], "app.lua");
    assert_eq!(map["names"][0], "value");
}

#[test]
fn test_no_source_map_flag() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("app.lua"), "local x = 1 return x").unwrap();

    luamin_cmd()
        .current_dir(&temp_dir)
        .arg("--no-source-map")
        .arg("app.lua")
        .assert()
        .success();

    let output = fs::read_to_string(temp_dir.path().join("app.min.lua")).unwrap();
    assert_eq!(output, "local a=1 return a\n");
    assert!(!temp_dir.path().join("app.lua.map").exists());
}

#[test]
fn test_inline_source_map() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("app.lua"), "return 1").unwrap();

    luamin_cmd()
        .current_dir(&temp_dir)
        .arg("--inline-source-map")
        .arg("app.lua")
        .assert()
        .success();

    let output = fs::read_to_string(temp_dir.path().join("app.min.lua")).unwrap();
    assert!(output.starts_with("return 1\n--# sourceMappingURL=data:application/json"));
    assert!(!temp_dir.path().join("app.lua.map").exists());
}

#[test]
fn test_sources_content_flag() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("app.lua"), "return 1").unwrap();

    luamin_cmd()
        .current_dir(&temp_dir)
        .arg("--sources-content")
        .arg("app.lua")
        .assert()
        .success();

    let map = fs::read_to_string(temp_dir.path().join("app.lua.map")).unwrap();
    let map: serde_json::Value = serde_json::from_str(&map).unwrap();
    assert_eq!(map["sourcesContent"][0], "return 1");
}

#[test]
fn test_module_mode_entry_outside_module_root() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("app")).unwrap();
    fs::create_dir_all(temp_dir.path().join("src")).unwrap();
    fs::write(
        temp_dir.path().join("app").join("main.lua"),
        "return require('lib')",
    )
    .unwrap();
    fs::write(temp_dir.path().join("src").join("lib.lua"), "return 7").unwrap();

    luamin_cmd()
        .current_dir(&temp_dir)
        .arg("--module-mode")
        .arg("--module-root")
        .arg("src")
        .arg("app/main.lua")
        .assert()
        .success();

    let output = fs::read_to_string(temp_dir.path().join("app").join("main.min.lua")).unwrap();
    assert!(output.contains("==\"lib\"then"));
}

#[test]
fn test_out_dir_redirects_outputs() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("app.lua"), "return 1").unwrap();

    luamin_cmd()
        .current_dir(&temp_dir)
        .arg("--out-dir")
        .arg("dist")
        .arg("app.lua")
        .assert()
        .success();

    assert!(temp_dir.path().join("dist").join("app.min.lua").exists());
    assert!(temp_dir.path().join("dist").join("app.lua.map").exists());
    assert!(!temp_dir.path().join("app.min.lua").exists());
}

// ============================================================================
// ERROR HANDLING TESTS
// ============================================================================

#[test]
fn test_missing_input_is_reported_and_others_processed() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("good.lua"), "return 1").unwrap();

    luamin_cmd()
        .current_dir(&temp_dir)
        .arg("missing.lua")
        .arg("good.lua")
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.lua"));

    assert!(temp_dir.path().join("good.min.lua").exists());
}

#[test]
fn test_parse_error_fails() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("bad.lua"), "local = 1").unwrap();

    luamin_cmd()
        .current_dir(&temp_dir)
        .arg("bad.lua")
        .assert()
        .failure()
        .stderr(predicate::str::contains("bad.lua"));

    assert!(!temp_dir.path().join("bad.min.lua").exists());
}

#[test]
fn test_no_inputs_fails() {
    let temp_dir = TempDir::new().unwrap();

    luamin_cmd()
        .current_dir(&temp_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No input files"));
}

// ============================================================================
// BUNDLING TESTS
// ============================================================================

#[test]
fn test_module_mode_bundles_requires() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("lib")).unwrap();
    fs::write(
        temp_dir.path().join("main.lua"),
        "local util = require('lib.util')\nlocal again = require('lib.util')\nreturn util\n",
    )
    .unwrap();
    fs::write(
        temp_dir.path().join("lib").join("util.lua"),
        "local M = {}\nreturn M\n",
    )
    .unwrap();

    luamin_cmd()
        .current_dir(&temp_dir)
        .arg("--module-mode")
        .arg("main.lua")
        .assert()
        .success();

    let output = fs::read_to_string(temp_dir.path().join("main.min.lua")).unwrap();
    assert_eq!(output.matches("==\"lib.util\"then").count(), 1);
    assert!(output.contains("local function require("));
}

#[test]
fn test_module_mode_from_config_file() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("luamin.yaml"),
        "minifyOptions:\n  moduleMode: true\n  sourceMap: false\n",
    )
    .unwrap();
    fs::write(temp_dir.path().join("main.lua"), "return require('dep')").unwrap();
    fs::write(temp_dir.path().join("dep.lua"), "return 42").unwrap();

    luamin_cmd()
        .current_dir(&temp_dir)
        .arg("main.lua")
        .assert()
        .success();

    let output = fs::read_to_string(temp_dir.path().join("main.min.lua")).unwrap();
    assert!(output.contains("==\"dep\"then"));
    assert!(!temp_dir.path().join("main.lua.map").exists());
}

#[test]
fn test_missing_dependency_fails() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("main.lua"), "return require('nowhere')").unwrap();

    luamin_cmd()
        .current_dir(&temp_dir)
        .arg("--module-mode")
        .arg("main.lua")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nowhere"));
}

// ============================================================================
// DIRECTORY TESTS
// ============================================================================

#[test]
fn test_directory_input_is_walked() {
    let temp_dir = TempDir::new().unwrap();
    let src = temp_dir.path().join("src");
    fs::create_dir_all(src.join("nested")).unwrap();
    fs::write(src.join("a.lua"), "return 1").unwrap();
    fs::write(src.join("nested").join("b.lua"), "return 2").unwrap();
    fs::write(src.join("old.min.lua"), "return 3").unwrap();

    luamin_cmd()
        .current_dir(&temp_dir)
        .arg("--no-source-map")
        .arg("src")
        .assert()
        .success();

    assert!(src.join("a.min.lua").exists());
    assert!(src.join("nested").join("b.min.lua").exists());
    assert!(!src.join("old.min.min.lua").exists());
}
