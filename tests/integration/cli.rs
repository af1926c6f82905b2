//! The `libresolve` binary end to end.

use anyhow::Result;
use assert_cmd::Command;
use libresolve_cli::test_utils::LibraryFixture;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

/// The binary, isolated from the user's config and log settings.
fn libresolve(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("libresolve").expect("binary is built");
    cmd.env("LIBRESOLVE_CONFIG", home.join("config.toml")).env_remove("RUST_LOG");
    cmd
}

/// `Wire <- Servo <- App`, installed under `<temp>/libraries`.
fn installed_chain(temp: &TempDir) -> Result<std::path::PathBuf> {
    let libraries = temp.path().join("libraries");
    LibraryFixture::new("Wire").header("Wire.h").write(&libraries)?;
    LibraryFixture::new("Servo")
        .version("1.2.0")
        .header("Servo.h")
        .source("Servo.cpp", &["Wire.h"])
        .write(&libraries)?;
    LibraryFixture::new("App").source("App.ino", &["Servo.h"]).write(&libraries)?;
    Ok(libraries)
}

#[test]
fn test_info_text() -> Result<()> {
    let temp = TempDir::new()?;
    let root = LibraryFixture::new("Servo").property("category", "Device Control").write(temp.path())?;

    libresolve(temp.path())
        .arg("info")
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("Library: Servo"))
        .stdout(predicate::str::contains("(global_name=org.test.servo)"))
        .stdout(predicate::str::contains("(category=Device Control)"))
        .stdout(predicate::str::contains("(layout=Flat)"));
    Ok(())
}

#[test]
fn test_info_json() -> Result<()> {
    let temp = TempDir::new()?;
    let root = LibraryFixture::new("Servo")
        .without("global_name")
        .property("url", "https://github.com/arduino-libraries/Servo")
        .header("src/Servo.h")
        .write(temp.path())?;

    let output = libresolve(temp.path()).args(["info", "--format", "json"]).arg(&root).output()?;
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(json["name"], "Servo");
    assert_eq!(json["global_name"], "io.github.arduino-libraries.Servo");
    assert_eq!(json["global_name_guessed"], true);
    assert_eq!(json["layout"], "recursive");
    assert_eq!(json["license"], "Unspecified");
    assert_eq!(json["architectures"], serde_json::json!(["*"]));
    Ok(())
}

#[test]
fn test_info_missing_property() -> Result<()> {
    let temp = TempDir::new()?;
    let root = LibraryFixture::new("Servo").without("sentence").write(temp.path())?;

    libresolve(temp.path())
        .arg("info")
        .arg(&root)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Missing 'sentence'"))
        .stderr(predicate::str::contains("sentence="));
    Ok(())
}

#[test]
fn test_info_not_a_library() -> Result<()> {
    let temp = TempDir::new()?;

    libresolve(temp.path())
        .arg("info")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No library.properties found"));
    Ok(())
}

#[test]
fn test_global_name_guessed_from_website() -> Result<()> {
    let temp = TempDir::new()?;

    libresolve(temp.path())
        .args(["global-name", "--name", "Servo", "--author", "Arduino"])
        .args(["--website", "https://www.arduino.cc/en/Reference/Servo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cc.arduino.en.Reference.Servo"))
        .stdout(predicate::str::contains("(guessed)"));
    Ok(())
}

#[test]
fn test_global_name_declared_json() -> Result<()> {
    let temp = TempDir::new()?;

    let output = libresolve(temp.path())
        .args(["global-name", "--name", "Servo", "--author", "A|B"])
        .args(["--declared", " org.acme.servo ", "--format", "json"])
        .output()?;
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(json["global_name"], "org.acme.servo");
    assert_eq!(json["guessed"], false);
    Ok(())
}

#[test]
fn test_global_name_falls_back_to_author() -> Result<()> {
    let temp = TempDir::new()?;

    libresolve(temp.path())
        .args(["global-name", "--name", "Servo", "--author", "A|B"])
        .assert()
        .success()
        .stdout(predicate::str::contains("A_B|Servo"));
    Ok(())
}

#[test]
fn test_matches_exit_status() -> Result<()> {
    let temp = TempDir::new()?;

    libresolve(temp.path())
        .args(["matches", "org.acme.servo:1.0-2.0", "1.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1.5 satisfies org.acme.servo:1.0-2.0"));

    libresolve(temp.path())
        .args(["matches", "org.acme.servo:1.0-2.0", "2.5"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("2.5 does not satisfy"));

    libresolve(temp.path()).args(["matches", "org.acme.servo:1.*", "1.9.3"]).assert().success();
    libresolve(temp.path()).args(["matches", "org.acme.servo", "0.0.1"]).assert().success();
    Ok(())
}

#[test]
fn test_matches_invalid_version() -> Result<()> {
    let temp = TempDir::new()?;

    libresolve(temp.path())
        .args(["matches", "org.acme.servo:1.0+", "1.x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid version"));
    Ok(())
}

#[test]
fn test_deps_direct_and_transitive() -> Result<()> {
    let temp = TempDir::new()?;
    let libraries = installed_chain(&temp)?;
    let app = libraries.join("App");

    libresolve(temp.path())
        .arg("-L")
        .arg(&libraries)
        .arg("deps")
        .arg(&app)
        .assert()
        .success()
        .stdout(predicate::str::contains("org.test.servo 1.2.0 (org.test.servo)"))
        .stdout(predicate::str::contains("org.test.wire").not());

    libresolve(temp.path())
        .arg("-L")
        .arg(&libraries)
        .args(["deps", "--transitive"])
        .arg(&app)
        .assert()
        .success()
        .stdout(predicate::str::contains("org.test.servo"))
        .stdout(predicate::str::contains("org.test.wire 1.0.0"));
    Ok(())
}

#[test]
fn test_deps_by_global_name_json() -> Result<()> {
    let temp = TempDir::new()?;
    let libraries = installed_chain(&temp)?;

    let output = libresolve(temp.path())
        .arg("-L")
        .arg(&libraries)
        .args(["deps", "org.test.app", "--transitive", "--format", "json"])
        .output()?;
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(json["library"], "org.test.app");
    assert_eq!(json["transitive"], true);
    let found: Vec<&str> = json["dependencies"]
        .as_array()
        .map(|deps| deps.iter().filter_map(|d| d["global_name"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(found, ["org.test.servo", "org.test.wire"]);
    assert_eq!(json["dependencies"][0]["version"], "1.2.0");
    Ok(())
}

#[test]
fn test_deps_without_dependencies() -> Result<()> {
    let temp = TempDir::new()?;
    let libraries = installed_chain(&temp)?;

    libresolve(temp.path())
        .arg("-L")
        .arg(&libraries)
        .args(["deps", "org.test.wire"])
        .assert()
        .success()
        .stdout(predicate::str::contains("org.test.wire has no dependencies"));
    Ok(())
}

#[test]
fn test_deps_unknown_library() -> Result<()> {
    let temp = TempDir::new()?;
    let libraries = installed_chain(&temp)?;

    libresolve(temp.path())
        .arg("-L")
        .arg(&libraries)
        .args(["deps", "org.test.nothing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Library 'org.test.nothing' not found"));
    Ok(())
}

#[test]
fn test_deps_library_paths_from_config_file() -> Result<()> {
    let temp = TempDir::new()?;
    let libraries = installed_chain(&temp)?;
    let config = format!("library_paths = [{:?}]\n", libraries.display().to_string());
    std::fs::write(temp.path().join("config.toml"), config)?;

    libresolve(temp.path())
        .args(["deps", "org.test.servo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("org.test.wire"));
    Ok(())
}

#[test]
fn test_deps_folder_outside_library_paths() -> Result<()> {
    let temp = TempDir::new()?;
    let libraries = installed_chain(&temp)?;
    let sketch = LibraryFixture::new("Sketch")
        .source("Sketch.ino", &["Servo.h"])
        .write(&temp.path().join("sketches"))?;

    libresolve(temp.path())
        .arg("-L")
        .arg(&libraries)
        .args(["deps", "--transitive"])
        .arg(&sketch)
        .assert()
        .success()
        .stdout(predicate::str::contains("org.test.servo"))
        .stdout(predicate::str::contains("org.test.wire"));
    Ok(())
}

#[test]
fn test_verbose_and_quiet_conflict() -> Result<()> {
    let temp = TempDir::new()?;

    libresolve(temp.path())
        .args(["-v", "-q", "matches", "x", "1.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
    Ok(())
}
