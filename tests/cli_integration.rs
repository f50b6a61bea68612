//! CLI integration tests for mpsbuild.
//!
//! These tests run the binary against small MPS project trees.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the mpsbuild binary command.
fn mpsbuild() -> Command {
    Command::cargo_bin("mpsbuild").unwrap()
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

const CONFIG: &str = r#"
[build]
search = ["modules"]
ignored_modules = ["6354ebe7-c22a-4a0f-ac54-50b52ab9b065"]

[[publication]]
name = "Core"
modules = ["org.example.core", "org.example.lang"]

[[publication]]
name = "ui"
include_paths = ["modules/ui"]

[[stubs]]
coordinates = "com.google.guava:guava:31.0"
jars = ["libs/guava-31.0.jar"]
"#;

/// A project with a language, a core solution using it and a UI solution
/// depending on the core.
fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write(root, "mpsbuild.toml", CONFIG);
    write(
        root,
        "modules/lang/org.example.lang.mpl",
        r#"<?xml version="1.0" encoding="UTF-8"?>
<language namespace="org.example.lang" uuid="11111111-0000-0000-0000-000000000001" languageVersion="1">
  <models>
    <modelRoot contentPath="${module}" type="default"><sourceRoot location="models" /></modelRoot>
  </models>
  <generators>
    <generator namespace="org.example.lang.generator" uuid="11111111-0000-0000-0000-000000000002" />
  </generators>
</language>"#,
    );
    write(
        root,
        "modules/core/org.example.core.msd",
        r#"<?xml version="1.0" encoding="UTF-8"?>
<solution name="org.example.core" uuid="22222222-0000-0000-0000-000000000001">
  <models>
    <modelRoot contentPath="${module}" type="default"><sourceRoot location="models" /></modelRoot>
  </models>
  <dependencies>
    <dependency reexport="false">~stubs#com.google.guava#guava#31.0(stubs#com.google.guava#guava#31.0)</dependency>
  </dependencies>
  <languageVersions>
    <language slang="l:11111111-0000-0000-0000-000000000001:org.example.lang" version="1" />
  </languageVersions>
</solution>"#,
    );
    write(
        root,
        "modules/ui/org.example.ui.msd",
        r#"<?xml version="1.0" encoding="UTF-8"?>
<solution name="org.example.ui" uuid="33333333-0000-0000-0000-000000000001">
  <dependencies>
    <dependency reexport="false">22222222-0000-0000-0000-000000000001(org.example.core)</dependency>
  </dependencies>
</solution>"#,
    );
    tmp
}

// ============================================================================
// mpsbuild generate
// ============================================================================

#[test]
fn test_generate_writes_build_files() {
    let tmp = project();

    mpsbuild()
        .arg("generate")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated 4 modules"));

    let build_dir = tmp.path().join("build/mpsbuild");
    let script = fs::read_to_string(build_dir.join("build-modules.xml")).unwrap();
    assert!(script.contains(r#"<module name="org.example.ui""#));
    assert!(script.contains(r#"<library coordinates="com.google.guava:guava:31.0" />"#));

    let plan: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(build_dir.join("build-plan.json")).unwrap())
            .unwrap();
    assert_eq!(plan["fingerprint"].as_str().unwrap().len(), 64);

    assert!(build_dir
        .join("dependencies/stubs/stubs#com.google.guava#guava#31.0/stubs#com.google.guava#guava#31.0.msd")
        .is_file());
}

#[test]
fn test_generate_with_explicit_config() {
    let tmp = project();
    let elsewhere = TempDir::new().unwrap();

    mpsbuild()
        .args(["generate", "--config"])
        .arg(tmp.path().join("mpsbuild.toml"))
        .args(["--build-dir"])
        .arg(elsewhere.path().join("out"))
        .current_dir(elsewhere.path())
        .assert()
        .success();

    assert!(elsewhere.path().join("out/build-modules.xml").is_file());
    assert!(!tmp.path().join("build").exists());
}

#[test]
fn test_generate_fails_on_overlap_without_writing() {
    let tmp = project();
    write(
        tmp.path(),
        "mpsbuild.toml",
        &CONFIG.replace(r#"include_paths = ["modules/ui"]"#, r#"modules = ["org.example.core"]"#),
    );

    mpsbuild()
        .arg("generate")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: publications `Core` and `ui` both contain"))
        .stderr(predicate::str::contains("help:"))
        .stderr(predicate::str::contains("\x1b[").not());

    assert!(!tmp.path().join("build").exists());
}

#[test]
fn test_generate_fails_on_unresolved_dependency() {
    let tmp = project();
    write(
        tmp.path(),
        "modules/ui/org.example.ui.msd",
        r#"<solution name="org.example.ui" uuid="33333333-0000-0000-0000-000000000001">
  <dependencies><dependency reexport="false">44444444-0000-0000-0000-000000000001(org.example.missing)</dependency></dependencies>
</solution>"#,
    );

    mpsbuild()
        .arg("generate")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unresolved dependency `org.example.missing`"))
        .stderr(predicate::str::contains("required by `org.example.ui`"));
}

#[test]
fn test_missing_config_fails() {
    let tmp = TempDir::new().unwrap();

    mpsbuild()
        .arg("check")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not find `mpsbuild.toml`"));
}

// ============================================================================
// mpsbuild check / modules / publications / stubs
// ============================================================================

#[test]
fn test_check_reports_publications() {
    let tmp = project();

    mpsbuild()
        .arg("check")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("ui: 1 modules, depends on Core"))
        .stdout(predicate::str::contains("configuration is valid"));

    assert!(!tmp.path().join("build").exists());
}

#[test]
fn test_modules_json() {
    let tmp = project();

    let output = mpsbuild()
        .args(["modules", "--json"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let modules: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = modules
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            "org.example.core",
            "org.example.lang",
            "org.example.lang.generator",
            "org.example.ui",
            "stubs#com.google.guava#guava#31.0",
        ]
    );
    assert_eq!(modules[1]["kind"], "language");
    assert_eq!(modules[1]["owner"], "source");
}

#[test]
fn test_modules_table() {
    let tmp = project();

    mpsbuild()
        .arg("modules")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("modules/ui/org.example.ui.msd"))
        .stdout(predicate::str::contains("5 modules"));
}

#[test]
fn test_publications_view() {
    let tmp = project();

    mpsbuild()
        .arg("publications")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Core (core)"))
        .stdout(predicate::str::contains("depends on: Core"))
        .stdout(predicate::str::contains("org.example.lang-generator.jar"))
        .stdout(predicate::str::contains("com.google.guava:guava:31.0"));
}

#[test]
fn test_publication_with_idea_plugin() {
    let tmp = project();
    write(
        tmp.path(),
        "modules/ui/plugin/org.example.ui.plugin.msd",
        r#"<solution name="org.example.ui.plugin" uuid="33333333-0000-0000-0000-000000000002">
  <dependencies>
    <dependency reexport="false">33333333-0000-0000-0000-000000000001(org.example.ui)</dependency>
  </dependencies>
</solution>"#,
    );
    let config = CONFIG.replace(
        r#"include_paths = ["modules/ui"]"#,
        "include_paths = [\"modules/ui\"]\n\n[[publication.idea_plugin]]\nimplementation_module = \"org.example.ui.plugin\"\n",
    );
    write(tmp.path(), "mpsbuild.toml", &config);

    mpsbuild()
        .arg("publications")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("idea plugins:"))
        .stdout(predicate::str::contains(
            "org.example.ui.plugin -> build/mpsbuild/idea-plugins/org.example.ui.plugin",
        ))
        .stdout(predicate::str::contains("org.example.ui.plugin.jar").not());
}

#[test]
fn test_missing_idea_plugin_module_fails() {
    let tmp = project();
    let config = CONFIG.replace(
        r#"include_paths = ["modules/ui"]"#,
        "include_paths = [\"modules/ui\"]\n\n[[publication.idea_plugin]]\nimplementation_module = \"org.example.nowhere\"\n",
    );
    write(tmp.path(), "mpsbuild.toml", &config);

    mpsbuild()
        .arg("generate")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "IDEA plugin implementation modules not found: org.example.nowhere (in publication `ui`)",
        ));

    assert!(!tmp.path().join("build").exists());
}

#[test]
fn test_stubs_only() {
    let tmp = project();

    mpsbuild()
        .arg("stubs")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote"));

    assert!(tmp.path().join("build/mpsbuild/dependencies/stubs").is_dir());
    assert!(!tmp.path().join("build/mpsbuild/build-modules.xml").exists());
}
