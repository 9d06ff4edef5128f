use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

const DESCRIPTION: &str = r#"
project:
  name: example
  version: "1.0"
bukkitPluginYaml:
  main: com.example.Main
fabricModJson:
  entrypoints:
    - type: main
      value: com.example.Fabric
"#;

fn cli() -> Command {
    Command::cargo_bin("resource-factory").unwrap()
}

#[test]
fn generate_writes_manifests() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("resource-factory.yml");
    fs::write(&config, DESCRIPTION).unwrap();

    cli()
        .arg("--config")
        .arg(&config)
        .arg("generate")
        .assert()
        .success()
        .stdout(predicate::str::contains("plugin.yml"))
        .stdout(predicate::str::contains("fabric.mod.json"));

    let out = dir.path().join("build/generated/resourceFactory/main");
    assert_eq!(
        fs::read_to_string(out.join("plugin.yml")).unwrap(),
        "name: example\nversion: '1.0'\nmain: com.example.Main\n"
    );
    assert!(out.join("fabric.mod.json").is_file());
}

#[test]
fn plan_lists_factories() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("resource-factory.yml");
    fs::write(&config, DESCRIPTION).unwrap();

    cli()
        .arg("-c")
        .arg(&config)
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("0. SimpleResourceFactory(path=plugin.yml"))
        .stdout(predicate::str::contains("FabricModJson(id=example)"));
}

#[test]
fn verbose_logs_progress_to_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("resource-factory.yml");
    fs::write(&config, DESCRIPTION).unwrap();

    cli()
        .env_remove("RUST_LOG")
        .arg("--verbose")
        .arg("-c")
        .arg(&config)
        .arg("generate")
        .assert()
        .success()
        .stderr(predicate::str::contains("Loaded"))
        .stderr(predicate::str::contains("Wrote 2 file(s) for source set 'main'"));

    cli()
        .env_remove("RUST_LOG")
        .arg("-c")
        .arg(&config)
        .arg("plan")
        .assert()
        .success()
        .stderr(predicate::str::contains("Planned").not());
}

#[test]
fn validation_failure_reports_factory_listing() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("resource-factory.yml");
    fs::write(&config, "bukkitPluginYaml:\n  name: bad name!\n  version: '1'\n  main: a.B\n").unwrap();

    cli()
        .arg("-c")
        .arg(&config)
        .arg("generate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid Bukkit plugin name 'bad name!'"))
        .stderr(predicate::str::contains("Factories:"));
}

#[test]
fn missing_description_fails() {
    let dir = tempfile::tempdir().unwrap();
    cli()
        .arg("-c")
        .arg(dir.path().join("absent.yml"))
        .arg("plan")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load"));
}

#[test]
fn schema_describes_the_build_description() {
    cli()
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("BuildConfig"))
        .stdout(predicate::str::contains("neoForgeModsToml"));
}
