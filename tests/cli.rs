use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cli(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("prefect-project").unwrap();
    cmd.current_dir(dir.path()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn init_then_rerun() {
    let temp = TempDir::new().unwrap();

    cli(&temp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("prefect.yaml"))
        .stdout(predicate::str::contains(".prefect/"));

    assert!(temp.path().join(".prefect").is_dir());
    assert!(temp.path().join(".prefectignore").is_file());

    cli(&temp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already initialized"));
}

#[test]
fn init_with_fields() {
    let temp = TempDir::new().unwrap();

    cli(&temp)
        .args(["init", "--recipe", "docker", "-f", "image_name=acme/etl", "-f", "tag=v1"])
        .assert()
        .success();

    let content = fs::read_to_string(temp.path().join("prefect.yaml")).unwrap();
    assert!(content.contains("image_name: acme/etl"));
    assert!(content.contains("tag: v1"));
    assert!(content.contains("dockerfile: auto"));
}

#[test]
fn init_rejects_bad_field_and_unknown_recipe() {
    let temp = TempDir::new().unwrap();

    cli(&temp)
        .args(["init", "-f", "novalue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("KEY=VALUE"));

    cli(&temp)
        .args(["init", "--recipe", "kubernetes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown recipe 'kubernetes'"));
}

#[test]
fn register_and_list_flows() {
    let temp = TempDir::new().unwrap();
    cli(&temp).arg("init").assert().success();
    fs::write(
        temp.path().join("flows.py"),
        "from prefect import flow\n\n@flow\ndef my_flow():\n    pass\n",
    )
    .unwrap();

    cli(&temp)
        .args(["register", "flows.py:my_flow"])
        .assert()
        .success()
        .stdout(predicate::str::contains("'my-flow'"));

    let registry = fs::read_to_string(temp.path().join(".prefect").join("flows.json")).unwrap();
    assert_eq!(registry, "{\n  \"my-flow\": \"flows.py:my_flow\"\n}");

    cli(&temp)
        .arg("flows")
        .assert()
        .success()
        .stdout(predicate::str::contains("flows.py:my_flow"));
}

#[test]
fn register_without_function_name() {
    let temp = TempDir::new().unwrap();
    cli(&temp).arg("init").assert().success();

    cli(&temp)
        .args(["register", "flows.py"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Try flows.py:<flow_name>"));
}

#[test]
fn register_without_project() {
    let temp = TempDir::new().unwrap();

    cli(&temp)
        .args(["register", "flows.py:my_flow"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No .prefect directory could be found"));
}

#[test]
fn root_command() {
    let temp = TempDir::new().unwrap();
    cli(&temp).arg("root").assert().failure();

    cli(&temp).arg("init").assert().success();
    let nested = temp.path().join("src").join("pipelines");
    fs::create_dir_all(&nested).unwrap();

    let expected = fs::canonicalize(temp.path()).unwrap();
    Command::cargo_bin("prefect-project")
        .unwrap()
        .current_dir(&nested)
        .arg("root")
        .assert()
        .success()
        .stdout(predicate::str::contains(expected.display().to_string()));
}

#[test]
fn recipes_command() {
    let temp = TempDir::new().unwrap();

    cli(&temp)
        .arg("recipes")
        .assert()
        .success()
        .stdout(predicate::str::contains("docker-git"))
        .stdout(predicate::str::contains("local"));
}

#[test]
fn migrate_command() {
    let temp = TempDir::new().unwrap();

    cli(&temp)
        .arg("migrate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("deployment.yaml"));

    cli(&temp).arg("init").assert().success();
    fs::write(temp.path().join("deployment.yaml"), "name: nightly\n").unwrap();

    cli(&temp).arg("migrate").assert().success();
    let content = fs::read_to_string(temp.path().join("prefect.yaml")).unwrap();
    assert!(content.ends_with("deployments: []\n\ndeployments:\n- name: nightly\n"));
}
