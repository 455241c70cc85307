use assert_cmd::Command;
use modelsmith_core::Persistable;
use modelsmith_ir::{Document, Model, Relation};
use predicates::prelude::*;
use serde_json::json;
use std::path::PathBuf;
use tempfile::TempDir;
use uuid::Uuid;

fn modelsmith() -> Command {
    let mut cmd = Command::cargo_bin("modelsmith").expect("binary should build");
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG").env_remove("MODELSMITH_BACKEND");
    cmd
}

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("should write fixture");
    path
}

fn blog() -> Document {
    let mut doc = Document::new("Blog");
    let user = doc.add_model(Model::with_id(Uuid::from_u128(1), "User"));
    let post = doc.add_model(Model::with_id(Uuid::from_u128(2), "Post"));
    doc.add_relation(Relation::one_to_many(user, post).with_id(Uuid::from_u128(10)));
    doc
}

#[test]
fn migrate_upgrades_v1_documents() {
    let dir = TempDir::new().unwrap();
    let v1 = json!({
        "version": 1,
        "project": { "name": "Legacy" },
        "models": [{
            "id": Uuid::from_u128(1),
            "name": "User",
            "role": "auth",
            "attributes": [
                {
                    "id": Uuid::from_u128(2),
                    "modelId": Uuid::from_u128(1),
                    "name": "id",
                    "type": "id"
                }
            ]
        }],
        "relations": []
    });
    let path = write(&dir, "legacy.json", &v1.to_string());

    modelsmith()
        .arg("migrate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"version\": 2"))
        .stdout(predicate::str::contains("\"userModelId\""))
        .stdout(predicate::str::contains("\"password\""));
}

#[test]
fn migrate_rejects_newer_versions() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "future.json", r#"{ "version": 42, "project": {}, "models": [] }"#);

    modelsmith()
        .arg("migrate")
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to load"));
}

#[test]
fn check_passes_clean_documents() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "blog.json", &blog().to_json().unwrap());

    modelsmith()
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("ok: Blog"));
}

#[test]
fn check_reports_conflicts() {
    let dir = TempDir::new().unwrap();
    let mut doc = blog();
    doc.add_relation(Relation::one_to_many(Uuid::from_u128(1), Uuid::from_u128(2)));
    let path = write(&dir, "blog.json", &doc.to_json().unwrap());
    let report = dir.path().join("report.txt");

    modelsmith()
        .arg("check")
        .arg(&path)
        .arg("--output")
        .arg(&report)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("'posts'"))
        .stderr(predicate::str::contains("diagnostic(s) in Blog"));

    let written = std::fs::read_to_string(&report).unwrap();
    assert!(written.contains("'posts'"), "report should list diagnostics:\n{written}");
}

#[test]
fn context_writes_ir_to_file() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "blog.json", &blog().to_json().unwrap());
    let out = dir.path().join("ir.json");

    modelsmith()
        .args(["context", "--backend", "sqlite", "--no-audit"])
        .args(["--option", "prefix=app_", "--option", "dialect=strict"])
        .arg(&path)
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    let ir: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    let contexts = ir["contexts"].as_array().unwrap();
    assert_eq!(contexts.len(), 2);
    assert_eq!(contexts[0]["typeName"], "User");
    assert_eq!(contexts[1]["foreignKeys"][0]["name"], "userId");
    assert_eq!(ir["diagnostics"].as_array().unwrap().len(), 0);
    assert_eq!(ir["options"], json!({ "dialect": "strict", "prefix": "app_" }));
}

#[test]
fn context_rejects_malformed_options() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "blog.json", &blog().to_json().unwrap());

    modelsmith()
        .args(["context", "--option", "prefix"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected KEY=VALUE"));
}

#[test]
fn context_rejects_unknown_backend() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "blog.json", &blog().to_json().unwrap());

    modelsmith()
        .args(["context", "--backend", "oracle"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("oracle"));
}

#[test]
fn split_replaces_many_to_many() {
    let dir = TempDir::new().unwrap();
    let mut doc = Document::new("Shop");
    let order = doc.add_model(Model::new("Order"));
    let product = doc.add_model(Model::new("Product"));
    let relation = doc.add_relation(Relation::many_to_many(order, product));
    let path = write(&dir, "shop.json", &doc.to_json().unwrap());

    let output = modelsmith()
        .arg("split")
        .arg(&path)
        .arg(relation.to_string())
        .output()
        .unwrap();
    assert!(output.status.success());

    let split: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(split["models"].as_array().unwrap().len(), 3);
    assert_eq!(split["models"][2]["name"], "OrderProduct");
    assert_eq!(split["relations"].as_array().unwrap().len(), 2);
}

#[test]
fn split_reports_wrong_relation_kind() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "blog.json", &blog().to_json().unwrap());

    modelsmith()
        .arg("split")
        .arg(&path)
        .arg(Uuid::from_u128(10).to_string())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to split relation"));
}

#[test]
fn swap_moves_one_to_one_foreign_key() {
    let dir = TempDir::new().unwrap();
    let mut doc = Document::new("Accounts");
    let user = doc.add_model(Model::with_id(Uuid::from_u128(1), "User"));
    let profile = doc.add_model(Model::with_id(Uuid::from_u128(2), "Profile"));
    let relation = doc.add_relation(Relation::one_to_one(user, profile));
    let path = write(&dir, "accounts.json", &doc.to_json().unwrap());

    let output = modelsmith()
        .arg("swap")
        .arg(&path)
        .arg(relation.to_string())
        .output()
        .unwrap();
    assert!(output.status.success());

    let swapped: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(swapped["relations"][0]["sourceId"], json!(profile));
    assert_eq!(swapped["relations"][0]["targetId"], json!(user));
}

#[test]
fn missing_file_is_reported() {
    modelsmith()
        .args(["check", "does-not-exist.json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to read does-not-exist.json"));
}
