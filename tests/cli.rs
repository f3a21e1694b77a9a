use std::path::{Path, PathBuf};
use std::process::Output;

use assert_cmd::Command;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_config(dir: &Path, extra: &str) -> PathBuf {
    let config = dir.join("storefront.yaml");
    let yaml = format!(
        "artifacts:\n  dir: {}\nreport:\n  dir: {}\n{}",
        dir.join("artifacts").display(),
        dir.join("results").display(),
        extra
    );
    std::fs::write(&config, yaml).unwrap();
    config
}

fn run(dir: &Path, config: &Path, args: &[&str]) -> Output {
    Command::cargo_bin("storefront-e2e")
        .unwrap()
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("PAGESPEED_API_KEY")
        .arg("--config")
        .arg(config)
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn list_marks_skipped_scenarios() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");

    let output = run(dir.path(), &config, &["list"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("PD001 - product title is displayed"));
    assert!(text.contains("- cart"));
    assert!(text.contains("39 scenario(s), 34 selected"), "{text}");
}

#[test]
fn list_as_json_is_parseable() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");

    let output = run(dir.path(), &config, &["--output", "json", "list", "--tag", "smoke"]);
    assert!(output.status.success());
    let entries: Vec<Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| e["selected"] == json!(true)));
}

#[test]
fn config_show_prints_effective_values() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "retry:\n  attempts: 5\n");

    let output = run(dir.path(), &config, &["config", "show"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("Current configuration ("));
    assert!(text.contains("attempts: 5"));
    assert!(!text.contains("api_key"));
}

#[test]
fn missing_explicit_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &dir.path().join("nope.yaml"), &["list"]);
    assert!(!output.status.success());
}

#[test]
fn artifacts_list_and_sweep() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");
    let artifacts = dir.path().join("artifacts");
    std::fs::create_dir_all(&artifacts).unwrap();
    std::fs::write(artifacts.join("price-debug-20260101T000000000-0a1b2c3d.png"), b"png").unwrap();
    std::fs::write(artifacts.join("price-debug-20260101T000000000-0a1b2c3d.html"), b"<html/>").unwrap();
    std::fs::write(artifacts.join("notes.txt"), b"keep").unwrap();

    let output = run(dir.path(), &config, &["--output", "json", "artifacts", "list"]);
    assert!(output.status.success());
    let listed: Vec<Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(listed.len(), 2);

    std::thread::sleep(std::time::Duration::from_millis(50));
    let output = run(
        dir.path(),
        &config,
        &["--output", "json", "artifacts", "sweep", "--older-than", "0s"],
    );
    assert!(output.status.success());
    let swept: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(swept["removed"], json!(2));
    assert!(artifacts.join("notes.txt").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn audit_fails_below_threshold() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/runPagespeed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "lighthouseResult": {
                "categories": {
                    "performance": { "score": 0.95 },
                    "accessibility": { "score": 0.6 }
                }
            }
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        &format!(
            "pagespeed:\n  endpoint: {}/runPagespeed\n  categories: [performance, accessibility]\n",
            server.uri()
        ),
    );
    let root = dir.path().to_path_buf();

    let (lenient, strict) = tokio::task::spawn_blocking(move || {
        let lenient = run(
            &root,
            &config,
            &["audit", "--url", "https://shop.test/us", "--threshold", "0.5"],
        );
        let strict = run(&root, &config, &["audit", "--url", "https://shop.test/us"]);
        (lenient, strict)
    })
    .await
    .unwrap();

    assert!(lenient.status.success(), "{}", String::from_utf8_lossy(&lenient.stderr));
    assert!(stdout(&lenient).contains("accessibility"));
    assert!(!strict.status.success());
    assert!(String::from_utf8_lossy(&strict.stderr).contains("accessibility"));
}
