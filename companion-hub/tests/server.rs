use companion_hub::{ServerConfig, ServerHandle};
use serde_json::{json, Value};
use std::net::SocketAddr;
use tempfile::TempDir;

fn config(tempdir: &TempDir) -> ServerConfig {
    ServerConfig {
        addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        data_file: tempdir.path().join("db.json"),
        downloads_dir: Some(tempdir.path().join("Downloads")),
        ..ServerConfig::default()
    }
}

#[tokio::test]
async fn serves_until_stopped() {
    let tempdir = tempfile::tempdir().unwrap();
    let server = ServerHandle::start(&config(&tempdir)).await.unwrap();
    let base = server.url();
    assert_eq!(base, format!("http://{}/", server.local_addr()));
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}health")).send().await.unwrap();
    assert!(resp.status().is_success());
    assert_eq!(resp.text().await.unwrap(), "OK");

    let resp = client
        .post(format!("{base}api/data"))
        .json(&json!({"userName": "Ren"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.json::<Value>().await.unwrap(), json!({"success": true}));

    let resp = client
        .patch(format!("{base}api/data/aiName"))
        .json(&json!("Aiko"))
        .send()
        .await
        .unwrap();
    assert_eq!(
        resp.json::<Value>().await.unwrap(),
        json!({"success": true, "updated": {"aiName": "Aiko"}})
    );

    let doc: Value = client
        .get(format!("{base}api/data"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(doc, json!({"userName": "Ren", "aiName": "Aiko"}));

    server.stop().await.unwrap();
    assert!(client.get(format!("{base}health")).send().await.is_err());
}

#[tokio::test]
async fn serves_bundled_homepage_and_icon() {
    let tempdir = tempfile::tempdir().unwrap();
    let server = ServerHandle::start(&config(&tempdir)).await.unwrap();
    let base = server.url();

    let resp = reqwest::get(&base).await.unwrap();
    assert!(resp.status().is_success());
    assert!(resp.text().await.unwrap().contains("DigitalWife"));

    let resp = reqwest::get(format!("{base}favicon.ico")).await.unwrap();
    assert!(resp.status().is_success());
    assert!(!resp.bytes().await.unwrap().is_empty());

    let resp = reqwest::get(format!("{base}frontend/src/api/backend-api.js"))
        .await
        .unwrap();
    assert!(resp.status().is_success());

    server.stop().await.unwrap();
}

#[tokio::test]
async fn concurrent_replaces_leave_one_input() {
    let tempdir = tempfile::tempdir().unwrap();
    let config = config(&tempdir);
    let server = ServerHandle::start(&config).await.unwrap();
    let base = server.url();
    let client = reqwest::Client::new();

    let first = json!({"writer": "first", "blob": "a".repeat(16 * 1024)});
    let second = json!({"writer": "second", "blob": "b".repeat(16 * 1024)});

    let mut tasks = Vec::new();
    for body in [first.clone(), second.clone()] {
        let client = client.clone();
        let url = format!("{base}api/data");
        tasks.push(tokio::spawn(async move {
            for _ in 0..10 {
                let resp = client.post(&url).json(&body).send().await.unwrap();
                assert!(resp.status().is_success());
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let on_disk: Value =
        serde_json::from_slice(&std::fs::read(&config.data_file).unwrap()).unwrap();
    assert!(on_disk == first || on_disk == second);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn binding_a_taken_port_fails() {
    let tempdir = tempfile::tempdir().unwrap();
    let first = ServerHandle::start(&config(&tempdir)).await.unwrap();

    let taken = ServerConfig {
        addr: first.local_addr(),
        ..config(&tempdir)
    };
    let err = ServerHandle::start(&taken).await.err().unwrap();
    assert!(err.to_string().contains("failed to bind"));

    first.stop().await.unwrap();
}
