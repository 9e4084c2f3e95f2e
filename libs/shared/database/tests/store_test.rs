use assert_matches::assert_matches;
use serde_json::json;
use tempfile::tempdir;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_config::{AppConfig, StoreBackend};
use shared_database::{JsonFileStore, RecordStore, StoreError, SupabaseClient};

fn supabase_config(url: String) -> AppConfig {
    AppConfig {
        store_backend: StoreBackend::Supabase,
        supabase_url: url,
        supabase_anon_key: "test-anon-key".to_string(),
        ..AppConfig::in_memory()
    }
}

#[tokio::test]
async fn test_file_store_missing_file_loads_empty() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());

    let records = store.load("appointments").await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_file_store_persists_across_instances() {
    let dir = tempdir().unwrap();
    let records = vec![
        json!({"id": "A0001", "status": "booked"}),
        json!({"id": "A0002", "status": "cancelled"}),
    ];

    JsonFileStore::new(dir.path())
        .save("appointments", records.clone())
        .await
        .unwrap();

    let reopened = JsonFileStore::new(dir.path());
    assert_eq!(reopened.load("appointments").await.unwrap(), records);
    assert!(!dir.path().join("appointments.json.tmp").exists());
}

#[tokio::test]
async fn test_file_store_creates_missing_directory() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("clinic").join("data");
    let store = JsonFileStore::new(&nested);

    store.save("doctors", vec![json!({"name": "Rehan Khan"})]).await.unwrap();

    assert!(nested.join("doctors.json").exists());
}

#[tokio::test]
async fn test_file_store_surfaces_corrupt_content() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("appointments.json"), b"{not json").unwrap();

    let store = JsonFileStore::new(dir.path());
    assert_matches!(store.load("appointments").await, Err(StoreError::Serialization(_)));
}

#[tokio::test]
async fn test_file_store_rejects_path_like_keys() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());

    assert_matches!(store.load("../secrets").await, Err(StoreError::InvalidKey(_)));
    assert_matches!(store.save("a/b", vec![]).await, Err(StoreError::InvalidKey(_)));
}

#[tokio::test]
async fn test_supabase_load_reads_table() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("select", "*"))
        .and(header("apikey", "test-anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "A0001"},
            {"id": "A0002"}
        ])))
        .mount(&mock_server)
        .await;

    let client = SupabaseClient::new(&supabase_config(mock_server.uri()));
    let records = client.load("appointments").await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["id"], "A0001");
}

#[tokio::test]
async fn test_supabase_save_upserts_collection() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .and(header("Prefer", "resolution=merge-duplicates,return=minimal"))
        .and(body_json(json!([{"id": "A0001"}])))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = SupabaseClient::new(&supabase_config(mock_server.uri()));
    client.save("appointments", vec![json!({"id": "A0001"})]).await.unwrap();
}

#[tokio::test]
async fn test_supabase_error_status_is_surfaced() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let client = SupabaseClient::new(&supabase_config(mock_server.uri()));
    let result = client.save("appointments", vec![json!({"id": "A0001"})]).await;

    assert_matches!(result, Err(StoreError::Remote { status: 503, .. }));
}
