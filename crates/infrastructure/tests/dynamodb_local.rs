//! DynamoDB Local を使ったリポジトリの統合テスト
//!
//! `docker run -p 8000:8000 amazon/dynamodb-local` で起動してから
//! `cargo test -p infrastructure -- --ignored` で実行する。

use aws_sdk_dynamodb::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType,
};
use aws_sdk_dynamodb::Client;
use chrono::Utc;
use domain::{TodoError, TodoPatch, TodoRecord};
use infrastructure::{DynamoDbClient, DynamoTodoRepository, TodoStore};
use serde_json::json;

/// 統合テスト用のセットアップ（テストごとに専用テーブルを作成）
async fn setup_test_repository() -> DynamoTodoRepository {
    let endpoint = std::env::var("DYNAMODB_ENDPOINT")
        .unwrap_or_else(|_| "http://localhost:8000".to_string());

    let config = aws_sdk_dynamodb::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(Credentials::new("test", "test", None, None, "test"))
        .endpoint_url(endpoint)
        .build();
    let client = Client::from_conf(config);

    let table_name = format!("todos-test-{}", Utc::now().timestamp_nanos_opt().unwrap_or(0));
    client
        .create_table()
        .table_name(&table_name)
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name("id")
                .attribute_type(ScalarAttributeType::S)
                .build()
                .expect("属性定義の作成に失敗"),
        )
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name("id")
                .key_type(KeyType::Hash)
                .build()
                .expect("キースキーマの作成に失敗"),
        )
        .billing_mode(BillingMode::PayPerRequest)
        .send()
        .await
        .expect("テスト用テーブルの作成に失敗");

    DynamoTodoRepository::new(DynamoDbClient::from_client(client, Some(table_name)))
}

#[tokio::test]
#[ignore = "requires DynamoDB Local"]
async fn test_crud_round_trip() {
    let repo = setup_test_repository().await;

    let record =
        TodoRecord::create(json!({"id": "1", "title": "Buy milk"}), Utc::now()).unwrap();
    repo.put(&record).await.unwrap();

    let stored = repo.get("1").await.unwrap().expect("作成したToDoが取得できない");
    assert_eq!(stored, record);

    let patch = TodoPatch::from_payload(json!({"completed": true})).unwrap();
    let updated = repo.update("1", &patch).await.unwrap();
    assert_eq!(updated.get("completed"), Some(&json!(true)));
    assert_eq!(updated.get("title"), Some(&json!("Buy milk")));
    assert_eq!(updated.created_at(), record.created_at());

    repo.delete("1").await.unwrap();
    assert_eq!(repo.get("1").await.unwrap(), None);
}

#[tokio::test]
#[ignore = "requires DynamoDB Local"]
async fn test_update_of_missing_id_is_not_found() {
    let repo = setup_test_repository().await;
    let patch = TodoPatch::from_payload(json!({"title": "ghost"})).unwrap();

    let result = repo.update("never-created", &patch).await;
    assert_eq!(result, Err(TodoError::NotFound("never-created".to_string())));
    assert_eq!(repo.get("never-created").await.unwrap(), None);
}

#[tokio::test]
#[ignore = "requires DynamoDB Local"]
async fn test_scan_all_and_idempotent_delete() {
    let repo = setup_test_repository().await;

    for id in ["a", "b"] {
        let record = TodoRecord::create(json!({"id": id}), Utc::now()).unwrap();
        repo.put(&record).await.unwrap();
    }

    let mut ids: Vec<String> = repo
        .scan_all()
        .await
        .unwrap()
        .iter()
        .map(|r| r.id().to_string())
        .collect();
    ids.sort();
    assert_eq!(ids, vec!["a", "b"]);

    repo.delete("does-not-exist").await.unwrap();
}

#[tokio::test]
#[ignore = "requires DynamoDB Local"]
async fn test_scan_all_follows_pages_past_one_megabyte() {
    let repo = setup_test_repository().await;
    // 1 ページ 1MB の上限を超えるよう大きな本文を持たせる
    let note = "x".repeat(350_000);

    for id in ["p1", "p2", "p3", "p4"] {
        let record = TodoRecord::create(json!({"id": id, "note": note}), Utc::now()).unwrap();
        repo.put(&record).await.unwrap();
    }

    let records = repo.scan_all().await.unwrap();
    let mut ids: Vec<&str> = records.iter().map(TodoRecord::id).collect();
    ids.sort();
    assert_eq!(ids, vec!["p1", "p2", "p3", "p4"]);
    assert!(records
        .iter()
        .all(|r| r.get("note").and_then(|v| v.as_str()).map(str::len) == Some(350_000)));
}
