use crate::models::{id_key, item_to_record, record_to_item, Item, UpdateExpression};
use crate::DynamoDbClient;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::ReturnValue;
use domain::{TodoError, TodoPatch, TodoRecord};
use shared::telemetry::trace_dynamodb_operation;
use std::future::Future;
use tracing::debug;

/// ToDo コレクションに対するキーバリューストアの最小抽象
///
/// 各メソッドはバックエンドへの 1 回の呼び出しに対応する（scan の続きページ取得を除く）。
pub trait TodoStore: Send + Sync {
    /// 同じ id のレコードがあれば上書きする
    fn put(&self, record: &TodoRecord) -> impl Future<Output = Result<(), TodoError>> + Send;

    fn get(&self, id: &str) -> impl Future<Output = Result<Option<TodoRecord>, TodoError>> + Send;

    /// コレクション全件を返す（順序は保証しない）
    fn scan_all(&self) -> impl Future<Output = Result<Vec<TodoRecord>, TodoError>> + Send;

    /// 存在しない id の場合は `TodoError::NotFound`
    fn update(
        &self,
        id: &str,
        patch: &TodoPatch,
    ) -> impl Future<Output = Result<TodoRecord, TodoError>> + Send;

    /// 存在しない id でもエラーにしない
    fn delete(&self, id: &str) -> impl Future<Output = Result<(), TodoError>> + Send;
}

/// DynamoDB テーブルをバックエンドとするリポジトリ
#[derive(Clone)]
pub struct DynamoTodoRepository {
    db: DynamoDbClient,
}

impl DynamoTodoRepository {
    pub fn new(db: DynamoDbClient) -> Self {
        Self { db }
    }
}

fn dynamodb_error<E>(err: E) -> TodoError
where
    E: std::error::Error,
{
    TodoError::DynamoDb(DisplayErrorContext(err).to_string())
}

/// Scan 1 回分の結果（アイテムと続きの開始キー）
type ScanPage = (Vec<Item>, Option<Item>);

/// 続きの開始キーがなくなるまでページを取得し、全レコードを集める
async fn collect_scan_pages<F, Fut>(
    table: &str,
    mut fetch_page: F,
) -> Result<Vec<TodoRecord>, TodoError>
where
    F: FnMut(Option<Item>) -> Fut,
    Fut: Future<Output = Result<ScanPage, TodoError>>,
{
    let mut records = Vec::new();
    let mut start_key: Option<Item> = None;

    loop {
        let (items, last_evaluated_key) = fetch_page(start_key.take()).await?;
        for item in &items {
            records.push(item_to_record(item)?);
        }

        match last_evaluated_key {
            Some(key) if !key.is_empty() => start_key = Some(key),
            _ => break,
        }
        debug!(table, fetched = records.len(), "Continuing scan from last evaluated key");
    }

    Ok(records)
}

impl TodoStore for DynamoTodoRepository {
    async fn put(&self, record: &TodoRecord) -> Result<(), TodoError> {
        let table = self.db.table_name()?;

        trace_dynamodb_operation(table, "PutItem", async move {
            self.db
                .client()
                .put_item()
                .table_name(table)
                .set_item(Some(record_to_item(record)))
                .send()
                .await
                .map_err(dynamodb_error)
        })
        .await?;

        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<TodoRecord>, TodoError> {
        let table = self.db.table_name()?;
        let (key_name, key_value) = id_key(id);

        let output = trace_dynamodb_operation(table, "GetItem", async move {
            self.db
                .client()
                .get_item()
                .table_name(table)
                .key(key_name, key_value)
                .send()
                .await
                .map_err(dynamodb_error)
        })
        .await?;

        output.item().map(item_to_record).transpose()
    }

    async fn scan_all(&self) -> Result<Vec<TodoRecord>, TodoError> {
        let table = self.db.table_name()?;

        collect_scan_pages(table, move |exclusive_start_key| async move {
            trace_dynamodb_operation(table, "Scan", async move {
                self.db
                    .client()
                    .scan()
                    .table_name(table)
                    .set_exclusive_start_key(exclusive_start_key)
                    .send()
                    .await
                    .map_err(dynamodb_error)
            })
            .await
            .map(|output| {
                (
                    output.items().to_vec(),
                    output.last_evaluated_key().cloned(),
                )
            })
        })
        .await
    }

    async fn update(&self, id: &str, patch: &TodoPatch) -> Result<TodoRecord, TodoError> {
        let table = self.db.table_name()?;
        let (key_name, key_value) = id_key(id);
        let update = UpdateExpression::from_patch(patch);

        let output = trace_dynamodb_operation(table, "UpdateItem", async move {
            let result = self
                .db
                .client()
                .update_item()
                .table_name(table)
                .key(key_name, key_value)
                .update_expression(update.expression)
                .condition_expression(UpdateExpression::condition())
                .set_expression_attribute_names(Some(update.names))
                .set_expression_attribute_values(Some(update.values))
                .return_values(ReturnValue::AllNew)
                .send()
                .await;

            match result {
                Ok(output) => Ok(output),
                Err(err)
                    if err
                        .as_service_error()
                        .is_some_and(|e| e.is_conditional_check_failed_exception()) =>
                {
                    Err(TodoError::NotFound(id.to_string()))
                }
                Err(err) => Err(dynamodb_error(err)),
            }
        })
        .await?;

        let attributes = output.attributes().ok_or_else(|| {
            TodoError::Serialization("UpdateItem returned no attributes".to_string())
        })?;
        item_to_record(attributes)
    }

    async fn delete(&self, id: &str) -> Result<(), TodoError> {
        let table = self.db.table_name()?;
        let (key_name, key_value) = id_key(id);

        trace_dynamodb_operation(table, "DeleteItem", async move {
            self.db
                .client()
                .delete_item()
                .table_name(table)
                .key(key_name, key_value)
                .send()
                .await
                .map_err(dynamodb_error)
        })
        .await?;

        Ok(())
    }
}
