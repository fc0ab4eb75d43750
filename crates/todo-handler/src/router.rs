use chrono::Utc;
use domain::{TodoPatch, TodoRecord};
use infrastructure::TodoStore;
use serde_json::json;
use shared::telemetry::trace_http_response;
use tracing::info;

use crate::error::ApiError;
use crate::request::{ApiGatewayProxyRequest, RequestDescriptor};
use crate::response::ApiGatewayProxyResponse;

/// メソッドと id の有無から決まる操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    List,
    Create,
    Get(&'a str),
    Update(&'a str),
    Delete(&'a str),
    Unsupported,
}

impl<'a> Route<'a> {
    /// `method` は大文字に正規化済みであること
    pub fn resolve(method: &str, id: Option<&'a str>) -> Self {
        match (method, id) {
            ("GET", None) => Route::List,
            ("POST", None) => Route::Create,
            ("GET", Some(id)) => Route::Get(id),
            ("PUT" | "PATCH", Some(id)) => Route::Update(id),
            ("DELETE", Some(id)) => Route::Delete(id),
            _ => Route::Unsupported,
        }
    }
}

/// リクエストを各 CRUD 操作へ振り分けるルーター
///
/// ストアは起動時に一度だけ作成して渡し、呼び出し間で使い回す。
pub struct Router<S> {
    store: S,
    cors_allow_origin: Option<String>,
}

impl<S: TodoStore> Router<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            cors_allow_origin: None,
        }
    }

    pub fn with_cors_allow_origin(mut self, origin: Option<String>) -> Self {
        self.cors_allow_origin = origin;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// API Gateway イベントを処理してレスポンスを返す（失敗もレスポンスに変換する）
    pub async fn handle(&self, request: &ApiGatewayProxyRequest) -> ApiGatewayProxyResponse {
        self.handle_descriptor(&request.descriptor()).await
    }

    pub async fn handle_descriptor(
        &self,
        request: &RequestDescriptor<'_>,
    ) -> ApiGatewayProxyResponse {
        let path = request.path.unwrap_or_default();
        info!(
            method = %request.method,
            path = path,
            id = request.id.unwrap_or_default(),
            "Incoming request"
        );

        let response = match self.dispatch(request).await {
            Ok(response) => response,
            Err(e) => {
                if matches!(e, ApiError::Internal(_)) {
                    tracing::error!(error = %e, "Handler error");
                }
                e.into_response()
            }
        };

        trace_http_response(&request.method, path, response.status_code);

        match &self.cors_allow_origin {
            Some(origin) => response.with_cors(origin),
            None => response,
        }
    }

    async fn dispatch(
        &self,
        request: &RequestDescriptor<'_>,
    ) -> Result<ApiGatewayProxyResponse, ApiError> {
        match Route::resolve(&request.method, request.id) {
            Route::List => self.list_todos().await,
            Route::Create => self.create_todo(request).await,
            Route::Get(id) => self.get_todo(id).await,
            Route::Update(id) => self.update_todo(id, request).await,
            Route::Delete(id) => self.delete_todo(id).await,
            Route::Unsupported => Err(ApiError::Unsupported {
                method: request.method.clone(),
                path: request.path.map(str::to_string),
            }),
        }
    }

    async fn list_todos(&self) -> Result<ApiGatewayProxyResponse, ApiError> {
        let todos = self.store.scan_all().await?;
        info!(count = todos.len(), "Listed todos");

        Ok(ApiGatewayProxyResponse::json(200, json!({ "todos": todos })))
    }

    async fn create_todo(
        &self,
        request: &RequestDescriptor<'_>,
    ) -> Result<ApiGatewayProxyResponse, ApiError> {
        let payload = request.json_payload()?;
        let todo = TodoRecord::create(payload, Utc::now())?;

        // 同じ id が既にあっても上書きする
        self.store.put(&todo).await?;
        info!(id = todo.id(), "Created todo");

        Ok(ApiGatewayProxyResponse::json(
            201,
            json!({ "message": "todo created", "todo": todo }),
        ))
    }

    async fn get_todo(&self, id: &str) -> Result<ApiGatewayProxyResponse, ApiError> {
        let todo = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| ApiError::NotFound { id: id.to_string() })?;

        Ok(ApiGatewayProxyResponse::json(200, json!({ "todo": todo })))
    }

    async fn update_todo(
        &self,
        id: &str,
        request: &RequestDescriptor<'_>,
    ) -> Result<ApiGatewayProxyResponse, ApiError> {
        let payload = request.json_payload()?;
        let patch = TodoPatch::from_payload(payload)?;

        let todo = self.store.update(id, &patch).await?;
        info!(id, fields = patch.len(), "Updated todo");

        Ok(ApiGatewayProxyResponse::json(
            200,
            json!({ "message": "todo updated", "todo": todo }),
        ))
    }

    async fn delete_todo(&self, id: &str) -> Result<ApiGatewayProxyResponse, ApiError> {
        self.store.delete(id).await?;
        info!(id, "Deleted todo");

        Ok(ApiGatewayProxyResponse::json(
            200,
            json!({ "message": "todo deleted", "id": id }),
        ))
    }
}
