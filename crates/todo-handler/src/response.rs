use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

pub const CORS_ALLOW_METHODS: &str = "GET,POST,PUT,PATCH,DELETE,OPTIONS";
pub const CORS_ALLOW_HEADERS: &str = "Content-Type,Authorization";

/// API Gateway プロキシレスポンス構造体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayProxyResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    /// JSON エンコード済みの文字列
    pub body: String,
}

impl ApiGatewayProxyResponse {
    /// JSON レスポンスを作成
    pub fn json(status_code: u16, body: Value) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        Self {
            status_code,
            headers,
            body: body.to_string(),
        }
    }

    pub fn with_cors(mut self, allow_origin: &str) -> Self {
        self.headers.insert(
            "Access-Control-Allow-Origin".to_string(),
            allow_origin.to_string(),
        );
        self.headers.insert(
            "Access-Control-Allow-Methods".to_string(),
            CORS_ALLOW_METHODS.to_string(),
        );
        self.headers.insert(
            "Access-Control-Allow-Headers".to_string(),
            CORS_ALLOW_HEADERS.to_string(),
        );
        self
    }

    pub fn body_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}
