use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::ApiError;

/// API Gateway プロキシリクエスト構造体
///
/// ルーティングに必要なフィールドのみを受け取り、それ以外は無視する。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiGatewayProxyRequest {
    pub http_method: Option<String>,
    pub path: Option<String>,
    pub path_parameters: Option<HashMap<String, String>>,
    pub body: Option<String>,
    pub is_base64_encoded: Option<bool>,
}

impl ApiGatewayProxyRequest {
    /// ルーターに渡す正規化済みのリクエストを作成
    pub fn descriptor(&self) -> RequestDescriptor<'_> {
        let method = self
            .http_method
            .as_deref()
            .unwrap_or_default()
            .to_uppercase();

        // 空文字の id は未指定として扱う
        let id = self
            .path_parameters
            .as_ref()
            .and_then(|params| params.get("id"))
            .map(String::as_str)
            .filter(|id| !id.is_empty());

        RequestDescriptor {
            method,
            id,
            path: self.path.as_deref(),
            body: self.body.as_deref(),
            is_base64_encoded: self.is_base64_encoded.unwrap_or(false),
        }
    }
}

/// (メソッド, id?, ボディ?) に正規化したリクエスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor<'a> {
    pub method: String,
    pub id: Option<&'a str>,
    pub path: Option<&'a str>,
    pub body: Option<&'a str>,
    pub is_base64_encoded: bool,
}

impl<'a> RequestDescriptor<'a> {
    pub fn new(method: &str, id: Option<&'a str>, body: Option<&'a str>) -> Self {
        Self {
            method: method.to_uppercase(),
            id: id.filter(|id| !id.is_empty()),
            path: None,
            body,
            is_base64_encoded: false,
        }
    }

    /// ボディを JSON として解釈する（未指定・空文字は `{}`）
    ///
    /// 不正な JSON や base64 はバックエンド障害と同様に 500 として扱う。
    pub fn json_payload(&self) -> Result<Value, ApiError> {
        let decoded;
        let text = match self.body {
            None => return Ok(Value::Object(Map::new())),
            Some(body) if self.is_base64_encoded => {
                let bytes = STANDARD
                    .decode(body)
                    .map_err(|e| ApiError::Internal(format!("Invalid base64 body: {e}")))?;
                decoded = String::from_utf8(bytes)
                    .map_err(|e| ApiError::Internal(format!("Invalid UTF-8 body: {e}")))?;
                decoded.as_str()
            }
            Some(body) => body,
        };

        if text.is_empty() {
            return Ok(Value::Object(Map::new()));
        }

        Ok(serde_json::from_str(text)?)
    }
}
