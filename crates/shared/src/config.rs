use std::env;

pub const DEFAULT_AWS_REGION: &str = "ap-south-1";

/// 起動時に環境変数から読み込む設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// 未設定でも起動は継続する（各リクエストが 500 になる）
    pub table_name: Option<String>,
    pub aws_region: String,
    /// DynamoDB Local などに向けるためのエンドポイント上書き
    pub dynamodb_endpoint: Option<String>,
    /// 設定時のみ CORS ヘッダーを付与する
    pub cors_allow_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意のルックアップ関数から設定を組み立てる（空文字は未設定扱い）
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Config {
            table_name: get("TABLE_NAME"),
            aws_region: get("AWS_REGION").unwrap_or_else(|| DEFAULT_AWS_REGION.to_string()),
            dynamodb_endpoint: get("DYNAMODB_ENDPOINT"),
            cors_allow_origin: get("CORS_ALLOW_ORIGIN"),
        }
    }
}
