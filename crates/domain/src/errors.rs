use thiserror::Error;

/// ToDo 操作全体で使用されるエラー型
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TodoError {
    // 入力エラー（400 相当）
    #[error("{0}")]
    Validation(String),

    #[error("Todo not found: {0}")]
    NotFound(String),

    // 起動時設定の不備
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("DynamoDB error: {0}")]
    DynamoDb(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}
