use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::Client;
use domain::TodoError;
use shared::Config;

/// プロセス起動時に一度だけ作成し、呼び出し間で使い回す DynamoDB クライアント
#[derive(Clone)]
pub struct DynamoDbClient {
    client: Client,
    table_name: Option<String>,
}

impl DynamoDbClient {
    pub async fn new(config: &Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.aws_region.clone()));

        if let Some(endpoint) = &config.dynamodb_endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let aws_config = loader.load().await;

        Self::from_client(Client::new(&aws_config), config.table_name.clone())
    }

    pub fn from_client(client: Client, table_name: Option<String>) -> Self {
        Self { client, table_name }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// テーブル名が未設定の場合は設定エラーを返す
    pub fn table_name(&self) -> Result<&str, TodoError> {
        self.table_name.as_deref().ok_or_else(|| {
            TodoError::Configuration("TABLE_NAME environment variable is required.".to_string())
        })
    }
}
