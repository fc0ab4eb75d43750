use infrastructure::{DynamoDbClient, DynamoTodoRepository};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use shared::telemetry::{create_lambda_span, LambdaTraceContext};
use shared::{init_tracing, Config};
use todo_handler::{ApiGatewayProxyRequest, ApiGatewayProxyResponse, Router};
use tracing::{error, info, Instrument};

/// Lambda 関数のメインハンドラー
async fn function_handler(
    router: &Router<DynamoTodoRepository>,
    event: LambdaEvent<ApiGatewayProxyRequest>,
) -> Result<ApiGatewayProxyResponse, Error> {
    let trace_context = LambdaTraceContext::from_lambda_context(&event.context);
    let span = create_lambda_span("todo-handler", &trace_context);

    Ok(router.handle(&event.payload).instrument(span).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing()?;

    let config = Config::from_env();
    // テーブル名がなくても起動は続ける（各リクエストが 500 を返す）
    if config.table_name.is_none() {
        error!("TABLE_NAME environment variable is required.");
    }

    let db_client = DynamoDbClient::new(&config).await;
    let router = Router::new(DynamoTodoRepository::new(db_client))
        .with_cors_allow_origin(config.cors_allow_origin.clone());

    info!(
        table = config.table_name.as_deref().unwrap_or("<unset>"),
        region = %config.aws_region,
        "todo-handler initialized"
    );

    let router = &router;
    run(service_fn(move |event: LambdaEvent<ApiGatewayProxyRequest>| {
        function_handler(router, event)
    }))
    .await
}
