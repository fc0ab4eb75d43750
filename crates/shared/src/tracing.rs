use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// トレーシングサブスクライバーを初期化
/// ログレベルは RUST_LOG で制御する
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // 構造化ログ出力でCloudWatchに送信
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer().with_target(false).json(), // JSON形式でCloudWatchに出力
        )
        .with(EnvFilter::from_default_env())
        .try_init()?;

    Ok(())
}
