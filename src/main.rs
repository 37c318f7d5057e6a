//! daytab server binary
//!
//! 設定を読み込み、日程表ビューアのWebサーバーを起動する。
//! 必須の認証情報が欠落している場合は、リクエストを受け付ける前に
//! エラーを報告して停止する。

use tracing::info;

use daytab::{create_router, AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter("daytab=info,tower_http=debug")
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // 設定は起動時に1回だけ読み込む。認証情報の欠落はここで致命的になる
    let config = AppConfig::from_env()?;
    info!(model = %config.model, "configuration loaded");

    let state = AppState::new(&config);
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
