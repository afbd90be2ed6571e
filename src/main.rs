// ==========================================
// SAP 订单报表导入 - HTTP 服务入口
// ==========================================
// 启动顺序: 环境配置 → 日志 → 数据库/导入策略 → 监听
// ==========================================

use anyhow::{Context, Result};
use sap_order_import::app::{build_router, AppState};
use sap_order_import::config::AppSettings;
use sap_order_import::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = AppSettings::from_env()?;
    logging::init(settings.log_format);

    tracing::info!("==================================================");
    tracing::info!("{}", sap_order_import::APP_NAME);
    tracing::info!("系统版本: {}", sap_order_import::VERSION);
    tracing::info!("==================================================");

    let state = AppState::new(&settings).context("无法初始化AppState")?;
    tracing::info!("AppState初始化成功");

    let app = build_router(state, settings.max_upload_bytes());

    let listener = tokio::net::TcpListener::bind(settings.bind_addr)
        .await
        .with_context(|| format!("无法监听地址: {}", settings.bind_addr))?;
    tracing::info!(
        bind_addr = %settings.bind_addr,
        max_upload_mb = settings.max_upload_mb,
        "HTTP 服务已启动"
    );

    axum::serve(listener, app).await.context("HTTP 服务异常退出")?;
    Ok(())
}
