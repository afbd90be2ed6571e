// ==========================================
// SAP 订单报表导入 - HTTP 路由
// ==========================================
// POST /importar-excel   multipart 上传（字段 file）
// GET  /health           存储可用性
// GET  /ordenes/:orden   查询单个已导入订单
// ==========================================

use crate::api::{ApiError, HealthResponse, ImportApiResponse};
use crate::app::state::AppState;
use crate::repository::order_repo::OrderEntity;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

/// 上传字段名
pub const UPLOAD_FIELD: &str = "file";

/// 构建路由
///
/// # 参数
/// - state: 应用状态
/// - max_upload_bytes: 请求体上限
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/importar-excel", post(import_excel))
        .route("/health", get(health))
        .route("/ordenes/:orden", get(get_order))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

/// POST /importar-excel
async fn import_excel(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ImportApiResponse>, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        tracing::debug!(file_name = %file_name, size_bytes = bytes.len(), "收到上传文件");

        let response = state
            .import_api
            .import_order_report(file_name, bytes.to_vec())
            .await?;
        return Ok(Json(response));
    }

    Err(ApiError::InvalidInput(format!(
        "缺少上传文件字段: {}",
        UPLOAD_FIELD
    )))
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::InvalidInput(format!("multipart 解析失败: {}", err.body_text()))
    }
}

/// GET /health
async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    state.import_api.health().await.map(Json)
}

/// GET /ordenes/:orden
async fn get_order(
    State(state): State<AppState>,
    Path(orden): Path<String>,
) -> Result<Json<OrderEntity>, ApiError> {
    state.import_api.get_order(orden).await.map(Json)
}
