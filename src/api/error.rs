// ==========================================
// SAP 订单报表导入 - API层错误类型
// ==========================================
// 职责: 把导入/仓储错误转换为调用方可理解的结果
// 分界: 客户端责任（4xx，带具体原因）/ 服务端责任（5xx，只返回通用消息）
// ==========================================

use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// 服务端错误对外统一返回的消息
pub const GENERIC_SERVER_ERROR: &str = "内部错误";

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 客户端错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    UnsupportedFormat(String),

    #[error("上传内容超过大小限制: {0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    ImportError(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 服务端错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) | ApiError::ImportError(_) => StatusCode::BAD_REQUEST,
            ApiError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::DatabaseError(_) | ApiError::InternalError(_) | ApiError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 返回给调用方的消息（服务端错误不暴露内部细节）
    pub fn client_message(&self) -> String {
        if self.status_code().is_server_error() {
            GENERIC_SERVER_ERROR.to_string()
        } else {
            self.to_string()
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::InvalidFormat(_) => ApiError::UnsupportedFormat(err.to_string()),
            ImportError::UnreadableWorkbook(_)
            | ImportError::HeaderNotFound
            | ImportError::MissingColumns(_) => ApiError::ImportError(err.to_string()),
            ImportError::Connectivity(msg) => ApiError::DatabaseError(msg),
            ImportError::ConfigReadError { .. } | ImportError::InternalError(_) => {
                ApiError::InternalError(err.to_string())
            }
            ImportError::Other(e) => ApiError::Other(e),
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::Other(e) => ApiError::Other(e),
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            // 细节只进日志
            error!(error = %self, "请求处理失败");
        }

        let body = Json(json!({
            "status": "error",
            "message": self.client_message(),
        }));
        (status, body).into_response()
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
