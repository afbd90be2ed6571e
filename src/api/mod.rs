// ==========================================
// SAP 订单报表导入 - API 层
// ==========================================
// 职责: 导入调用契约 + 错误分界（客户端/服务端）
// ==========================================

pub mod error;
pub mod import_api;

pub use error::{ApiError, ApiResult};
pub use import_api::{FailureDto, HealthResponse, ImportApi, ImportApiResponse, WarningDto};
