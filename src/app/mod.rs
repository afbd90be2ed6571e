// ==========================================
// SAP 订单报表导入 - 应用层
// ==========================================
// 职责: axum 集成，把 HTTP 请求接到 API 层
// ==========================================

pub mod routes;
pub mod state;

// 重导出
pub use routes::build_router;
pub use state::AppState;
