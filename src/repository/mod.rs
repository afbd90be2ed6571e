// ==========================================
// SAP 订单报表导入 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供订单表访问接口，屏蔽数据库细节
// 约束: 所有查询使用参数化，防止 SQL 注入
// ==========================================

pub mod error;
pub mod order_repo;

// 重导出
pub use error::{RepositoryError, RepositoryResult};
pub use order_repo::{OrderEntity, OrderRepository, OrderStore};
