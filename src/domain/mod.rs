// ==========================================
// SAP 订单报表导入 - 领域模型层
// ==========================================
// 职责: 定义订单记录、导入结果与策略类型
// 红线: 不含数据访问逻辑,不含解析逻辑
// ==========================================

pub mod order;
pub mod types;

// 重导出核心类型
pub use order::{
    BatchOutcome, FieldWarning, ImportReport, OrderRecord, RowFailure, RowWarning,
    UpsertOutcome,
};
pub use types::{
    CanonicalField, FieldWarningPolicy, ImportOptions, MissingColumnPolicy, NumericFallback,
    UpsertAction,
};
