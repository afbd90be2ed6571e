// ==========================================
// SAP 订单报表导入 - 核心库
// ==========================================
// 技术栈: axum + Rust + SQLite
// 系统定位: 把 SAP 导出的订单报表幂等地同步进订单表
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 导入策略与进程配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - HTTP 集成
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    CanonicalField, FieldWarningPolicy, ImportOptions, MissingColumnPolicy, NumericFallback,
    UpsertAction,
};

// 领域实体
pub use domain::{BatchOutcome, ImportReport, OrderRecord, RowFailure, RowWarning};

// 导入
pub use importer::{ImportError, OrderImporter, OrderImporterImpl};

// 仓储
pub use repository::{OrderRepository, OrderStore, RepositoryError};

// API
pub use api::{ApiError, ImportApi, ImportApiResponse};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "SAP 订单报表导入";
