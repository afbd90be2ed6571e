// ==========================================
// SAP 订单报表导入 - 配置层
// ==========================================
// 职责: 进程级配置（环境变量）+ 导入策略（config_kv 表）
// ==========================================

pub mod config_manager;
pub mod import_config_trait;
pub mod settings;

// 重导出核心配置类型
pub use config_manager::{config_keys, ConfigManager};
pub use import_config_trait::ImportConfigReader;
pub use settings::{AppSettings, LogFormat};
