// ==========================================
// SAP 订单报表导入 - 应用状态
// ==========================================
// 职责: 启动时创建一次存储句柄与 API 实例，供所有请求共享
// ==========================================

use crate::api::ImportApi;
use crate::config::{AppSettings, ConfigManager, ImportConfigReader};
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::importer::OrderImporterImpl;
use crate::repository::order_repo::OrderRepository;
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// 应用状态
#[derive(Clone)]
pub struct AppState {
    /// 导入API
    pub import_api: Arc<ImportApi>,
}

impl AppState {
    /// 按进程配置初始化
    ///
    /// # 步骤
    /// 1. 打开数据库（必要时创建目录），确保表结构
    /// 2. 写入环境变量给定的导入策略覆盖项，并校验一次
    /// 3. 组装导入器与 API
    pub fn new(settings: &AppSettings) -> Result<Self> {
        let db_path = settings.db_path.to_string_lossy().to_string();
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        ensure_parent_dir(&settings.db_path)?;
        let conn = open_sqlite_connection(&db_path)
            .with_context(|| format!("无法打开数据库: {}", db_path))?;
        ensure_schema(&conn).context("建表失败")?;
        let conn = Arc::new(Mutex::new(conn));

        let config = ConfigManager::from_connection(conn.clone());
        let applied = config
            .apply_overrides(&settings.import_overrides)
            .context("导入策略覆盖项无效")?;
        if applied > 0 {
            tracing::info!(applied, "已写入环境变量中的导入策略");
        }
        let options = config
            .load_import_options()
            .context("导入策略读取失败")?;
        tracing::info!(?options, "当前导入策略");

        Ok(Self::with_connection(conn))
    }

    /// 从已有连接组装（连接需已建表）
    pub fn with_connection(conn: Arc<Mutex<Connection>>) -> Self {
        let store = Arc::new(OrderRepository::from_connection(conn.clone()));
        let importer = Arc::new(OrderImporterImpl::with_excel_parser(
            ConfigManager::from_connection(conn),
        ));

        Self {
            import_api: Arc::new(ImportApi::new(importer, store)),
        }
    }
}

fn ensure_parent_dir(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("无法创建数据目录: {}", parent.display()))?;
        }
    }
    Ok(())
}
