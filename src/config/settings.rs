// ==========================================
// SAP 订单报表导入 - 进程级配置
// ==========================================
// 来源: 环境变量（启动时先加载 .env）
// 说明: 导入策略本身存放在 config_kv，这里只收集启动时的覆盖项
// ==========================================

use crate::config::config_manager::config_keys;
use anyhow::{bail, Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "SAP_IMPORT_DB_PATH";
pub const ENV_BIND_ADDR: &str = "SAP_IMPORT_BIND_ADDR";
pub const ENV_MAX_UPLOAD_MB: &str = "MAX_UPLOAD_MB";
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

/// 环境变量 → config_kv 键
const IMPORT_OVERRIDE_VARS: [(&str, &str); 3] = [
    ("SAP_IMPORT_NUMERIC_FALLBACK", config_keys::NUMERIC_FALLBACK),
    ("SAP_IMPORT_MISSING_COLUMNS", config_keys::MISSING_REQUIRED_COLUMNS),
    ("SAP_IMPORT_FIELD_WARNINGS", config_keys::FIELD_WARNING_POLICY),
];

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_MAX_UPLOAD_MB: usize = 20;

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub db_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub max_upload_mb: usize,
    pub log_format: LogFormat,
    pub import_overrides: Vec<(String, String)>, // (config_kv 键, 值)
}

impl AppSettings {
    /// 从环境变量加载（存在 .env 时先加载）
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let db_path = non_empty(ENV_DB_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);

        let bind_addr = non_empty(ENV_BIND_ADDR)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .with_context(|| format!("{} 不是合法的监听地址", ENV_BIND_ADDR))?;

        let max_upload_mb = match non_empty(ENV_MAX_UPLOAD_MB) {
            Some(raw) => raw
                .parse::<usize>()
                .with_context(|| format!("{} 必须是正整数: {}", ENV_MAX_UPLOAD_MB, raw))?,
            None => DEFAULT_MAX_UPLOAD_MB,
        };
        if max_upload_mb == 0 {
            bail!("{} 必须大于 0", ENV_MAX_UPLOAD_MB);
        }

        let log_format = match non_empty(ENV_LOG_FORMAT).map(|v| v.to_lowercase()) {
            None => LogFormat::Text,
            Some(v) if v == "text" => LogFormat::Text,
            Some(v) if v == "json" => LogFormat::Json,
            Some(other) => bail!("{} 应为 text 或 json: {}", ENV_LOG_FORMAT, other),
        };

        let import_overrides = IMPORT_OVERRIDE_VARS
            .iter()
            .filter_map(|(var, key)| non_empty(*var).map(|value| (key.to_string(), value)))
            .collect();

        Ok(Self {
            db_path,
            bind_addr,
            max_upload_mb,
            log_format,
            import_overrides,
        })
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

/// 默认数据库路径: 用户数据目录/sap-order-import/ordenes_sap.db
pub fn default_db_path() -> PathBuf {
    match dirs::data_dir() {
        Some(data_dir) => data_dir.join("sap-order-import").join("ordenes_sap.db"),
        None => PathBuf::from("./ordenes_sap.db"),
    }
}
