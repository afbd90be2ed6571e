// ==========================================
// SAP 订单报表导入 - 配置管理器
// ==========================================
// 职责: 导入策略的加载、查询、覆写
// 存储: config_kv 表 (key-value)
// 说明: 缺失键取默认值；无法识别的值在读取时报配置错误
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::db::open_sqlite_connection;
use crate::domain::{FieldWarningPolicy, MissingColumnPolicy, NumericFallback};
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::info;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 从 config_kv 表读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入配置值（存在则覆写）
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at",
            params![key, value],
        )?;
        Ok(())
    }

    /// 用启动时给定的覆盖项写入导入策略（先校验，全部合法才写入）
    ///
    /// # 返回
    /// - Ok(usize): 写入条数
    /// - Err(ConfigReadError): 键未知或值无法识别
    pub fn apply_overrides(&self, overrides: &[(String, String)]) -> ImportResult<usize> {
        for (key, value) in overrides {
            validate_option(key, value)?;
        }

        for (key, value) in overrides {
            self.set_config_value(key, value.trim())?;
            info!(config_key = %key, value = %value, "导入策略已覆写");
        }
        Ok(overrides.len())
    }

    fn get_option<T>(&self, key: &str) -> ImportResult<T>
    where
        T: FromStr<Err = String> + Default,
    {
        let value = self
            .get_config_value(key)
            .map_err(|e| ImportError::ConfigReadError {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        match value {
            None => Ok(T::default()),
            Some(raw) => parse_option(key, &raw),
        }
    }
}

fn parse_option<T>(key: &str, raw: &str) -> ImportResult<T>
where
    T: FromStr<Err = String>,
{
    raw.parse::<T>().map_err(|message| ImportError::ConfigReadError {
        key: key.to_string(),
        message,
    })
}

/// 校验单个导入策略键值
pub fn validate_option(key: &str, value: &str) -> ImportResult<()> {
    match key {
        config_keys::NUMERIC_FALLBACK => parse_option::<NumericFallback>(key, value).map(|_| ()),
        config_keys::MISSING_REQUIRED_COLUMNS => {
            parse_option::<MissingColumnPolicy>(key, value).map(|_| ())
        }
        config_keys::FIELD_WARNING_POLICY => {
            parse_option::<FieldWarningPolicy>(key, value).map(|_| ())
        }
        _ => Err(ImportError::ConfigReadError {
            key: key.to_string(),
            message: "未知的配置键".to_string(),
        }),
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
impl ImportConfigReader for ConfigManager {
    fn get_numeric_fallback(&self) -> ImportResult<NumericFallback> {
        self.get_option(config_keys::NUMERIC_FALLBACK)
    }

    fn get_missing_column_policy(&self) -> ImportResult<MissingColumnPolicy> {
        self.get_option(config_keys::MISSING_REQUIRED_COLUMNS)
    }

    fn get_field_warning_policy(&self) -> ImportResult<FieldWarningPolicy> {
        self.get_option(config_keys::FIELD_WARNING_POLICY)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 数值回退策略: ZERO / NULL
    pub const NUMERIC_FALLBACK: &str = "import.numeric_fallback";

    // 必填列缺失策略: ABORT / TREAT_AS_ABSENT
    pub const MISSING_REQUIRED_COLUMNS: &str = "import.missing_required_columns";

    // 字段告警处理策略: KEEP / REJECT_ROW
    pub const FIELD_WARNING_POLICY: &str = "import.field_warning_policy";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ensure_schema;
    use crate::domain::ImportOptions;

    fn setup_manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_defaults_when_keys_absent() {
        let manager = setup_manager();
        assert_eq!(manager.load_import_options().unwrap(), ImportOptions::default());
    }

    #[test]
    fn test_set_and_load_options() {
        let manager = setup_manager();
        manager
            .set_config_value(config_keys::NUMERIC_FALLBACK, "NULL")
            .unwrap();
        manager
            .set_config_value(config_keys::FIELD_WARNING_POLICY, "REJECT_ROW")
            .unwrap();

        let options = manager.load_import_options().unwrap();
        assert_eq!(options.numeric_fallback, NumericFallback::Null);
        assert_eq!(options.missing_required_columns, MissingColumnPolicy::Abort);
        assert_eq!(options.field_warning_policy, FieldWarningPolicy::RejectRow);
    }

    #[test]
    fn test_unknown_value_is_config_error() {
        let manager = setup_manager();
        manager
            .set_config_value(config_keys::MISSING_REQUIRED_COLUMNS, "IGNORE")
            .unwrap();

        let err = manager.load_import_options().unwrap_err();
        assert!(matches!(
            err,
            ImportError::ConfigReadError { ref key, .. }
                if key == config_keys::MISSING_REQUIRED_COLUMNS
        ));
    }

    #[test]
    fn test_apply_overrides_validates_first() {
        let manager = setup_manager();
        let overrides = vec![
            (config_keys::NUMERIC_FALLBACK.to_string(), "NULL".to_string()),
            (config_keys::FIELD_WARNING_POLICY.to_string(), "SOMETIMES".to_string()),
        ];

        assert!(manager.apply_overrides(&overrides).is_err());
        // 校验失败时不写入任何一项
        assert_eq!(
            manager.get_config_value(config_keys::NUMERIC_FALLBACK).unwrap(),
            None
        );

        let overrides = vec![(
            config_keys::MISSING_REQUIRED_COLUMNS.to_string(),
            " treat_as_absent ".to_string(),
        )];
        assert_eq!(manager.apply_overrides(&overrides).unwrap(), 1);
        assert_eq!(
            manager.get_missing_column_policy().unwrap(),
            MissingColumnPolicy::TreatAsAbsent
        );
    }
}
