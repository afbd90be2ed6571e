// ==========================================
// SAP 订单报表导入 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: 记录级错误（约束/类型，单条失败）/ 连接级错误（整批中止）
// ==========================================

use rusqlite::ErrorCode;
use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 数据库错误 =====
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    #[error("约束违反: {0}")]
    ConstraintViolation(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RepositoryError {
    /// 是否属于连接级错误（存储不可用，继续处理后续记录没有意义）
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            RepositoryError::LockError(_) | RepositoryError::DatabaseConnectionError(_)
        )
    }
}

// 实现 From<rusqlite::Error>
// 按 SQLite 错误码分类，而不是匹配错误消息文本
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref failure, ref msg) => {
                let detail = msg.clone().unwrap_or_else(|| err.to_string());
                match failure.code {
                    ErrorCode::ConstraintViolation => RepositoryError::ConstraintViolation(detail),
                    ErrorCode::DatabaseBusy
                    | ErrorCode::DatabaseLocked
                    | ErrorCode::SystemIoFailure
                    | ErrorCode::CannotOpen
                    | ErrorCode::NotADatabase
                    | ErrorCode::DatabaseCorrupt
                    | ErrorCode::DiskFull => RepositoryError::DatabaseConnectionError(detail),
                    _ => RepositoryError::DatabaseQueryError(detail),
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::ffi;

    fn sqlite_failure(code: i32, msg: &str) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(ffi::Error::new(code), Some(msg.to_string()))
    }

    #[test]
    fn test_constraint_is_record_level() {
        let err: RepositoryError =
            sqlite_failure(ffi::SQLITE_CONSTRAINT_CHECK, "CHECK constraint failed: autor").into();
        assert!(matches!(err, RepositoryError::ConstraintViolation(_)));
        assert!(!err.is_connectivity());
    }

    #[test]
    fn test_busy_and_io_are_connectivity() {
        let codes = [
            ffi::SQLITE_BUSY,
            ffi::SQLITE_LOCKED,
            ffi::SQLITE_IOERR,
            ffi::SQLITE_CANTOPEN,
        ];
        for code in codes {
            let err: RepositoryError = sqlite_failure(code, "unavailable").into();
            assert!(err.is_connectivity(), "code {} should be connectivity", code);
        }
        assert!(RepositoryError::LockError("poisoned".to_string()).is_connectivity());
    }

    #[test]
    fn test_no_rows_is_not_found() {
        let err: RepositoryError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }
}
