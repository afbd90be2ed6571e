// ==========================================
// SAP 订单报表导入 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: 结构性错误（整批中止，客户端责任）/ 连接错误（整批中止，服务端责任）
// 说明: 单条记录的落库失败不是 ImportError，记录在 BatchOutcome.failures
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.xlsm）")]
    InvalidFormat(String),

    #[error("Excel 解析失败: {0}")]
    UnreadableWorkbook(String),

    // ===== 表结构错误 =====
    #[error("未找到表头行: 没有任何一行同时包含必填列名")]
    HeaderNotFound,

    #[error("缺少必填列: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    // ===== 数据库错误 =====
    #[error("数据库连接失败: {0}")]
    Connectivity(String),

    // ===== 配置错误 =====
    #[error("配置读取失败 (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 是否属于调用方（上传文件）责任的结构性错误
    pub fn is_client_fault(&self) -> bool {
        matches!(
            self,
            ImportError::InvalidFormat(_)
                | ImportError::UnreadableWorkbook(_)
                | ImportError::HeaderNotFound
                | ImportError::MissingColumns(_)
        )
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::UnreadableWorkbook(err.to_string())
    }
}

// 实现 From<calamine::XlsxError>
impl From<calamine::XlsxError> for ImportError {
    fn from(err: calamine::XlsxError) -> Self {
        ImportError::UnreadableWorkbook(err.to_string())
    }
}

// 实现 From<calamine::XlsError>
impl From<calamine::XlsError> for ImportError {
    fn from(err: calamine::XlsError) -> Self {
        ImportError::UnreadableWorkbook(err.to_string())
    }
}

// 实现 From<RepositoryError>
// 记录级错误已在对账阶段消化，能传到这里的只剩连接类/内部错误
impl From<RepositoryError> for ImportError {
    fn from(err: RepositoryError) -> Self {
        if err.is_connectivity() {
            ImportError::Connectivity(err.to_string())
        } else {
            ImportError::InternalError(err.to_string())
        }
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message_lists_all() {
        let err = ImportError::MissingColumns(vec!["Autor".to_string(), "StatUsu".to_string()]);
        assert_eq!(err.to_string(), "缺少必填列: Autor, StatUsu");
        assert!(err.is_client_fault());
    }

    #[test]
    fn test_connectivity_is_server_fault() {
        let err: ImportError = RepositoryError::LockError("poisoned".to_string()).into();
        assert!(matches!(err, ImportError::Connectivity(_)));
        assert!(!err.is_client_fault());
    }
}
