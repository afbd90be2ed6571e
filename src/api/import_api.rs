// ==========================================
// 订单报表导入API
// ==========================================
// 职责: 封装导入调用，输出 {status, rowsProcessed, inserted, updated, failures, ...}
// 说明: 导入流程是同步的，在阻塞线程池中执行
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::{ImportReport, RowFailure, RowWarning};
use crate::importer::OrderImporter;
use crate::repository::order_repo::{OrderEntity, OrderStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 失败行明细
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureDto {
    pub sheet_row: usize,
    pub order_number: String,
    pub error: String,
}

impl From<RowFailure> for FailureDto {
    fn from(f: RowFailure) -> Self {
        Self {
            sheet_row: f.sheet_row,
            order_number: f.order_number,
            error: f.error,
        }
    }
}

/// 字段告警明细
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarningDto {
    pub sheet_row: usize,
    pub order_number: String,
    pub field: String,
    pub message: String,
}

impl From<RowWarning> for WarningDto {
    fn from(w: RowWarning) -> Self {
        Self {
            sheet_row: w.sheet_row,
            order_number: w.order_number,
            field: w.field,
            message: w.message,
        }
    }
}

/// 导入API响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportApiResponse {
    /// 固定为 "ok"（失败走 ApiError）
    pub status: String,
    pub file_name: String,
    /// 进入处理的行数（不含无订单号行）
    pub rows_processed: usize,
    pub inserted: usize,
    pub updated: usize,
    /// 失败明细（按表内顺序）
    pub failures: Vec<FailureDto>,
    pub batch_id: String,
    /// 表头所在行下标
    pub header_row: usize,
    pub skipped_rows: usize,
    pub warnings: Vec<WarningDto>,
    /// 按 TREAT_AS_ABSENT 视为空列的必填列
    pub absent_columns: Vec<String>,
    pub elapsed_ms: u64,
}

impl From<ImportReport> for ImportApiResponse {
    fn from(report: ImportReport) -> Self {
        let outcome = report.outcome;
        Self {
            status: "ok".to_string(),
            file_name: report.file_name,
            rows_processed: outcome.rows_processed,
            inserted: outcome.inserted,
            updated: outcome.updated,
            failures: outcome.failures.into_iter().map(FailureDto::from).collect(),
            batch_id: report.batch_id,
            header_row: outcome.header_row,
            skipped_rows: outcome.skipped_rows,
            warnings: outcome.warnings.into_iter().map(WarningDto::from).collect(),
            absent_columns: outcome.absent_columns,
            elapsed_ms: report.elapsed_ms,
        }
    }
}

/// 健康检查响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub order_count: usize,
}

// ==========================================
// ImportApi
// ==========================================
pub struct ImportApi {
    importer: Arc<dyn OrderImporter>,
    store: Arc<dyn OrderStore>,
}

impl ImportApi {
    /// 创建新的ImportApi实例
    ///
    /// # 参数
    /// - importer: 订单导入器
    /// - store: 启动时创建的存储句柄（每次调用传入导入器）
    pub fn new(importer: Arc<dyn OrderImporter>, store: Arc<dyn OrderStore>) -> Self {
        Self { importer, store }
    }

    /// 导入订单报表
    ///
    /// # 参数
    /// - file_name: 上传的文件名
    /// - bytes: 文件内容
    ///
    /// # 返回
    /// - Ok(ImportApiResponse): 批次结果（单行失败在 failures 中）
    /// - Err(ApiError): 结构性错误（4xx）或服务端错误（5xx）
    pub async fn import_order_report(
        &self,
        file_name: String,
        bytes: Vec<u8>,
    ) -> ApiResult<ImportApiResponse> {
        let importer = Arc::clone(&self.importer);
        let store = Arc::clone(&self.store);

        let report = tokio::task::spawn_blocking(move || {
            importer.import_file(&file_name, &bytes, store.as_ref())
        })
        .await
        .map_err(|e| ApiError::InternalError(format!("导入任务异常终止: {}", e)))??;

        Ok(report.into())
    }

    /// 按订单号查询已导入的订单
    pub async fn get_order(&self, order_number: String) -> ApiResult<OrderEntity> {
        let store = Arc::clone(&self.store);
        let entity = tokio::task::spawn_blocking(move || {
            store
                .find_by_order_number(&order_number)
                .map(|found| (found, order_number))
        })
        .await
        .map_err(|e| ApiError::InternalError(format!("查询任务异常终止: {}", e)))??;

        match entity {
            (Some(order), _) => Ok(order),
            (None, order_number) => Err(ApiError::NotFound(format!("订单 {}", order_number))),
        }
    }

    /// 健康检查（确认存储可用）
    pub async fn health(&self) -> ApiResult<HealthResponse> {
        let store = Arc::clone(&self.store);
        let order_count = tokio::task::spawn_blocking(move || store.count_orders())
            .await
            .map_err(|e| ApiError::InternalError(format!("健康检查任务异常终止: {}", e)))??;

        Ok(HealthResponse {
            status: "ok".to_string(),
            version: crate::VERSION.to_string(),
            order_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BatchOutcome;

    #[test]
    fn test_response_serializes_camel_case() {
        let report = ImportReport {
            batch_id: "b-1".to_string(),
            file_name: "ordenes.xlsx".to_string(),
            outcome: BatchOutcome {
                header_row: 2,
                rows_processed: 3,
                inserted: 1,
                updated: 1,
                skipped_rows: 0,
                failures: vec![RowFailure {
                    sheet_row: 5,
                    order_number: "4000003".to_string(),
                    error: "约束违反: CHECK constraint failed".to_string(),
                }],
                warnings: vec![],
                absent_columns: vec!["Autor".to_string()],
            },
            elapsed_ms: 12,
        };

        let value = serde_json::to_value(ImportApiResponse::from(report)).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["rowsProcessed"], 3);
        assert_eq!(value["failures"][0]["sheetRow"], 5);
        assert_eq!(value["failures"][0]["orderNumber"], "4000003");
        assert_eq!(value["batchId"], "b-1");
        assert_eq!(value["headerRow"], 2);
        assert_eq!(value["fileName"], "ordenes.xlsx");
        assert_eq!(value["absentColumns"][0], "Autor");
    }
}
