// ==========================================
// SAP 订单报表导入 - 对账落库
// ==========================================
// 职责: 逐条 upsert + 结果分类 + 单条失败隔离
// 红线: 单条失败绝不中止整批；连接级错误中止并上报
// ==========================================

use crate::domain::{UpsertAction, UpsertOutcome};
use crate::importer::error::ImportResult;
use crate::importer::record_validator::ValidatedRow;
use crate::repository::order_repo::OrderStore;
use tracing::{error, warn};

pub struct Reconciler;

impl Reconciler {
    /// 按表内顺序落库
    ///
    /// # 返回
    /// - Ok(Vec<UpsertOutcome>): 与输入一一对应
    /// - Err(Connectivity): 存储不可用，整批未提交
    pub fn reconcile(
        &self,
        store: &dyn OrderStore,
        rows: &[ValidatedRow],
    ) -> ImportResult<Vec<UpsertOutcome>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let records: Vec<_> = rows.iter().map(|r| r.record.clone()).collect();
        let results = store.upsert_batch(&records).map_err(|e| {
            error!(error = %e, "批量落库中止");
            e
        })?;

        let outcomes = rows
            .iter()
            .zip(results)
            .map(|(row, result)| match result {
                Ok(UpsertAction::Updated) => {
                    UpsertOutcome::updated(row.data_index, &row.record.order_number)
                }
                Ok(_) => UpsertOutcome::inserted(row.data_index, &row.record.order_number),
                Err(e) => {
                    warn!(
                        order_number = %row.record.order_number,
                        data_index = row.data_index,
                        error = %e,
                        "订单落库失败"
                    );
                    UpsertOutcome::failed(row.data_index, &row.record.order_number, e.to_string())
                }
            })
            .collect();

        Ok(outcomes)
    }
}
