// ==========================================
// SAP 订单报表导入 - 结果汇总器
// ==========================================
// 职责: 计数 + 失败/告警明细（数据行下标 → 用户可见行号）
// 说明: 明细按表内顺序，而非落库返回顺序
// ==========================================

use crate::domain::{BatchOutcome, RowFailure, RowWarning, UpsertAction, UpsertOutcome};
use crate::importer::record_validator::IndexedWarning;

/// 用户可见行号 = 表头偏移 + 数据行下标 + 1
pub fn sheet_row(header_offset: usize, data_index: usize) -> usize {
    header_offset + data_index + 1
}

pub struct ResultAggregator {
    header_offset: usize,
}

impl ResultAggregator {
    pub fn new(header_offset: usize) -> Self {
        Self { header_offset }
    }

    /// 汇总批次结果
    ///
    /// # 参数
    /// - outcomes: 全部已处理行的结果（落库结果 + 被拒绝行），顺序不限
    /// - warnings: 字段告警
    /// - skipped_rows: 无订单号被剔除的行数
    pub fn aggregate(
        &self,
        mut outcomes: Vec<UpsertOutcome>,
        mut warnings: Vec<IndexedWarning>,
        skipped_rows: usize,
    ) -> BatchOutcome {
        outcomes.sort_by_key(|o| o.data_index);
        warnings.sort_by_key(|w| w.data_index);

        let mut batch = BatchOutcome {
            header_row: self.header_offset,
            rows_processed: outcomes.len(),
            skipped_rows,
            ..Default::default()
        };

        for outcome in outcomes {
            match outcome.action {
                UpsertAction::Inserted => batch.inserted += 1,
                UpsertAction::Updated => batch.updated += 1,
                UpsertAction::Failed => batch.failures.push(RowFailure {
                    sheet_row: sheet_row(self.header_offset, outcome.data_index),
                    order_number: outcome.order_number,
                    error: outcome.error_message.unwrap_or_default(),
                }),
            }
        }

        batch.warnings = warnings
            .into_iter()
            .map(|w| RowWarning {
                sheet_row: sheet_row(self.header_offset, w.data_index),
                order_number: w.order_number,
                field: w.warning.field.to_string(),
                message: w.warning.message,
            })
            .collect();

        batch
    }
}
