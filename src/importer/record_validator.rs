// ==========================================
// SAP 订单报表导入 - 记录筛选器
// ==========================================
// 职责: 剔除无订单号行 / 批内重复订单号提示 / 按告警策略拒绝行
// 说明: 剔除不是错误，不计入 rowsProcessed，也不进入 failures
// ==========================================

use crate::domain::{
    CanonicalField, FieldWarning, FieldWarningPolicy, OrderRecord, UpsertOutcome,
};
use crate::importer::data_cleaner::NormalizedRecord;
use crate::importer::result_aggregator::sheet_row;
use std::collections::HashMap;
use tracing::debug;

/// 规范化阶段的输出（data_index 为表头下方的数据行下标）
#[derive(Debug, Clone, PartialEq)]
pub struct RowCandidate {
    pub data_index: usize,
    pub normalized: Option<NormalizedRecord>,
}

/// 通过筛选、待落库的记录
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRow {
    pub data_index: usize,
    pub record: OrderRecord,
}

/// 附带行定位信息的告警
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedWarning {
    pub data_index: usize,
    pub order_number: String,
    pub warning: FieldWarning,
}

/// 筛选结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationOutput {
    pub accepted: Vec<ValidatedRow>,    // 按表内顺序
    pub rejected: Vec<UpsertOutcome>,   // RejectRow 策略下被拒绝的行
    pub warnings: Vec<IndexedWarning>,  // 按表内顺序
    pub skipped_rows: usize,            // 无订单号行数
}

impl ValidationOutput {
    /// 进入处理的行数（落库 + 被拒绝）
    pub fn rows_processed(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }
}

// ==========================================
// RecordValidator - 记录筛选器
// ==========================================
pub struct RecordValidator {
    header_offset: usize,
    policy: FieldWarningPolicy,
}

impl RecordValidator {
    pub fn new(header_offset: usize, policy: FieldWarningPolicy) -> Self {
        Self {
            header_offset,
            policy,
        }
    }

    pub fn validate(&self, candidates: Vec<RowCandidate>) -> ValidationOutput {
        let mut output = ValidationOutput::default();
        // 订单号 → 首次出现的数据行下标
        let mut first_seen: HashMap<String, usize> = HashMap::new();

        for candidate in candidates {
            let Some(NormalizedRecord { record, warnings }) = candidate.normalized else {
                output.skipped_rows += 1;
                continue;
            };
            let data_index = candidate.data_index;
            let order_number = record.order_number.clone();

            let has_field_warnings = !warnings.is_empty();
            let rejection = if has_field_warnings && self.policy == FieldWarningPolicy::RejectRow {
                Some(
                    warnings
                        .iter()
                        .map(|w| w.message.as_str())
                        .collect::<Vec<_>>()
                        .join("; "),
                )
            } else {
                None
            };

            output
                .warnings
                .extend(warnings.into_iter().map(|warning| IndexedWarning {
                    data_index,
                    order_number: order_number.clone(),
                    warning,
                }));

            if let Some(message) = rejection {
                debug!(order_number = %order_number, data_index, "字段告警，按 REJECT_ROW 策略拒绝该行");
                output
                    .rejected
                    .push(UpsertOutcome::failed(data_index, order_number, message));
                continue;
            }

            match first_seen.get(&order_number) {
                Some(&first_index) => {
                    let first_row = sheet_row(self.header_offset, first_index);
                    output.warnings.push(IndexedWarning {
                        data_index,
                        order_number: order_number.clone(),
                        warning: FieldWarning::new(
                            CanonicalField::OrderNumber,
                            order_number.clone(),
                            format!("订单号与第 {} 行重复，以本行为准", first_row),
                        ),
                    });
                }
                None => {
                    first_seen.insert(order_number.clone(), data_index);
                }
            }

            output.accepted.push(ValidatedRow { data_index, record });
        }

        debug!(
            accepted = output.accepted.len(),
            rejected = output.rejected.len(),
            skipped = output.skipped_rows,
            "记录筛选完成"
        );
        output
    }
}
