// ==========================================
// SAP 订单报表导入 - 订单领域模型
// ==========================================
// 依据: ordenes_sap 表结构 + 报表列映射表
// 红线: OrderRecord 只为有订单号的行构造
// ==========================================

use crate::domain::types::{CanonicalField, UpsertAction};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// OrderRecord - 规范化后的订单记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub order_number: String,                    // 订单号（业务主键）
    pub notice_number: Option<String>,           // 通知单号
    pub start_date: Option<NaiveDate>,           // 开始日期
    pub short_text: String,                      // 短文本
    pub technical_location: Option<String>,      // 技术位置
    pub responsible_work_center: Option<String>, // 负责工作中心
    pub author: String,                          // 创建人
    pub user_status: String,                     // 用户状态
    pub system_status: Option<String>,           // 系统状态
    pub actual_cost: Option<f64>,                // 实际成本（默认 0）
    pub total_general: Option<f64>,              // 总计（默认 0）
}

impl OrderRecord {
    /// 仅有订单号、其余字段为空的记录
    pub fn with_order_number(order_number: impl Into<String>) -> Self {
        Self {
            order_number: order_number.into(),
            notice_number: None,
            start_date: None,
            short_text: String::new(),
            technical_location: None,
            responsible_work_center: None,
            author: String::new(),
            user_status: String::new(),
            system_status: None,
            actual_cost: Some(0.0),
            total_general: Some(0.0),
        }
    }
}

// ==========================================
// FieldWarning - 字段级解析告警
// ==========================================
// 非致命：字段取空/默认值，行照常进入后续阶段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldWarning {
    pub field: CanonicalField, // 告警字段
    pub raw_value: String,     // 原始单元格文本
    pub message: String,       // 告警描述
}

impl FieldWarning {
    pub fn new(
        field: CanonicalField,
        raw_value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field,
            raw_value: raw_value.into(),
            message: message.into(),
        }
    }
}

// ==========================================
// UpsertOutcome - 单条记录落库结果
// ==========================================
// data_index: 表头下方的数据行下标（从 0 开始）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsertOutcome {
    pub data_index: usize,
    pub order_number: String,
    pub action: UpsertAction,
    pub error_message: Option<String>, // 仅 Failed 时存在
}

impl UpsertOutcome {
    pub fn inserted(data_index: usize, order_number: impl Into<String>) -> Self {
        Self {
            data_index,
            order_number: order_number.into(),
            action: UpsertAction::Inserted,
            error_message: None,
        }
    }

    pub fn updated(data_index: usize, order_number: impl Into<String>) -> Self {
        Self {
            data_index,
            order_number: order_number.into(),
            action: UpsertAction::Updated,
            error_message: None,
        }
    }

    pub fn failed(
        data_index: usize,
        order_number: impl Into<String>,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            data_index,
            order_number: order_number.into(),
            action: UpsertAction::Failed,
            error_message: Some(error_message.into()),
        }
    }

}

// ==========================================
// RowFailure - 行级失败明细
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFailure {
    pub sheet_row: usize,     // 用户可见行号（已按表头偏移换算）
    pub order_number: String, // 订单号
    pub error: String,        // 失败原因
}

// ==========================================
// RowWarning - 行级告警明细（仅提示）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowWarning {
    pub sheet_row: usize,
    pub order_number: String,
    pub field: String,
    pub message: String,
}

// ==========================================
// BatchOutcome - 单次导入汇总结果
// ==========================================
// 用途: 导入调用返回值（不落库）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub header_row: usize,          // 表头所在行下标（表头偏移）
    pub rows_processed: usize,      // 进入落库阶段的行数
    pub inserted: usize,            // 新增数
    pub updated: usize,             // 更新数
    pub skipped_rows: usize,        // 因订单号为空被剔除的行数
    pub failures: Vec<RowFailure>,  // 失败明细（按表内顺序）
    pub warnings: Vec<RowWarning>,  // 字段告警明细（按表内顺序）
    pub absent_columns: Vec<String>, // 按 TREAT_AS_ABSENT 视为空列的必填列
}

// ==========================================
// ImportReport - 单次导入调用的完整报告
// ==========================================
// batch_id 仅用于日志关联，不落库
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub batch_id: String,
    pub file_name: String,
    pub outcome: BatchOutcome,
    pub elapsed_ms: u64,
}
