// ==========================================
// SAP 订单报表导入 - 领域类型定义
// ==========================================
// 依据: 订单报表列映射表（Orden / Aviso / Inic.extr. ...）
// 依据: 导入策略项（数值回退 / 必填列缺失 / 字段告警处理）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 标准字段 (Canonical Field)
// ==========================================
// 与 ordenes_sap 表列一一对应
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalField {
    OrderNumber,           // 订单号（业务主键）
    NoticeNumber,          // 通知单号
    StartDate,             // 开始日期
    ShortText,             // 短文本
    TechnicalLocation,     // 技术位置
    ResponsibleWorkCenter, // 负责工作中心
    Author,                // 创建人
    UserStatus,            // 用户状态
    SystemStatus,          // 系统状态
    ActualCost,            // 实际成本合计
    TotalGeneral,          // 总计（实际）
}

impl CanonicalField {
    /// 全部标准字段（按报表列顺序）
    pub const ALL: [CanonicalField; 11] = [
        CanonicalField::OrderNumber,
        CanonicalField::NoticeNumber,
        CanonicalField::StartDate,
        CanonicalField::ShortText,
        CanonicalField::TechnicalLocation,
        CanonicalField::ResponsibleWorkCenter,
        CanonicalField::Author,
        CanonicalField::UserStatus,
        CanonicalField::SystemStatus,
        CanonicalField::ActualCost,
        CanonicalField::TotalGeneral,
    ];
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CanonicalField::OrderNumber => "OrderNumber",
            CanonicalField::NoticeNumber => "NoticeNumber",
            CanonicalField::StartDate => "StartDate",
            CanonicalField::ShortText => "ShortText",
            CanonicalField::TechnicalLocation => "TechnicalLocation",
            CanonicalField::ResponsibleWorkCenter => "ResponsibleWorkCenter",
            CanonicalField::Author => "Author",
            CanonicalField::UserStatus => "UserStatus",
            CanonicalField::SystemStatus => "SystemStatus",
            CanonicalField::ActualCost => "ActualCost",
            CanonicalField::TotalGeneral => "TotalGeneral",
        };
        write!(f, "{}", name)
    }
}

// ==========================================
// 落库动作 (Upsert Action)
// ==========================================
// 由 upsert 语句自身返回值判定，不做事前存在性查询
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpsertAction {
    Inserted,
    Updated,
    Failed,
}

impl fmt::Display for UpsertAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpsertAction::Inserted => write!(f, "INSERTED"),
            UpsertAction::Updated => write!(f, "UPDATED"),
            UpsertAction::Failed => write!(f, "FAILED"),
        }
    }
}

// ==========================================
// 数值回退策略 (Numeric Fallback)
// ==========================================
// 成本类字段无法解析时的取值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NumericFallback {
    #[default]
    Zero, // 回退为 0
    Null, // 保持为空
}

impl NumericFallback {
    /// 回退值
    pub fn value(&self) -> Option<f64> {
        match self {
            NumericFallback::Zero => Some(0.0),
            NumericFallback::Null => None,
        }
    }
}

impl fmt::Display for NumericFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericFallback::Zero => write!(f, "ZERO"),
            NumericFallback::Null => write!(f, "NULL"),
        }
    }
}

impl FromStr for NumericFallback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ZERO" | "0" => Ok(NumericFallback::Zero),
            "NULL" | "NONE" | "EMPTY" => Ok(NumericFallback::Null),
            other => Err(format!("无效的数值回退策略: {}（应为 ZERO/NULL）", other)),
        }
    }
}

// ==========================================
// 必填列缺失策略 (Missing Column Policy)
// ==========================================
// 业务主键列（Orden）不受此策略影响，缺失总是中止
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MissingColumnPolicy {
    #[default]
    Abort,         // 整批中止
    TreatAsAbsent, // 视为空列继续
}

impl fmt::Display for MissingColumnPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingColumnPolicy::Abort => write!(f, "ABORT"),
            MissingColumnPolicy::TreatAsAbsent => write!(f, "TREAT_AS_ABSENT"),
        }
    }
}

impl FromStr for MissingColumnPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ABORT" => Ok(MissingColumnPolicy::Abort),
            "TREAT_AS_ABSENT" | "ABSENT" => Ok(MissingColumnPolicy::TreatAsAbsent),
            other => Err(format!(
                "无效的必填列缺失策略: {}（应为 ABORT/TREAT_AS_ABSENT）",
                other
            )),
        }
    }
}

// ==========================================
// 字段告警处理策略 (Field Warning Policy)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldWarningPolicy {
    #[default]
    Keep,      // 仅记录，照常落库
    RejectRow, // 有告警的行记为失败，不落库
}

impl fmt::Display for FieldWarningPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldWarningPolicy::Keep => write!(f, "KEEP"),
            FieldWarningPolicy::RejectRow => write!(f, "REJECT_ROW"),
        }
    }
}

impl FromStr for FieldWarningPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "KEEP" => Ok(FieldWarningPolicy::Keep),
            "REJECT_ROW" | "REJECT" => Ok(FieldWarningPolicy::RejectRow),
            other => Err(format!(
                "无效的字段告警策略: {}（应为 KEEP/REJECT_ROW）",
                other
            )),
        }
    }
}

// ==========================================
// ImportOptions - 单次导入生效的策略集合
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImportOptions {
    pub numeric_fallback: NumericFallback,
    pub missing_required_columns: MissingColumnPolicy,
    pub field_warning_policy: FieldWarningPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_str() {
        assert_eq!("zero".parse::<NumericFallback>(), Ok(NumericFallback::Zero));
        assert_eq!(" NULL ".parse::<NumericFallback>(), Ok(NumericFallback::Null));
        assert!("maybe".parse::<NumericFallback>().is_err());

        assert_eq!(
            "treat_as_absent".parse::<MissingColumnPolicy>(),
            Ok(MissingColumnPolicy::TreatAsAbsent)
        );
        assert_eq!(
            "REJECT_ROW".parse::<FieldWarningPolicy>(),
            Ok(FieldWarningPolicy::RejectRow)
        );
    }

    #[test]
    fn test_policy_display_roundtrip() {
        for policy in [MissingColumnPolicy::Abort, MissingColumnPolicy::TreatAsAbsent] {
            assert_eq!(policy.to_string().parse::<MissingColumnPolicy>(), Ok(policy));
        }
    }

    #[test]
    fn test_default_options() {
        let options = ImportOptions::default();
        assert_eq!(options.numeric_fallback, NumericFallback::Zero);
        assert_eq!(options.missing_required_columns, MissingColumnPolicy::Abort);
        assert_eq!(options.field_warning_policy, FieldWarningPolicy::Keep);
        assert_eq!(NumericFallback::Null.value(), None);
    }
}
