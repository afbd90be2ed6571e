// ==========================================
// SAP 订单报表导入 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入流程所需的策略读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::{FieldWarningPolicy, ImportOptions, MissingColumnPolicy, NumericFallback};
use crate::importer::error::ImportResult;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 每次导入调用开始时读取一次生效策略
// 实现者: ConfigManager（从 config_kv 表读取）、ImportOptions（固定策略）
pub trait ImportConfigReader: Send + Sync {
    /// 成本类字段无法解析时的取值
    ///
    /// # 默认值
    /// - ZERO
    fn get_numeric_fallback(&self) -> ImportResult<NumericFallback>;

    /// 必填列缺失时的处理方式
    ///
    /// # 默认值
    /// - ABORT
    fn get_missing_column_policy(&self) -> ImportResult<MissingColumnPolicy>;

    /// 存在字段告警的行如何处理
    ///
    /// # 默认值
    /// - KEEP
    fn get_field_warning_policy(&self) -> ImportResult<FieldWarningPolicy>;

    /// 一次性读取全部导入策略
    fn load_import_options(&self) -> ImportResult<ImportOptions> {
        Ok(ImportOptions {
            numeric_fallback: self.get_numeric_fallback()?,
            missing_required_columns: self.get_missing_column_policy()?,
            field_warning_policy: self.get_field_warning_policy()?,
        })
    }
}

// 固定策略（CLI 覆盖 / 测试）
impl ImportConfigReader for ImportOptions {
    fn get_numeric_fallback(&self) -> ImportResult<NumericFallback> {
        Ok(self.numeric_fallback)
    }

    fn get_missing_column_policy(&self) -> ImportResult<MissingColumnPolicy> {
        Ok(self.missing_required_columns)
    }

    fn get_field_warning_policy(&self) -> ImportResult<FieldWarningPolicy> {
        Ok(self.field_warning_policy)
    }
}
