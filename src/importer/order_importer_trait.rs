// ==========================================
// SAP 订单报表导入 - 导入接口 Trait
// ==========================================
// 职责: 定义订单导入接口（不包含实现）
// 说明: 存储句柄由调用方在每次调用时传入，导入器本身不持有连接
// ==========================================

use crate::domain::{BatchOutcome, ImportOptions, ImportReport};
use crate::importer::error::ImportResult;
use crate::importer::file_parser::RawSheet;
use crate::repository::order_repo::OrderStore;

// ==========================================
// OrderImporter Trait
// ==========================================
// 用途: 订单报表导入主接口
// 实现者: OrderImporterImpl
pub trait OrderImporter: Send + Sync {
    /// 导入一个上传的报表文件
    ///
    /// # 参数
    /// - file_name: 原始文件名（用于扩展名校验与日志）
    /// - bytes: 文件内容
    /// - store: 订单存储句柄
    ///
    /// # 返回
    /// - Ok(ImportReport): 批次结果（单行失败记录在 outcome.failures 中）
    /// - Err: 结构性错误（格式/表头/缺列）或连接错误，整批中止
    ///
    /// # 导入流程
    /// 1. 扩展名校验 + 解析第一个工作表
    /// 2. 定位表头行
    /// 3. 列映射（必填列校验）
    /// 4. 字段规范化（日期/数值/文本）
    /// 5. 记录筛选（剔除无订单号行）
    /// 6. 逐条 upsert（单条失败不影响其余）
    /// 7. 汇总批次结果
    fn import_file(
        &self,
        file_name: &str,
        bytes: &[u8],
        store: &dyn OrderStore,
    ) -> ImportResult<ImportReport>;

    /// 导入已解析的工作表（步骤 2-7）
    ///
    /// # 参数
    /// - sheet: 原始工作表
    /// - options: 本次生效的导入策略
    /// - store: 订单存储句柄
    fn import_sheet(
        &self,
        sheet: &RawSheet,
        options: &ImportOptions,
        store: &dyn OrderStore,
    ) -> ImportResult<BatchOutcome>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 0）
// 实现者: ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析上传内容的第一个工作表
    ///
    /// # 参数
    /// - file_name: 文件名（扩展名决定读取器）
    /// - bytes: 文件内容
    ///
    /// # 返回
    /// - Ok(RawSheet): 保留原始行位置的工作表
    /// - Err: InvalidFormat / UnreadableWorkbook
    fn parse_sheet(&self, file_name: &str, bytes: &[u8]) -> ImportResult<RawSheet>;
}
