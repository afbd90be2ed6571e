// ==========================================
// SAP 订单报表导入 - 表头定位器
// ==========================================
// 职责: 在任意版式的工作表中找到真实表头行
// 说明: 表头行下标即表头偏移，用户可见行号 = 偏移 + 数据行下标 + 1
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{
    business_key_spec, required_specs, ColumnSpec, COLUMN_LADDER,
};
use crate::importer::file_parser::{CellValue, RawSheet};
use tracing::debug;

/// 自顶向下扫描，返回第一个同时包含全部给定列名的行下标
///
/// # 参数
/// - sheet: 原始工作表
/// - specs: 需要出现的列（主列名或别名精确匹配，去首尾空白）
///
/// # 返回
/// - Ok(usize): 表头偏移
/// - Err(HeaderNotFound): 没有任何行满足条件
pub fn find_header_row(sheet: &RawSheet, specs: &[&ColumnSpec]) -> ImportResult<usize> {
    sheet
        .rows()
        .iter()
        .position(|row| row_contains_all(row, specs))
        .ok_or(ImportError::HeaderNotFound)
}

fn row_contains_all(row: &[CellValue], specs: &[&ColumnSpec]) -> bool {
    if row.iter().all(CellValue::is_blank) {
        return false;
    }
    specs.iter().all(|spec| row_contains(row, spec))
}

fn row_contains(row: &[CellValue], spec: &ColumnSpec) -> bool {
    row.iter()
        .any(|cell| matches!(cell, CellValue::Text(text) if spec.matches(text)))
}

/// 一行中可识别的报表列数（必填 + 可选）
fn known_label_count(row: &[CellValue]) -> usize {
    COLUMN_LADDER
        .iter()
        .filter(|spec| row_contains(row, spec))
        .count()
}

/// 含业务主键列的行中，可识别列最多的一行（并列取最上方）
fn best_partial_header(sheet: &RawSheet) -> Option<usize> {
    let key = business_key_spec();
    let mut best: Option<(usize, usize)> = None; // (行下标, 可识别列数)

    for (index, row) in sheet.rows().iter().enumerate() {
        if !row_contains(row, key) {
            continue;
        }
        let count = known_label_count(row);
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((index, count));
        }
    }

    best.map(|(index, _)| index)
}

// ==========================================
// HeaderLocator - 两轮定位
// ==========================================
// 第一轮: 全部必填列，取最上方一行
// 第二轮: 含业务主键列且可识别列最多的一行，使"表头可识别但缺列"
//         报告为缺列而非找不到表头，且不会被上方只含 "Orden" 的筛选行抢占
pub struct HeaderLocator;

impl HeaderLocator {
    pub fn locate(&self, sheet: &RawSheet) -> ImportResult<usize> {
        if sheet.is_empty() {
            debug!("工作表为空");
            return Err(ImportError::HeaderNotFound);
        }

        match find_header_row(sheet, &required_specs()) {
            Ok(offset) => {
                debug!(header_row = offset, "表头定位完成");
                Ok(offset)
            }
            Err(ImportError::HeaderNotFound) => {
                let offset = best_partial_header(sheet).ok_or(ImportError::HeaderNotFound)?;
                debug!(header_row = offset, "按可识别列数定位到表头（必填列不全）");
                Ok(offset)
            }
            Err(e) => Err(e),
        }
    }
}
