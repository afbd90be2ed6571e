// ==========================================
// SAP 订单报表导入 - 文件解析器实现
// ==========================================
// 阶段 0: 扩展名校验 → 内存读取工作簿 → 第一个工作表 → RawSheet
// 支持: Excel (.xlsx/.xlsm/.xls)
// 说明: 保留空行与原始行位置，行号换算依赖原始下标
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::order_importer_trait::FileParser;
use calamine::{Data, Range, Reader, Xls, Xlsx};
use chrono::{NaiveDate, NaiveDateTime};
use std::io::Cursor;
use std::path::Path;

// ==========================================
// CellValue / RawSheet
// ==========================================

/// 未定型的单元格值
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDateTime),
}

impl CellValue {
    /// 是否为空（空串/纯空白视为空）
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 转为去除首尾空白的文本
    ///
    /// 整数值的数字不带小数部分（4000123.0 → "4000123"）
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(f) => {
                if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 {
                    format!("{:.0}", f)
                } else {
                    f.to_string()
                }
            }
            CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::Date(dt) => {
                if dt.time() == chrono::NaiveTime::MIN {
                    dt.format("%d.%m.%Y").to_string()
                } else {
                    dt.format("%d.%m.%Y %H:%M:%S").to_string()
                }
            }
        }
    }
}

/// 原始工作表：按行排列的单元格（行下标 = 工作表行下标）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    rows: Vec<Vec<CellValue>>,
}

impl RawSheet {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    /// 由文本网格构造（空串视为空单元格）
    pub fn from_text_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|v| {
                        let v = v.as_ref();
                        if v.is_empty() {
                            CellValue::Empty
                        } else {
                            CellValue::Text(v.to_string())
                        }
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ==========================================
// 支持的文件格式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkbookFormat {
    Xlsx,
    Xlsm,
    Xls,
}

impl WorkbookFormat {
    /// 按文件扩展名判定格式（大小写不敏感）
    pub fn from_file_name(file_name: &str) -> ImportResult<Self> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "xlsx" => Ok(WorkbookFormat::Xlsx),
            "xlsm" => Ok(WorkbookFormat::Xlsm),
            "xls" => Ok(WorkbookFormat::Xls),
            "" => Err(ImportError::InvalidFormat(format!("{}（无扩展名）", file_name))),
            _ => Err(ImportError::InvalidFormat(format!(".{}", ext))),
        }
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_sheet(&self, file_name: &str, bytes: &[u8]) -> ImportResult<RawSheet> {
        // 检查扩展名（先于任何解析）
        let format = WorkbookFormat::from_file_name(file_name)?;

        if bytes.is_empty() {
            return Err(ImportError::UnreadableWorkbook("上传文件为空".to_string()));
        }

        let cursor = Cursor::new(bytes.to_vec());

        // 只读取第一个工作表
        let range = match format {
            WorkbookFormat::Xlsx | WorkbookFormat::Xlsm => {
                let mut workbook: Xlsx<_> = Xlsx::new(cursor)?;
                workbook.worksheet_range_at(0).ok_or_else(no_worksheet)??
            }
            WorkbookFormat::Xls => {
                let mut workbook: Xls<_> = Xls::new(cursor)?;
                workbook.worksheet_range_at(0).ok_or_else(no_worksheet)??
            }
        };

        Ok(range_to_raw_sheet(&range))
    }
}

fn no_worksheet() -> ImportError {
    ImportError::UnreadableWorkbook("Excel 文件无工作表".to_string())
}

/// Range → RawSheet
///
/// calamine 的 Range 从第一个非空单元格开始，这里补齐前导空行/空列，
/// 使 RawSheet 的行下标与工作表行下标一致
fn range_to_raw_sheet(range: &Range<Data>) -> RawSheet {
    let (start_row, start_col) = match range.start() {
        Some((r, c)) => (r as usize, c as usize),
        None => return RawSheet::default(),
    };

    let mut rows: Vec<Vec<CellValue>> = Vec::with_capacity(start_row + range.height());
    rows.resize_with(start_row, Vec::new);

    for data_row in range.rows() {
        let mut row = Vec::with_capacity(start_col + data_row.len());
        row.resize(start_col, CellValue::Empty);
        row.extend(data_row.iter().map(convert_cell));
        rows.push(row);
    }

    RawSheet::new(rows)
}

/// calamine 单元格 → CellValue
fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => {
            if s.trim().is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(s.clone())
            }
        }
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) if dt.is_duration() => CellValue::Number(dt.as_f64()),
        // 按工作簿的日期系统（1900/1904）换算
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(CellValue::Date)
            .unwrap_or(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

fn parse_iso_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
