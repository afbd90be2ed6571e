// ==========================================
// SAP 订单报表导入 - 字段规范化器实现
// ==========================================
// 职责: 单行原始单元格 → OrderRecord + 字段告警
// 规则: 日期按日在前解析 / 数值按欧式千分位解析 / 文本去首尾空白
// 红线: 永不致命，解析失败只产生告警
// ==========================================

use crate::domain::{CanonicalField, FieldWarning, NumericFallback, OrderRecord};
use crate::importer::field_mapper::ColumnMapping;
use crate::importer::file_parser::CellValue;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

// ==========================================
// 基础解析函数
// ==========================================

/// 解析欧式格式数值（"." 千分位，"," 小数点）
///
/// - "1.234,56" → 1234.56
/// - "1.234,56-" → -1234.56（SAP 负号后置）
/// - 空白/不可解析 → None
pub fn parse_european_decimal(value: &str) -> Option<f64> {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}' && *c != '\u{202f}')
        .collect();
    if compact.is_empty() {
        return None;
    }

    let (body, negative) = match compact.strip_suffix('-') {
        Some(rest) if !rest.is_empty() && !rest.starts_with('-') => (rest, true),
        _ => (compact.as_str(), false),
    };

    let normalized = body.replace('.', "").replace(',', ".");
    let parsed = normalized.parse::<f64>().ok().filter(|v| v.is_finite())?;

    Some(if negative { -parsed } else { parsed })
}

/// 解析日在前的日期文本
///
/// 支持: dd.mm.yyyy / dd/mm/yyyy / dd-mm-yyyy（两位年份亦可），可带 " HH:MM[:SS]"
/// 兜底: ISO yyyy-mm-dd（可带 T 时间部分）
pub fn parse_day_first_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut parts = trimmed.split_whitespace();
    let date_part = parts.next()?;
    let time_part = parts.next();
    if parts.next().is_some() {
        return None;
    }
    if let Some(time) = time_part {
        NaiveTime::parse_from_str(time, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
            .ok()?;
    }

    parse_day_first_components(date_part).or_else(|| parse_iso_date(date_part))
}

fn parse_day_first_components(date_part: &str) -> Option<NaiveDate> {
    let separator = ['.', '/', '-']
        .into_iter()
        .find(|sep| date_part.contains(*sep))?;

    let pieces: Vec<&str> = date_part.split(separator).collect();
    let all_digits = |p: &&str| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit());
    if pieces.len() != 3 || !pieces.iter().all(all_digits) {
        return None;
    }
    // yyyy-mm-dd 交给 ISO 兜底
    if pieces[0].len() > 2 || pieces[1].len() > 2 {
        return None;
    }

    let day: u32 = pieces[0].parse().ok()?;
    let month: u32 = pieces[1].parse().ok()?;
    let year: i32 = match pieces[2].len() {
        // 两位年份: 00-69 → 20xx, 70-99 → 19xx
        1 | 2 => {
            let short: i32 = pieces[2].parse().ok()?;
            if short < 70 {
                2000 + short
            } else {
                1900 + short
            }
        }
        4 => pieces[2].parse().ok()?,
        _ => return None,
    };

    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_iso_date(date_part: &str) -> Option<NaiveDate> {
    let date_only = date_part.split('T').next()?;
    NaiveDate::parse_from_str(date_only, "%Y-%m-%d").ok()
}

/// Excel 序列号（1900 日期系统）→ 日期时间
///
/// Excel 把 1900-02-29 当作存在的日期，序列号 60 之前需补一天
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 || serial > 2_958_465.0 {
        return None;
    }

    let whole_days = serial.trunc() as i64;
    let seconds = ((serial - serial.trunc()) * 86_400.0).round() as i64;
    let days = if whole_days < 60 { whole_days + 1 } else { whole_days };

    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    base.checked_add_signed(Duration::days(days))?
        .checked_add_signed(Duration::seconds(seconds))
}

// ==========================================
// NormalizedRecord - 单行规范化结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub record: OrderRecord,
    pub warnings: Vec<FieldWarning>,
}

// ==========================================
// DataCleaner - 字段规范化器
// ==========================================
pub struct DataCleaner {
    numeric_fallback: NumericFallback,
}

impl DataCleaner {
    pub fn new(numeric_fallback: NumericFallback) -> Self {
        Self { numeric_fallback }
    }

    /// 规范化一行数据
    ///
    /// # 返回
    /// - None: 订单号为空（不构造记录）
    /// - Some(NormalizedRecord): 尽力解析的记录及字段告警
    pub fn normalize_row(
        &self,
        row: &[CellValue],
        mapping: &ColumnMapping,
    ) -> Option<NormalizedRecord> {
        let order_number = mapping.cell(row, CanonicalField::OrderNumber).as_text();
        if order_number.is_empty() {
            return None;
        }

        let mut warnings = Vec::new();
        let text = |field| mapping.cell(row, field).as_text();
        let optional_text = |field| {
            let value = mapping.cell(row, field).as_text();
            if value.is_empty() {
                None
            } else {
                Some(value)
            }
        };

        let record = OrderRecord {
            notice_number: optional_text(CanonicalField::NoticeNumber),
            start_date: self.clean_date(
                mapping.cell(row, CanonicalField::StartDate),
                CanonicalField::StartDate,
                &mut warnings,
            ),
            short_text: text(CanonicalField::ShortText),
            technical_location: optional_text(CanonicalField::TechnicalLocation),
            responsible_work_center: optional_text(CanonicalField::ResponsibleWorkCenter),
            author: text(CanonicalField::Author),
            user_status: text(CanonicalField::UserStatus),
            system_status: optional_text(CanonicalField::SystemStatus),
            actual_cost: self.clean_decimal(
                mapping.cell(row, CanonicalField::ActualCost),
                CanonicalField::ActualCost,
                &mut warnings,
            ),
            total_general: self.clean_decimal(
                mapping.cell(row, CanonicalField::TotalGeneral),
                CanonicalField::TotalGeneral,
                &mut warnings,
            ),
            order_number,
        };

        Some(NormalizedRecord { record, warnings })
    }

    /// 日期字段: 原生日期直接使用，数值按 Excel 序列号，文本按日在前解析
    fn clean_date(
        &self,
        cell: &CellValue,
        field: CanonicalField,
        warnings: &mut Vec<FieldWarning>,
    ) -> Option<NaiveDate> {
        if cell.is_blank() {
            return None;
        }

        let parsed = match cell {
            CellValue::Date(dt) => Some(dt.date()),
            CellValue::Number(serial) => excel_serial_to_datetime(*serial).map(|dt| dt.date()),
            CellValue::Text(text) => parse_day_first_date(text),
            CellValue::Bool(_) | CellValue::Empty => None,
        };

        if parsed.is_none() {
            warnings.push(FieldWarning::new(
                field,
                cell.as_text(),
                format!("日期无法解析，已置空: {}", cell.as_text()),
            ));
        }
        parsed
    }

    /// 数值字段: 原生数值直接使用，文本按欧式格式解析，失败取回退值
    fn clean_decimal(
        &self,
        cell: &CellValue,
        field: CanonicalField,
        warnings: &mut Vec<FieldWarning>,
    ) -> Option<f64> {
        if cell.is_blank() {
            return self.numeric_fallback.value();
        }

        let parsed = match cell {
            CellValue::Number(value) if value.is_finite() => Some(*value),
            CellValue::Text(text) => parse_european_decimal(text),
            _ => None,
        };

        match parsed {
            Some(value) => Some(value),
            None => {
                warnings.push(FieldWarning::new(
                    field,
                    cell.as_text(),
                    format!(
                        "数值无法解析，按回退策略 {} 取值: {}",
                        self.numeric_fallback,
                        cell.as_text()
                    ),
                ));
                self.numeric_fallback.value()
            }
        }
    }
}
