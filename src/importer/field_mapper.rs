// ==========================================
// SAP 订单报表导入 - 列映射器实现
// ==========================================
// 依据: 订单报表列映射表（源列名 → 标准字段）
// 职责: 表头标签 → 列位置映射 + 必填列校验
// 说明: 只解析一次，数据行不在此过滤或重排
// ==========================================

use crate::domain::{CanonicalField, MissingColumnPolicy};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::CellValue;
use tracing::{debug, warn};

// ==========================================
// ColumnSpec - 列映射表条目
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub field: CanonicalField,
    pub label: &'static str,             // 报表主列名
    pub aliases: &'static [&'static str], // 可接受的缩写/变体
    pub required: bool,
}

impl ColumnSpec {
    /// 单元格文本（去首尾空白后）是否与主列名或别名完全一致
    pub fn matches(&self, cell: &str) -> bool {
        let trimmed = cell.trim();
        trimmed == self.label || self.aliases.contains(&trimmed)
    }
}

/// 报表列映射表（顺序与 CanonicalField::ALL 一致）
pub const COLUMN_LADDER: [ColumnSpec; 11] = [
    ColumnSpec {
        field: CanonicalField::OrderNumber,
        label: "Orden",
        aliases: &[],
        required: true,
    },
    ColumnSpec {
        field: CanonicalField::NoticeNumber,
        label: "Aviso",
        aliases: &[],
        required: false,
    },
    ColumnSpec {
        field: CanonicalField::StartDate,
        label: "Inic.extr.",
        aliases: &["Inicio extremo"],
        required: true,
    },
    ColumnSpec {
        field: CanonicalField::ShortText,
        label: "Texto breve",
        aliases: &[],
        required: true,
    },
    ColumnSpec {
        field: CanonicalField::TechnicalLocation,
        label: "Ubicación técnica",
        aliases: &["Ubic.técnica", "Ubicac.técnica"],
        required: false,
    },
    ColumnSpec {
        field: CanonicalField::ResponsibleWorkCenter,
        label: "PtoTrbRes",
        aliases: &["Pto.tbjo.resp."],
        required: false,
    },
    ColumnSpec {
        field: CanonicalField::Author,
        label: "Autor",
        aliases: &[],
        required: true,
    },
    ColumnSpec {
        field: CanonicalField::UserStatus,
        label: "StatUsu",
        aliases: &["Status usuario"],
        required: true,
    },
    ColumnSpec {
        field: CanonicalField::SystemStatus,
        label: "Status del sistema",
        aliases: &["StatSis"],
        required: false,
    },
    ColumnSpec {
        field: CanonicalField::ActualCost,
        label: "SumCosReal",
        aliases: &["Costes reales"],
        required: true,
    },
    ColumnSpec {
        field: CanonicalField::TotalGeneral,
        label: "TotalGen.(real)",
        aliases: &["Total general (real)"],
        required: false,
    },
];

/// 查询某个标准字段的映射表条目
pub fn column_spec(field: CanonicalField) -> &'static ColumnSpec {
    &COLUMN_LADDER[field as usize]
}

/// 全部必填列
pub fn required_specs() -> Vec<&'static ColumnSpec> {
    COLUMN_LADDER.iter().filter(|spec| spec.required).collect()
}

/// 业务主键列（任何策略下都必须存在）
pub fn business_key_spec() -> &'static ColumnSpec {
    column_spec(CanonicalField::OrderNumber)
}

static EMPTY_CELL: CellValue = CellValue::Empty;

// ==========================================
// ColumnMapping - 标准字段 → 源列位置
// ==========================================
// None 表示"无此列"，读取时每行都视为空
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    columns: [Option<usize>; 11],
}

impl ColumnMapping {
    pub fn column(&self, field: CanonicalField) -> Option<usize> {
        self.columns[field as usize]
    }

    /// 读取某行中该字段对应的单元格（无此列或行过短时返回空单元格）
    pub fn cell<'a>(&self, row: &'a [CellValue], field: CanonicalField) -> &'a CellValue {
        self.column(field)
            .and_then(|idx| row.get(idx))
            .unwrap_or(&EMPTY_CELL)
    }

    fn set(&mut self, field: CanonicalField, column: usize) {
        self.columns[field as usize] = Some(column);
    }
}

/// 列映射结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingReport {
    pub mapping: ColumnMapping,
    pub absent_required: Vec<&'static str>, // 仅 TreatAsAbsent 策略下非空
}

// ==========================================
// FieldMapper - 列映射器
// ==========================================
pub struct FieldMapper;

impl FieldMapper {
    /// 根据表头行构建列映射
    ///
    /// # 参数
    /// - header: 表头行单元格
    /// - policy: 必填列缺失策略
    ///
    /// # 返回
    /// - Ok(MappingReport): 映射结果（同名列取最左侧，未知列忽略）
    /// - Err(MissingColumns): 列出全部缺失的必填列名
    pub fn build_mapping(
        &self,
        header: &[CellValue],
        policy: MissingColumnPolicy,
    ) -> ImportResult<MappingReport> {
        let mut mapping = ColumnMapping::default();

        for spec in COLUMN_LADDER.iter() {
            let position = header
                .iter()
                .position(|cell| matches!(cell, CellValue::Text(text) if spec.matches(text)));
            if let Some(column) = position {
                mapping.set(spec.field, column);
            }
        }

        let missing_required: Vec<&'static str> = COLUMN_LADDER
            .iter()
            .filter(|spec| spec.required && mapping.column(spec.field).is_none())
            .map(|spec| spec.label)
            .collect();
        let absent_optional: Vec<&'static str> = COLUMN_LADDER
            .iter()
            .filter(|spec| !spec.required && mapping.column(spec.field).is_none())
            .map(|spec| spec.label)
            .collect();

        let key_missing = mapping.column(CanonicalField::OrderNumber).is_none();
        if !missing_required.is_empty()
            && (policy == MissingColumnPolicy::Abort || key_missing)
        {
            return Err(ImportError::MissingColumns(
                missing_required.iter().map(|s| s.to_string()).collect(),
            ));
        }

        if !missing_required.is_empty() {
            warn!(
                missing = ?missing_required,
                "必填列缺失，按 TREAT_AS_ABSENT 策略视为空列继续导入"
            );
        }
        if !absent_optional.is_empty() {
            debug!(absent = ?absent_optional, "可选列不存在");
        }

        Ok(MappingReport {
            mapping,
            absent_required: missing_required,
        })
    }
}
