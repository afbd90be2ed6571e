// ==========================================
// SAP 订单报表导入 - 导入层
// ==========================================
// 职责: 上传的 SAP 订单报表 → ordenes_sap 表
// 支持: Excel (.xlsx/.xlsm/.xls)，只读第一个工作表
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod header_locator;
pub mod order_importer;
pub mod order_importer_trait;
pub mod reconciler;
pub mod record_validator;
pub mod result_aggregator;

// 重导出核心类型
pub use data_cleaner::{parse_day_first_date, parse_european_decimal, DataCleaner};
pub use error::{ImportError, ImportResult};
pub use field_mapper::{ColumnMapping, FieldMapper, COLUMN_LADDER};
pub use file_parser::{CellValue, ExcelParser, RawSheet};
pub use header_locator::HeaderLocator;
pub use order_importer::OrderImporterImpl;
pub use result_aggregator::sheet_row;

// 重导出 Trait 接口
pub use order_importer_trait::{FileParser, OrderImporter};
