// ==========================================
// SAP 订单报表导入 - 订单导入器实现
// ==========================================
// 职责: 整合导入流程，从上传文件到 ordenes_sap 表
// 流程: 解析 → 表头定位 → 列映射 → 规范化 → 筛选 → upsert → 汇总
// 说明: 单次调用内严格按表内顺序同步执行；调用之间不共享状态
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::{BatchOutcome, ImportOptions, ImportReport};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::{ExcelParser, RawSheet};
use crate::importer::header_locator::HeaderLocator;
use crate::importer::order_importer_trait::{FileParser, OrderImporter};
use crate::importer::reconciler::Reconciler;
use crate::importer::record_validator::{RecordValidator, RowCandidate};
use crate::importer::result_aggregator::ResultAggregator;
use crate::repository::order_repo::OrderStore;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// OrderImporterImpl - 订单导入器实现
// ==========================================
pub struct OrderImporterImpl<C>
where
    C: ImportConfigReader,
{
    // 配置读取器（每次调用读取一次）
    config: C,

    // 文件解析器
    file_parser: Box<dyn FileParser>,
}

impl<C> OrderImporterImpl<C>
where
    C: ImportConfigReader,
{
    /// 创建新的 OrderImporter 实例
    ///
    /// # 参数
    /// - config: 导入策略读取器
    /// - file_parser: 文件解析器
    pub fn new(config: C, file_parser: Box<dyn FileParser>) -> Self {
        Self {
            config,
            file_parser,
        }
    }

    /// 使用默认 Excel 解析器
    pub fn with_excel_parser(config: C) -> Self {
        Self::new(config, Box::new(ExcelParser))
    }
}

impl<C> OrderImporter for OrderImporterImpl<C>
where
    C: ImportConfigReader,
{
    #[instrument(
        skip(self, bytes, store),
        fields(batch_id = tracing::field::Empty, file_name = %file_name)
    )]
    fn import_file(
        &self,
        file_name: &str,
        bytes: &[u8],
        store: &dyn OrderStore,
    ) -> ImportResult<ImportReport> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());
        info!(size_bytes = bytes.len(), "开始导入订单报表");

        // === 步骤 1: 解析文件 ===
        debug!("步骤 1: 解析文件");
        let sheet = self.file_parser.parse_sheet(file_name, bytes).map_err(|e| {
            warn!(error = %e, "文件解析失败");
            e
        })?;
        debug!(total_rows = sheet.len(), "文件解析完成");

        // 策略在解析成功后读取，格式错误不触碰存储
        let options = self.config.load_import_options()?;
        debug!(?options, "导入策略");

        let outcome = self.import_sheet(&sheet, &options, store)?;
        let elapsed_ms = start_time.elapsed().as_millis() as u64;

        info!(
            header_row = outcome.header_row,
            rows_processed = outcome.rows_processed,
            inserted = outcome.inserted,
            updated = outcome.updated,
            failed = outcome.failures.len(),
            skipped = outcome.skipped_rows,
            warnings = outcome.warnings.len(),
            elapsed_ms,
            "订单报表导入完成"
        );

        Ok(ImportReport {
            batch_id,
            file_name: file_name.to_string(),
            outcome,
            elapsed_ms,
        })
    }

    fn import_sheet(
        &self,
        sheet: &RawSheet,
        options: &ImportOptions,
        store: &dyn OrderStore,
    ) -> ImportResult<BatchOutcome> {
        // === 步骤 2: 表头定位 ===
        debug!("步骤 2: 表头定位");
        let header_offset = HeaderLocator.locate(sheet).map_err(|e| {
            warn!(error = %e, "表头定位失败");
            e
        })?;
        let rows = sheet.rows();

        // === 步骤 3: 列映射 ===
        debug!("步骤 3: 列映射");
        let mapping_report = FieldMapper
            .build_mapping(&rows[header_offset], options.missing_required_columns)
            .map_err(|e| {
                warn!(error = %e, header_row = header_offset, "列映射失败");
                e
            })?;

        // === 步骤 4: 字段规范化 ===
        debug!("步骤 4: 字段规范化");
        let cleaner = DataCleaner::new(options.numeric_fallback);
        let candidates: Vec<RowCandidate> = rows[header_offset + 1..]
            .iter()
            .enumerate()
            .map(|(data_index, row)| RowCandidate {
                data_index,
                normalized: cleaner.normalize_row(row, &mapping_report.mapping),
            })
            .collect();

        // === 步骤 5: 记录筛选 ===
        debug!(data_rows = candidates.len(), "步骤 5: 记录筛选");
        let validation =
            RecordValidator::new(header_offset, options.field_warning_policy).validate(candidates);

        // === 步骤 6: 逐条落库 ===
        debug!(records = validation.accepted.len(), "步骤 6: 逐条落库");
        let mut outcomes = Reconciler.reconcile(store, &validation.accepted)?;
        outcomes.extend(validation.rejected);

        // === 步骤 7: 汇总 ===
        debug!("步骤 7: 汇总批次结果");
        let mut outcome = ResultAggregator::new(header_offset).aggregate(
            outcomes,
            validation.warnings,
            validation.skipped_rows,
        );
        outcome.absent_columns = mapping_report
            .absent_required
            .iter()
            .map(|label| label.to_string())
            .collect();
        Ok(outcome)
    }
}
