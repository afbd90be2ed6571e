// ==========================================
// OrderImporter 集成测试
// ==========================================
// 测试目标: 验证 .xlsx 报表 → ordenes_sap 的完整导入流程
// ==========================================

mod test_helpers;

use chrono::NaiveDate;
use sap_order_import::config::{config_keys, ConfigManager};
use sap_order_import::domain::{ImportOptions, NumericFallback};
use sap_order_import::importer::{
    ExcelParser, FileParser, ImportError, OrderImporter, OrderImporterImpl,
};
use sap_order_import::logging;
use sap_order_import::repository::{OrderRepository, OrderStore};
use test_helpers::{
    build_order_workbook, build_workbook, create_test_db, open_shared, order_row, order_rows,
    overlong_author,
};

/// 创建共享同一连接的导入器与仓储
fn create_test_importer(db_path: &str) -> (OrderImporterImpl<ConfigManager>, OrderRepository) {
    let conn = open_shared(db_path);
    let importer =
        OrderImporterImpl::with_excel_parser(ConfigManager::from_connection(conn.clone()));
    let store = OrderRepository::from_connection(conn);
    (importer, store)
}

#[test]
fn test_import_hundred_rows_isolates_constraint_failure() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let (importer, store) = create_test_importer(&db_path);

    // 第 57 条记录的创建人超长
    let mut rows = order_rows(100);
    rows[56][6] = overlong_author();
    let bytes = build_order_workbook(2, &rows);

    let report = importer
        .import_file("ordenes.xlsx", &bytes, &store)
        .expect("Import should succeed");
    let outcome = &report.outcome;

    assert_eq!(outcome.header_row, 2);
    assert_eq!(outcome.rows_processed, 100);
    assert_eq!(outcome.inserted, 99);
    assert_eq!(outcome.updated, 0);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].sheet_row, 59);
    assert_eq!(outcome.failures[0].order_number, "4000057");
    assert!(!outcome.failures[0].error.is_empty());

    assert_eq!(store.count_orders().unwrap(), 99);
    assert!(store.find_by_order_number("4000057").unwrap().is_none());
    assert!(store.find_by_order_number("4000058").unwrap().is_some());
    assert!(!report.batch_id.is_empty());
}

#[test]
fn test_reimport_same_file_updates_every_row() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let (importer, store) = create_test_importer(&db_path);
    let bytes = build_order_workbook(1, &order_rows(20));

    let first = importer.import_file("ordenes.xlsx", &bytes, &store).unwrap();
    assert_eq!(first.outcome.inserted, 20);
    assert_eq!(first.outcome.updated, 0);

    let second = importer.import_file("ordenes.xlsx", &bytes, &store).unwrap();
    assert_eq!(second.outcome.inserted, 0);
    assert_eq!(second.outcome.updated, 20);
    assert!(second.outcome.failures.is_empty());
    assert_ne!(first.batch_id, second.batch_id);

    assert_eq!(store.count_orders().unwrap(), 20);
    let entity = store.find_by_order_number("4000005").unwrap().unwrap();
    assert_eq!(entity.import_revision, 1);
    assert_eq!(entity.record.short_text, "Revisión bomba 5");
}

#[test]
fn test_changed_fields_overwrite_existing_order() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let (importer, store) = create_test_importer(&db_path);

    importer
        .import_file("ordenes.xlsx", &build_order_workbook(0, &order_rows(3)), &store)
        .unwrap();

    let mut changed = order_rows(3);
    changed[1][7] = "CERR".to_string();
    changed[1][9] = "2.500,75".to_string();
    let report = importer
        .import_file("ordenes.xlsx", &build_order_workbook(0, &changed), &store)
        .unwrap();
    assert_eq!(report.outcome.updated, 3);

    let entity = store.find_by_order_number("4000002").unwrap().unwrap();
    assert_eq!(entity.record.user_status, "CERR");
    assert_eq!(entity.record.actual_cost, Some(2500.75));
}

#[test]
fn test_spanish_locale_values_are_normalized() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let (importer, store) = create_test_importer(&db_path);

    let mut row = order_row(1);
    row[2] = "15.03.2023".to_string();
    row[9] = "1.234,56".to_string();
    row[10] = "50,00-".to_string();
    let bytes = build_order_workbook(0, &[row]);

    let report = importer.import_file("ordenes.xlsx", &bytes, &store).unwrap();
    assert!(report.outcome.warnings.is_empty());

    let entity = store.find_by_order_number("4000001").unwrap().unwrap();
    assert_eq!(entity.record.start_date, NaiveDate::from_ymd_opt(2023, 3, 15));
    assert_eq!(entity.record.actual_cost, Some(1234.56));
    assert_eq!(entity.record.total_general, Some(-50.0));
    assert_eq!(entity.record.technical_location.as_deref(), Some("PLT-A01-001"));
}

#[test]
fn test_impossible_date_is_nullified_with_warning() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let (importer, store) = create_test_importer(&db_path);

    let mut rows = order_rows(2);
    rows[1][2] = "31/02/2023".to_string();
    let bytes = build_order_workbook(3, &rows);

    let report = importer.import_file("ordenes.xlsx", &bytes, &store).unwrap();
    let outcome = &report.outcome;

    assert_eq!(outcome.inserted, 2);
    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].sheet_row, 5);
    assert_eq!(outcome.warnings[0].order_number, "4000002");
    assert_eq!(outcome.warnings[0].field, "StartDate");

    let entity = store.find_by_order_number("4000002").unwrap().unwrap();
    assert_eq!(entity.record.start_date, None);
}

#[test]
fn test_header_found_at_any_offset() {
    logging::init_test();

    for header_offset in [0usize, 3, 10] {
        let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
        let (importer, store) = create_test_importer(&db_path);

        let mut rows = order_rows(5);
        rows[4][6] = overlong_author();
        let bytes = build_order_workbook(header_offset, &rows);

        let report = importer.import_file("ordenes.xlsx", &bytes, &store).unwrap();
        assert_eq!(report.outcome.header_row, header_offset);
        assert_eq!(report.outcome.inserted, 4);
        assert_eq!(
            report.outcome.failures[0].sheet_row,
            header_offset + 5,
            "header_offset = {}",
            header_offset
        );
    }
}

#[test]
fn test_blank_costs_follow_numeric_fallback() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let (importer, store) = create_test_importer(&db_path);

    let mut row = order_row(7);
    row[9] = String::new();
    row[10] = String::new();
    let bytes = build_order_workbook(0, &[row]);
    let sheet = ExcelParser.parse_sheet("ordenes.xlsx", &bytes).unwrap();

    // 默认: 0
    importer
        .import_sheet(&sheet, &ImportOptions::default(), &store)
        .unwrap();
    let entity = store.find_by_order_number("4000007").unwrap().unwrap();
    assert_eq!(entity.record.actual_cost, Some(0.0));
    assert_eq!(entity.record.total_general, Some(0.0));

    // NULL 回退
    let options = ImportOptions {
        numeric_fallback: NumericFallback::Null,
        ..ImportOptions::default()
    };
    let outcome = importer.import_sheet(&sheet, &options, &store).unwrap();
    assert_eq!(outcome.updated, 1);
    assert!(outcome.warnings.is_empty());
    let entity = store.find_by_order_number("4000007").unwrap().unwrap();
    assert_eq!(entity.record.actual_cost, None);
    assert_eq!(entity.record.total_general, None);
}

#[test]
fn test_stored_policy_is_applied_by_import_file() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let (importer, store) = create_test_importer(&db_path);
    let config = ConfigManager::new(&db_path).unwrap();
    config
        .set_config_value(config_keys::NUMERIC_FALLBACK, "NULL")
        .unwrap();

    let mut row = order_row(3);
    row[9] = "n/d".to_string();
    let bytes = build_order_workbook(0, &[row]);

    let report = importer.import_file("ordenes.xlsx", &bytes, &store).unwrap();
    assert_eq!(report.outcome.warnings.len(), 1);
    assert_eq!(report.outcome.warnings[0].field, "ActualCost");

    let entity = store.find_by_order_number("4000003").unwrap().unwrap();
    assert_eq!(entity.record.actual_cost, None);
}

#[test]
fn test_rows_without_order_number_are_skipped() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let (importer, store) = create_test_importer(&db_path);

    let mut rows = order_rows(4);
    rows[1][0] = String::new();
    rows.push(vec![String::new(); 11]);
    let bytes = build_order_workbook(1, &rows);

    let report = importer.import_file("ordenes.xlsx", &bytes, &store).unwrap();
    assert_eq!(report.outcome.rows_processed, 3);
    assert_eq!(report.outcome.inserted, 3);
    assert_eq!(store.count_orders().unwrap(), 3);
}

#[test]
fn test_duplicate_order_in_file_last_row_wins() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let (importer, store) = create_test_importer(&db_path);

    let mut rows = order_rows(3);
    let mut duplicate = order_row(1);
    duplicate[3] = "Texto corregido".to_string();
    rows.push(duplicate);
    let bytes = build_order_workbook(0, &rows);

    let report = importer.import_file("ordenes.xlsx", &bytes, &store).unwrap();
    assert!(report.outcome.failures.is_empty());
    assert!(report
        .outcome
        .warnings
        .iter()
        .any(|w| w.order_number == "4000001" && w.sheet_row == 4));

    assert_eq!(store.count_orders().unwrap(), 3);
    let entity = store.find_by_order_number("4000001").unwrap().unwrap();
    assert_eq!(entity.record.short_text, "Texto corregido");
}

#[test]
fn test_invalid_extension_leaves_store_untouched() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let (importer, store) = create_test_importer(&db_path);
    let bytes = build_order_workbook(0, &order_rows(5));

    let result = importer.import_file("ordenes.csv", &bytes, &store);
    assert!(matches!(result, Err(ImportError::InvalidFormat(_))));
    assert_eq!(store.count_orders().unwrap(), 0);
}

#[test]
fn test_missing_required_columns_reported() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let (importer, store) = create_test_importer(&db_path);

    let header = ["Orden", "Aviso", "Texto breve", "Autor"];
    let rows = vec![vec![
        "4000001".to_string(),
        "10000001".to_string(),
        "Revisión".to_string(),
        "JPEREZ".to_string(),
    ]];
    let bytes = build_workbook(0, &header, &rows);

    match importer.import_file("ordenes.xlsx", &bytes, &store) {
        Err(ImportError::MissingColumns(missing)) => {
            assert!(missing.contains(&"Inic.extr.".to_string()));
            assert!(missing.contains(&"StatUsu".to_string()));
            assert!(!missing.contains(&"Orden".to_string()));
        }
        other => panic!("expected MissingColumns, got {:?}", other.map(|r| r.outcome)),
    }
    assert_eq!(store.count_orders().unwrap(), 0);
}

#[test]
fn test_sheet_without_header_rejected() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let (importer, store) = create_test_importer(&db_path);

    let rows = vec![vec!["M-1".to_string(), "3".to_string()]];
    let bytes = build_workbook(2, &["Material", "Cantidad"], &rows);
    let result = importer.import_file("ordenes.xlsx", &bytes, &store);
    assert!(matches!(result, Err(ImportError::HeaderNotFound)));
}
