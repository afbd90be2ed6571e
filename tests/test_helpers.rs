// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、SAP 报表工作簿生成等功能
// ==========================================
#![allow(dead_code)]

use rusqlite::Connection;
use rust_xlsxwriter::Workbook;
use sap_order_import::db::{ensure_schema, open_sqlite_connection};
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 报表表头（SAP 导出顺序）
pub const ORDER_HEADER: [&str; 11] = [
    "Orden",
    "Aviso",
    "Inic.extr.",
    "Texto breve",
    "Ubicación técnica",
    "PtoTrbRes",
    "Autor",
    "StatUsu",
    "Status del sistema",
    "SumCosReal",
    "TotalGen.(real)",
];

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = open_sqlite_connection(&db_path)?;
    ensure_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开共享连接（仓储与配置复用）
pub fn open_shared(db_path: &str) -> Arc<Mutex<Connection>> {
    let conn = open_sqlite_connection(db_path).expect("Failed to open db");
    Arc::new(Mutex::new(conn))
}

/// 生成一行合法的订单数据（按 ORDER_HEADER 顺序）
pub fn order_row(n: usize) -> Vec<String> {
    vec![
        format!("{}", 4_000_000 + n),
        format!("{}", 10_000_000 + n),
        format!("{:02}.03.2023", (n % 28) + 1),
        format!("Revisión bomba {}", n),
        format!("PLT-A01-{:03}", n % 100),
        "MECANICO".to_string(),
        "JPEREZ".to_string(),
        "LIBE".to_string(),
        "LIB  NLIQ".to_string(),
        format!("{}.{:03},50", n, n % 1000),
        format!("{},00", n * 10),
    ]
}

/// 生成 count 行订单数据（编号从 1 开始）
pub fn order_rows(count: usize) -> Vec<Vec<String>> {
    (1..=count).map(order_row).collect()
}

/// 生成 .xlsx 报表
///
/// # 参数
/// - header_offset: 表头所在行（其上方填充报表标题行）
/// - header: 表头
/// - rows: 数据行（空字符串不写入单元格）
pub fn build_workbook(header_offset: usize, header: &[&str], rows: &[Vec<String>]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for title_row in 0..header_offset {
        let title = if title_row == 0 {
            "Lista de órdenes PM".to_string()
        } else {
            format!("Ejecutado el {:02}.03.2023", title_row)
        };
        sheet.write_string(title_row as u32, 0, &title).unwrap();
    }

    for (col, label) in header.iter().enumerate() {
        sheet
            .write_string(header_offset as u32, col as u16, *label)
            .unwrap();
    }

    for (i, row) in rows.iter().enumerate() {
        let sheet_row = (header_offset + 1 + i) as u32;
        for (col, value) in row.iter().enumerate() {
            if !value.is_empty() {
                sheet.write_string(sheet_row, col as u16, value).unwrap();
            }
        }
    }

    workbook.save_to_buffer().unwrap()
}

/// 标准表头的 .xlsx 报表
pub fn build_order_workbook(header_offset: usize, rows: &[Vec<String>]) -> Vec<u8> {
    build_workbook(header_offset, &ORDER_HEADER, rows)
}

/// 超过 50 字符的创建人（违反 autor 长度约束）
pub fn overlong_author() -> String {
    "X".repeat(51)
}
