// ==========================================
// SAP 订单报表导入 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发导入时的偶发 busy 错误
// - 启动时建表（导入流程本身从不建表）
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 订单表与配置表
///
/// 列宽约束沿用报表系统的字段长度（orden/aviso 20，autor 50）
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS ordenes_sap (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    orden             TEXT NOT NULL UNIQUE CHECK (length(orden) BETWEEN 1 AND 20),
    aviso             TEXT CHECK (aviso IS NULL OR length(aviso) <= 20),
    fecha_inicio      TEXT,
    texto_breve       TEXT,
    ubicacion_tecnica TEXT,
    pto_trb_res       TEXT,
    autor             TEXT CHECK (autor IS NULL OR length(autor) <= 50),
    status_usuario    TEXT,
    status_sistema    TEXT,
    costo             REAL,
    total_general     REAL,
    import_revision   INTEGER NOT NULL DEFAULT 0,
    created_at        TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at        TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS config_kv (
    key        TEXT PRIMARY KEY,
    value      TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys / busy_timeout 需要"每个连接"单独配置
/// - WAL 对内存库无效（返回 memory），忽略即可
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get::<_, String>(0))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 确保表结构存在（幂等）
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master
                 WHERE type = 'table' AND name IN ('ordenes_sap', 'config_kv')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 2);
    }

    #[test]
    fn test_author_length_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();

        let ok = conn.execute(
            "INSERT INTO ordenes_sap (orden, autor) VALUES ('4000001', ?1)",
            ["A".repeat(50)],
        );
        assert!(ok.is_ok());

        let too_long = conn.execute(
            "INSERT INTO ordenes_sap (orden, autor) VALUES ('4000002', ?1)",
            ["A".repeat(51)],
        );
        assert!(too_long.is_err());
    }
}
