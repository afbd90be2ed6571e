// ==========================================
// SAP 订单报表导入 - 订单仓储
// ==========================================
// 表: ordenes_sap（orden 唯一）
// 红线: Repository 不含业务逻辑，只负责数据访问
// 说明: 新增/更新由 upsert 语句 RETURNING 的 import_revision 判定
//       （0 = 新插入，>= 1 = 冲突后更新），不做事前存在性查询
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::{OrderRecord, UpsertAction};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{
    params, CachedStatement, Connection, OptionalExtension, Transaction, TransactionBehavior,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{debug, error};

const UPSERT_ORDER_SQL: &str = r#"
    INSERT INTO ordenes_sap (
        orden, aviso, fecha_inicio, texto_breve, ubicacion_tecnica, pto_trb_res,
        autor, status_usuario, status_sistema, costo, total_general
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
    ON CONFLICT(orden) DO UPDATE SET
        aviso = excluded.aviso,
        fecha_inicio = excluded.fecha_inicio,
        texto_breve = excluded.texto_breve,
        ubicacion_tecnica = excluded.ubicacion_tecnica,
        pto_trb_res = excluded.pto_trb_res,
        autor = excluded.autor,
        status_usuario = excluded.status_usuario,
        status_sistema = excluded.status_sistema,
        costo = excluded.costo,
        total_general = excluded.total_general,
        import_revision = ordenes_sap.import_revision + 1,
        updated_at = datetime('now')
    RETURNING import_revision
"#;

// ==========================================
// OrderEntity - 已落库订单
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEntity {
    pub id: i64,
    #[serde(flatten)]
    pub record: OrderRecord,
    pub import_revision: i64, // 被重复导入覆盖的次数
    pub created_at: String,
    pub updated_at: String,
}

// ==========================================
// OrderStore Trait - 存储接缝
// ==========================================
// 实现者: OrderRepository
pub trait OrderStore: Send + Sync {
    /// 按表内顺序逐条 upsert
    ///
    /// # 返回
    /// - Ok(Vec): 与输入一一对应的单条结果（约束/类型错误只影响该条）
    /// - Err: 连接级错误，整批未提交
    fn upsert_batch(
        &self,
        records: &[OrderRecord],
    ) -> RepositoryResult<Vec<RepositoryResult<UpsertAction>>>;

    /// 按订单号查询
    fn find_by_order_number(&self, order_number: &str) -> RepositoryResult<Option<OrderEntity>>;

    /// 订单总数
    fn count_orders(&self) -> RepositoryResult<usize>;
}

// ==========================================
// OrderRepository - SQLite 实现
// ==========================================
pub struct OrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OrderRepository {
    /// 打开数据库文件并创建仓储实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 共享底层连接（配置表读写复用同一句柄）
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn upsert_one(
        stmt: &mut CachedStatement<'_>,
        record: &OrderRecord,
    ) -> RepositoryResult<UpsertAction> {
        let revision: i64 = stmt.query_row(
            params![
                record.order_number,
                record.notice_number,
                record.start_date,
                record.short_text,
                record.technical_location,
                record.responsible_work_center,
                record.author,
                record.user_status,
                record.system_status,
                record.actual_cost,
                record.total_general,
            ],
            |row| row.get(0),
        )?;

        Ok(if revision == 0 {
            UpsertAction::Inserted
        } else {
            UpsertAction::Updated
        })
    }
}

impl OrderStore for OrderRepository {
    fn upsert_batch(
        &self,
        records: &[OrderRecord],
    ) -> RepositoryResult<Vec<RepositoryResult<UpsertAction>>> {
        let conn = self.get_conn()?;

        // 整批一个事务（立即取写锁，等待受 busy_timeout 约束），每条记录一个 SAVEPOINT
        let tx = Transaction::new_unchecked(&conn, TransactionBehavior::Immediate)?;
        let mut results = Vec::with_capacity(records.len());
        {
            let mut stmt = tx.prepare_cached(UPSERT_ORDER_SQL)?;

            for record in records {
                tx.execute_batch("SAVEPOINT order_upsert")?;

                match Self::upsert_one(&mut stmt, record) {
                    Ok(action) => {
                        tx.execute_batch("RELEASE SAVEPOINT order_upsert")?;
                        results.push(Ok(action));
                    }
                    Err(e) => {
                        tx.execute_batch(
                            "ROLLBACK TO SAVEPOINT order_upsert; RELEASE SAVEPOINT order_upsert",
                        )?;
                        if e.is_connectivity() {
                            // tx 随 drop 回滚
                            error!(order_number = %record.order_number, error = %e, "落库过程中数据库不可用");
                            return Err(e);
                        }
                        debug!(order_number = %record.order_number, error = %e, "单条 upsert 失败");
                        results.push(Err(e));
                    }
                }
            }
        }
        tx.commit()?;

        Ok(results)
    }

    fn find_by_order_number(&self, order_number: &str) -> RepositoryResult<Option<OrderEntity>> {
        let conn = self.get_conn()?;
        let entity = conn
            .query_row(
                r#"
                SELECT id, orden, aviso, fecha_inicio, texto_breve, ubicacion_tecnica,
                       pto_trb_res, autor, status_usuario, status_sistema, costo,
                       total_general, import_revision, created_at, updated_at
                FROM ordenes_sap
                WHERE orden = ?1
                "#,
                params![order_number],
                |row| {
                    Ok(OrderEntity {
                        id: row.get(0)?,
                        record: OrderRecord {
                            order_number: row.get(1)?,
                            notice_number: row.get(2)?,
                            start_date: row.get(3)?,
                            short_text: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                            technical_location: row.get(5)?,
                            responsible_work_center: row.get(6)?,
                            author: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
                            user_status: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
                            system_status: row.get(9)?,
                            actual_cost: row.get(10)?,
                            total_general: row.get(11)?,
                        },
                        import_revision: row.get(12)?,
                        created_at: row.get(13)?,
                        updated_at: row.get(14)?,
                    })
                },
            )
            .optional()?;
        Ok(entity)
    }

    fn count_orders(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM ordenes_sap", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
