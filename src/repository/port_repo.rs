// ==========================================
// KLine 提单导入 - 港口数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑（名称/国家/类型推断在导入层）
// 说明: 借用连接,可直接传入事务（Transaction 解引用为 Connection）
// ==========================================

use crate::domain::port::{NewPort, Port};
use crate::domain::types::PortType;
use crate::repository::error::RepositoryResult;
use rusqlite::{params, Connection, OptionalExtension, Row};

const PORT_COLUMNS: &str = "id, code, name, country_id, port_type, active, created_at";

fn map_port_row(row: &Row<'_>) -> rusqlite::Result<Port> {
    Ok(Port {
        id: row.get(0)?,
        code: row.get(1)?,
        name: row.get(2)?,
        country_id: row.get(3)?,
        port_type: PortType::from_db_str(&row.get::<_, String>(4)?),
        active: row.get::<_, i64>(5)? != 0,
        created_at: row.get(6)?,
    })
}

// ==========================================
// PortRepository - 港口仓储
// ==========================================
pub struct PortRepository<'a> {
    conn: &'a Connection,
}

impl<'a> PortRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// 按业务代码精确查找
    pub fn find_by_code(&self, code: &str) -> RepositoryResult<Option<Port>> {
        let sql = format!("SELECT {} FROM ports WHERE code = ?1", PORT_COLUMNS);
        let port = self
            .conn
            .query_row(&sql, params![code], map_port_row)
            .optional()?;
        Ok(port)
    }

    /// 插入港口（代码已存在则不做任何事）
    ///
    /// # 返回
    /// - Ok(true): 新插入
    /// - Ok(false): 代码已存在
    pub fn insert_if_absent(&self, port: &NewPort) -> RepositoryResult<bool> {
        let affected = self.conn.execute(
            r#"
            INSERT INTO ports (code, name, country_id, port_type, active, created_at)
            VALUES (?1, ?2, ?3, ?4, 1, ?5)
            ON CONFLICT(code) DO NOTHING
            "#,
            params![
                port.code,
                port.name,
                port.country_id,
                port.port_type.to_db_str(),
                port.created_at,
            ],
        )?;
        Ok(affected > 0)
    }

    /// 查找或创建（upsert 后回读,避免先查后插的竞态）
    ///
    /// # 返回
    /// - (Port, true): 本次新建
    /// - (Port, false): 已存在
    pub fn upsert(&self, port: &NewPort) -> RepositoryResult<(Port, bool)> {
        let inserted = self.insert_if_absent(port)?;
        let sql = format!("SELECT {} FROM ports WHERE code = ?1", PORT_COLUMNS);
        let stored = self.conn.query_row(&sql, params![port.code], map_port_row)?;
        Ok((stored, inserted))
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<Port>> {
        let sql = format!("SELECT {} FROM ports ORDER BY code", PORT_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let ports = stmt
            .query_map([], map_port_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ports)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM ports", [], |row| row.get(0))?;
        Ok(n)
    }
}
