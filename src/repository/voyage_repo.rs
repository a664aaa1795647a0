// ==========================================
// KLine 提单导入 - 航次数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 借用连接,可直接传入事务
// ==========================================

use crate::domain::types::VoyageStatus;
use crate::domain::voyage::{NewVoyage, Voyage};
use crate::repository::error::RepositoryResult;
use rusqlite::{params, Connection, OptionalExtension, Row};

const VOYAGE_COLUMNS: &str = r#"
    id, voyage_number, company_id, vessel_name, voyage_ref,
    origin_port_id, destination_port_id, voyage_type, cargo_type, status,
    estimated_departure, estimated_arrival, created_at
"#;

fn map_voyage_row(row: &Row<'_>) -> rusqlite::Result<Voyage> {
    Ok(Voyage {
        id: row.get(0)?,
        voyage_number: row.get(1)?,
        company_id: row.get(2)?,
        vessel_name: row.get(3)?,
        voyage_ref: row.get(4)?,
        origin_port_id: row.get(5)?,
        destination_port_id: row.get(6)?,
        voyage_type: row.get(7)?,
        cargo_type: row.get(8)?,
        status: VoyageStatus::from_db_str(&row.get::<_, String>(9)?),
        estimated_departure: row.get(10)?,
        estimated_arrival: row.get(11)?,
        created_at: row.get(12)?,
    })
}

// ==========================================
// VoyageRepository - 航次仓储
// ==========================================
pub struct VoyageRepository<'a> {
    conn: &'a Connection,
}

impl<'a> VoyageRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// 按合成航次号查找
    pub fn find_by_number(&self, voyage_number: &str) -> RepositoryResult<Option<Voyage>> {
        let sql = format!("SELECT {} FROM voyages WHERE voyage_number = ?1", VOYAGE_COLUMNS);
        let voyage = self
            .conn
            .query_row(&sql, params![voyage_number], map_voyage_row)
            .optional()?;
        Ok(voyage)
    }

    /// 查找或创建（ON CONFLICT(voyage_number) DO NOTHING 后回读）
    ///
    /// # 返回
    /// - (Voyage, true): 本次新建
    /// - (Voyage, false): 已存在（沿用原航次,不更新港口/日期）
    pub fn upsert(&self, voyage: &NewVoyage) -> RepositoryResult<(Voyage, bool)> {
        let affected = self.conn.execute(
            r#"
            INSERT INTO voyages (
                voyage_number, company_id, vessel_name, voyage_ref,
                origin_port_id, destination_port_id, voyage_type, cargo_type, status,
                estimated_departure, estimated_arrival, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ON CONFLICT(voyage_number) DO NOTHING
            "#,
            params![
                voyage.voyage_number,
                voyage.company_id,
                voyage.vessel_name,
                voyage.voyage_ref,
                voyage.origin_port_id,
                voyage.destination_port_id,
                voyage.voyage_type,
                voyage.cargo_type,
                voyage.status.to_db_str(),
                voyage.estimated_departure,
                voyage.estimated_arrival,
                voyage.created_at,
            ],
        )?;

        let sql = format!("SELECT {} FROM voyages WHERE voyage_number = ?1", VOYAGE_COLUMNS);
        let stored = self
            .conn
            .query_row(&sql, params![voyage.voyage_number], map_voyage_row)?;
        Ok((stored, affected > 0))
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<Voyage>> {
        let sql = format!("SELECT {} FROM voyages ORDER BY id", VOYAGE_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let voyages = stmt
            .query_map([], map_voyage_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(voyages)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM voyages", [], |row| row.get(0))?;
        Ok(n)
    }
}
