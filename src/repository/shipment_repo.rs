// ==========================================
// KLine 提单导入 - 货运/提单/货物明细仓储
// ==========================================
// 红线: Repository 不含业务逻辑,只做无条件插入与查询
// 说明: 三张表同属一棵从属树,由导入层在同一事务内写入
// ==========================================

use crate::domain::shipment::{
    BillOfLading, NewBillOfLading, NewShipment, NewShipmentItem, Shipment, ShipmentItem,
};
use crate::domain::types::DocumentStatus;
use crate::repository::error::RepositoryResult;
use rusqlite::{params, Connection, Row};

fn map_bill_row(row: &Row<'_>) -> rusqlite::Result<BillOfLading> {
    Ok(BillOfLading {
        id: row.get(0)?,
        shipment_id: row.get(1)?,
        bill_number: row.get(2)?,
        loading_port_id: row.get(3)?,
        discharge_port_id: row.get(4)?,
        cargo_description: row.get(5)?,
        total_packages: row.get(6)?,
        gross_weight_kg: row.get(7)?,
        volume_m3: row.get(8)?,
        currency: row.get(9)?,
        status: DocumentStatus::from_db_str(&row.get::<_, String>(10)?),
        created_at: row.get(11)?,
    })
}

fn map_item_row(row: &Row<'_>) -> rusqlite::Result<ShipmentItem> {
    Ok(ShipmentItem {
        id: row.get(0)?,
        bill_of_lading_id: row.get(1)?,
        shipment_id: row.get(2)?,
        line_number: row.get(3)?,
        description: row.get(4)?,
        quantity: row.get(5)?,
        weight_kg: row.get(6)?,
        volume_m3: row.get(7)?,
        currency: row.get(8)?,
        status: DocumentStatus::from_db_str(&row.get::<_, String>(9)?),
        created_at: row.get(10)?,
    })
}

// ==========================================
// ShipmentRepository - 货运仓储
// ==========================================
pub struct ShipmentRepository<'a> {
    conn: &'a Connection,
}

impl<'a> ShipmentRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    // ===== 货运 =====

    pub fn insert_shipment(&self, shipment: &NewShipment) -> RepositoryResult<Shipment> {
        self.conn.execute(
            r#"
            INSERT INTO shipments (
                voyage_id, company_id, shipment_number, vessel_name, status,
                total_packages, total_weight_kg, total_volume_m3, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                shipment.voyage_id,
                shipment.company_id,
                shipment.shipment_number,
                shipment.vessel_name,
                shipment.status.to_db_str(),
                shipment.total_packages,
                shipment.total_weight_kg,
                shipment.total_volume_m3,
                shipment.created_at,
            ],
        )?;

        Ok(Shipment {
            id: self.conn.last_insert_rowid(),
            voyage_id: shipment.voyage_id,
            company_id: shipment.company_id,
            shipment_number: shipment.shipment_number.clone(),
            vessel_name: shipment.vessel_name.clone(),
            status: shipment.status,
            total_packages: shipment.total_packages,
            total_weight_kg: shipment.total_weight_kg,
            total_volume_m3: shipment.total_volume_m3,
            created_at: shipment.created_at,
        })
    }

    pub fn count_shipments_by_voyage(&self, voyage_id: i64) -> RepositoryResult<i64> {
        let n = self.conn.query_row(
            "SELECT COUNT(*) FROM shipments WHERE voyage_id = ?1",
            params![voyage_id],
            |row| row.get(0),
        )?;
        Ok(n)
    }

    // ===== 提单 =====

    pub fn insert_bill(&self, bill: &NewBillOfLading) -> RepositoryResult<BillOfLading> {
        self.conn.execute(
            r#"
            INSERT INTO bills_of_lading (
                shipment_id, bill_number, loading_port_id, discharge_port_id,
                cargo_description, total_packages, gross_weight_kg, volume_m3,
                currency, status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                bill.shipment_id,
                bill.bill_number,
                bill.loading_port_id,
                bill.discharge_port_id,
                bill.cargo_description,
                bill.total_packages,
                bill.gross_weight_kg,
                bill.volume_m3,
                bill.currency,
                bill.status.to_db_str(),
                bill.created_at,
            ],
        )?;

        Ok(BillOfLading {
            id: self.conn.last_insert_rowid(),
            shipment_id: bill.shipment_id,
            bill_number: bill.bill_number.clone(),
            loading_port_id: bill.loading_port_id,
            discharge_port_id: bill.discharge_port_id,
            cargo_description: bill.cargo_description.clone(),
            total_packages: bill.total_packages,
            gross_weight_kg: bill.gross_weight_kg,
            volume_m3: bill.volume_m3,
            currency: bill.currency.clone(),
            status: bill.status,
            created_at: bill.created_at,
        })
    }

    /// 按提单号查询（同一提单号可能因重复导入出现多条）
    pub fn find_bills_by_number(&self, bill_number: &str) -> RepositoryResult<Vec<BillOfLading>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, shipment_id, bill_number, loading_port_id, discharge_port_id,
                   cargo_description, total_packages, gross_weight_kg, volume_m3,
                   currency, status, created_at
            FROM bills_of_lading WHERE bill_number = ?1 ORDER BY id
            "#,
        )?;
        let bills = stmt
            .query_map(params![bill_number], map_bill_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(bills)
    }

    pub fn count_bills(&self) -> RepositoryResult<i64> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM bills_of_lading", [], |row| row.get(0))?;
        Ok(n)
    }

    // ===== 货物明细 =====

    pub fn insert_item(&self, item: &NewShipmentItem) -> RepositoryResult<ShipmentItem> {
        self.conn.execute(
            r#"
            INSERT INTO shipment_items (
                bill_of_lading_id, shipment_id, line_number, description,
                quantity, weight_kg, volume_m3, currency, status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                item.bill_of_lading_id,
                item.shipment_id,
                item.line_number,
                item.description,
                item.quantity,
                item.weight_kg,
                item.volume_m3,
                item.currency,
                item.status.to_db_str(),
                item.created_at,
            ],
        )?;

        Ok(ShipmentItem {
            id: self.conn.last_insert_rowid(),
            bill_of_lading_id: item.bill_of_lading_id,
            shipment_id: item.shipment_id,
            line_number: item.line_number,
            description: item.description.clone(),
            quantity: item.quantity,
            weight_kg: item.weight_kg,
            volume_m3: item.volume_m3,
            currency: item.currency.clone(),
            status: item.status,
            created_at: item.created_at,
        })
    }

    pub fn list_items_by_bill(&self, bill_of_lading_id: i64) -> RepositoryResult<Vec<ShipmentItem>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, bill_of_lading_id, shipment_id, line_number, description,
                   quantity, weight_kg, volume_m3, currency, status, created_at
            FROM shipment_items WHERE bill_of_lading_id = ?1 ORDER BY line_number
            "#,
        )?;
        let items = stmt
            .query_map(params![bill_of_lading_id], map_item_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    pub fn count_items(&self) -> RepositoryResult<i64> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM shipment_items", [], |row| row.get(0))?;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_schema, open_sqlite_connection};
    use crate::repository::error::RepositoryError;

    #[test]
    fn test_insert_bill_requires_existing_shipment() {
        let conn = open_sqlite_connection(":memory:").unwrap();
        init_schema(&conn).unwrap();
        let repo = ShipmentRepository::new(&conn);

        let now = chrono::NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let result = repo.insert_bill(&NewBillOfLading {
            shipment_id: 999,
            bill_number: "BL001".to_string(),
            loading_port_id: 1,
            discharge_port_id: 2,
            cargo_description: "GENERAL CARGO".to_string(),
            total_packages: 1,
            gross_weight_kg: 0.0,
            volume_m3: 0.0,
            currency: "USD".to_string(),
            status: DocumentStatus::Draft,
            created_at: now,
        });

        assert!(matches!(result, Err(RepositoryError::ForeignKeyViolation(_))));
    }
}
