// ==========================================
// KLine 提单导入 - 实体解析/创建
// ==========================================
// 共享实体: Port / Voyage → 查找或创建（upsert,幂等）
// 从属实体: Shipment / BillOfLading / ShipmentItem → 每个提单无条件新建
// 约束: 只借用连接,事务边界由编排层控制
// ==========================================

use crate::config::{config_keys, ImportConfig};
use crate::domain::manifest::CargoSummary;
use crate::domain::port::{NewPort, Port};
use crate::domain::shipment::{
    BillOfLading, NewBillOfLading, NewShipment, NewShipmentItem, Shipment, ShipmentItem,
};
use crate::domain::types::{DocumentStatus, PortType, VoyageStatus};
use crate::domain::voyage::{NewVoyage, Voyage, VoyageInfo};
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::{PortRepository, ShipmentRepository, VoyageRepository};
use chrono::{Duration, NaiveDate};
use rusqlite::Connection;
use tracing::{debug, info};

// ==========================================
// EntityResolver - 实体解析器
// ==========================================
pub struct EntityResolver<'a> {
    conn: &'a Connection,
    config: &'a ImportConfig,
}

impl<'a> EntityResolver<'a> {
    /// # 参数
    /// - conn: 连接或事务（Transaction 解引用为 Connection）
    /// - config: 导入配置
    pub fn new(conn: &'a Connection, config: &'a ImportConfig) -> Self {
        Self { conn, config }
    }

    /// 构造待建港口（名称/国家/类型推断）
    pub fn build_new_port(&self, code: &str) -> NewPort {
        let name = self
            .config
            .port_names
            .get(code)
            .cloned()
            .unwrap_or_else(|| format!("Puerto {}", code));

        let (country_id, port_type) = match self.config.country_for_code(code) {
            Some(country) if country.river => (country.country_id, PortType::River),
            Some(country) => (country.country_id, PortType::Maritime),
            None => (self.config.fallback_country_id, PortType::Maritime),
        };

        NewPort {
            code: code.to_string(),
            name,
            country_id,
            port_type,
            created_at: self.config.now(),
        }
    }

    /// 查找或创建港口
    ///
    /// # 返回
    /// - Ok(None): 仅当 code 为 None
    pub fn find_or_create_port(&self, code: Option<&str>) -> ImportResult<Option<Port>> {
        let code = match code.map(str::trim).filter(|c| !c.is_empty()) {
            Some(code) => code,
            None => return Ok(None),
        };

        let repo = PortRepository::new(self.conn);
        if let Some(existing) = repo.find_by_code(code)? {
            return Ok(Some(existing));
        }

        let (port, inserted) = repo.upsert(&self.build_new_port(code))?;
        if inserted {
            info!(code = %port.code, name = %port.name, port_type = %port.port_type, "新建港口");
        }
        Ok(Some(port))
    }

    /// 查找或创建航次（按合成航次号）
    pub fn find_or_create_voyage(
        &self,
        info: &VoyageInfo,
        origin: &Port,
        destination: &Port,
    ) -> ImportResult<Voyage> {
        let repo = VoyageRepository::new(self.conn);
        if let Some(existing) = repo.find_by_number(&info.voyage_number)? {
            debug!(voyage_number = %existing.voyage_number, "沿用已有航次");
            return Ok(existing);
        }

        let now = self.config.now();
        let today = now.date();
        let new_voyage = NewVoyage {
            voyage_number: info.voyage_number.clone(),
            company_id: self.config.company_id,
            vessel_name: info.vessel_name.clone(),
            voyage_ref: info.voyage_ref.clone(),
            origin_port_id: origin.id,
            destination_port_id: destination.id,
            voyage_type: self.config.voyage_type.clone(),
            cargo_type: self.config.cargo_type.clone(),
            status: VoyageStatus::Planning,
            estimated_departure: offset_date(
                today,
                self.config.departure_offset_days,
                config_keys::DEPARTURE_OFFSET_DAYS,
            )?,
            estimated_arrival: offset_date(
                today,
                self.config.arrival_offset_days,
                config_keys::ARRIVAL_OFFSET_DAYS,
            )?,
            created_at: now,
        };

        let (voyage, inserted) = repo.upsert(&new_voyage)?;
        if inserted {
            info!(
                voyage_number = %voyage.voyage_number,
                origin = %origin.code,
                destination = %destination.code,
                "新建航次"
            );
        }
        Ok(voyage)
    }

    /// 新建货运（总量与提单一致）
    pub fn create_shipment(
        &self,
        voyage: &Voyage,
        bill_number: &str,
        cargo: &CargoSummary,
    ) -> ImportResult<Shipment> {
        let shipment = ShipmentRepository::new(self.conn).insert_shipment(&NewShipment {
            voyage_id: voyage.id,
            company_id: self.config.company_id,
            shipment_number: format!("{}-{}", voyage.voyage_number, bill_number),
            vessel_name: voyage.vessel_name.clone(),
            status: DocumentStatus::Draft,
            total_packages: cargo.total_packages,
            total_weight_kg: cargo.gross_weight_kg,
            total_volume_m3: cargo.volume_m3,
            created_at: self.config.now(),
        })?;
        Ok(shipment)
    }

    /// 新建提单
    pub fn create_bill_of_lading(
        &self,
        shipment: &Shipment,
        bill_number: &str,
        loading_port: &Port,
        discharge_port: &Port,
        cargo: &CargoSummary,
    ) -> ImportResult<BillOfLading> {
        let bill = ShipmentRepository::new(self.conn).insert_bill(&NewBillOfLading {
            shipment_id: shipment.id,
            bill_number: bill_number.to_string(),
            loading_port_id: loading_port.id,
            discharge_port_id: discharge_port.id,
            cargo_description: cargo.description.clone(),
            total_packages: cargo.total_packages,
            gross_weight_kg: cargo.gross_weight_kg,
            volume_m3: cargo.volume_m3,
            currency: self.config.default_currency.clone(),
            status: DocumentStatus::Draft,
            created_at: self.config.now(),
        })?;
        Ok(bill)
    }

    /// 新建货物明细（每条货物行一条,行号从 1 开始）
    pub fn create_shipment_items(
        &self,
        bill: &BillOfLading,
        cargo: &CargoSummary,
    ) -> ImportResult<Vec<ShipmentItem>> {
        let repo = ShipmentRepository::new(self.conn);
        let now = self.config.now();

        let mut items = Vec::with_capacity(cargo.lines.len());
        for (idx, line) in cargo.lines.iter().enumerate() {
            let item = repo.insert_item(&NewShipmentItem {
                bill_of_lading_id: bill.id,
                shipment_id: bill.shipment_id,
                line_number: idx as i64 + 1,
                description: line.description.clone(),
                quantity: line.quantity,
                weight_kg: line.weight_kg,
                volume_m3: line.volume_m3,
                currency: self.config.default_currency.clone(),
                status: DocumentStatus::Draft,
                created_at: now,
            })?;
            items.push(item);
        }

        debug!(bill_number = %bill.bill_number, items = items.len(), "货物明细已写入");
        Ok(items)
    }
}

/// 日期 + 偏移天数,溢出时返回配置错误
fn offset_date(today: NaiveDate, days: i64, key: &str) -> ImportResult<NaiveDate> {
    Duration::try_days(days)
        .and_then(|delta| today.checked_add_signed(delta))
        .ok_or_else(|| ImportError::ConfigValueError {
            key: key.to_string(),
            value: days.to_string(),
            message: "预计日期超出范围".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FixedClock;
    use crate::db::open_and_init;
    use crate::domain::manifest::CargoLine;
    use std::sync::Arc;

    fn config() -> ImportConfig {
        let now = NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        ImportConfig::default().with_clock(Arc::new(FixedClock(now)))
    }

    fn cargo() -> CargoSummary {
        CargoSummary {
            description: "STEEL".to_string(),
            total_packages: 3,
            gross_weight_kg: 30.0,
            volume_m3: 1.5,
            lines: vec![
                CargoLine {
                    description: "1 PKG STEEL 10 KGS".to_string(),
                    quantity: 1,
                    weight_kg: 10.0,
                    volume_m3: 0.5,
                },
                CargoLine {
                    description: "2 PKGS STEEL 20 KGS".to_string(),
                    quantity: 2,
                    weight_kg: 20.0,
                    volume_m3: 1.0,
                },
            ],
            placeholder_item: false,
        }
    }

    #[test]
    fn test_build_new_port_inference() {
        let config = config();
        let conn = open_and_init(":memory:").unwrap();
        let resolver = EntityResolver::new(&conn, &config);

        let arbue = resolver.build_new_port("ARBUE");
        assert_eq!(arbue.name, "Buenos Aires");
        assert_eq!(arbue.country_id, 1);
        assert_eq!(arbue.port_type, PortType::River);

        let santos = resolver.build_new_port("BRSSZ");
        assert_eq!(santos.country_id, 3);
        assert_eq!(santos.port_type, PortType::Maritime);

        let unknown = resolver.build_new_port("ZZXYZ");
        assert_eq!(unknown.name, "Puerto ZZXYZ");
        assert_eq!(unknown.country_id, config.fallback_country_id);
        assert_eq!(unknown.port_type, PortType::Maritime);
    }

    #[test]
    fn test_find_or_create_port_idempotent() {
        let config = config();
        let conn = open_and_init(":memory:").unwrap();
        let resolver = EntityResolver::new(&conn, &config);

        let first = resolver.find_or_create_port(Some("PYASU")).unwrap().unwrap();
        let second = resolver.find_or_create_port(Some("PYASU")).unwrap().unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(PortRepository::new(&conn).count().unwrap(), 1);

        assert!(resolver.find_or_create_port(None).unwrap().is_none());
    }

    #[test]
    fn test_voyage_dates_and_reuse() {
        let config = config();
        let conn = open_and_init(":memory:").unwrap();
        let resolver = EntityResolver::new(&conn, &config);
        let origin = resolver.find_or_create_port(Some("ARBUE")).unwrap().unwrap();
        let dest = resolver.find_or_create_port(Some("PYASU")).unwrap().unwrap();

        let info = VoyageInfo {
            voyage_number: "KL-045W-20250314".to_string(),
            vessel_name: Some("RIO PARANA".to_string()),
            voyage_ref: Some("045W".to_string()),
        };
        let voyage = resolver.find_or_create_voyage(&info, &origin, &dest).unwrap();
        assert_eq!(voyage.status, VoyageStatus::Planning);
        assert_eq!(voyage.estimated_departure, NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
        assert_eq!(voyage.estimated_arrival, NaiveDate::from_ymd_opt(2025, 3, 17).unwrap());

        let again = resolver.find_or_create_voyage(&info, &origin, &dest).unwrap();
        assert_eq!(voyage.id, again.id);
    }

    #[test]
    fn test_voyage_offset_overflow_is_error() {
        let mut config = config();
        config.arrival_offset_days = 999_999_999;
        let conn = open_and_init(":memory:").unwrap();
        let resolver = EntityResolver::new(&conn, &config);
        let origin = resolver.find_or_create_port(Some("ARBUE")).unwrap().unwrap();
        let dest = resolver.find_or_create_port(Some("PYASU")).unwrap().unwrap();

        let info = VoyageInfo {
            voyage_number: "KL-AUTO-20250314120000".to_string(),
            vessel_name: None,
            voyage_ref: None,
        };
        let err = resolver
            .find_or_create_voyage(&info, &origin, &dest)
            .unwrap_err();
        match err {
            ImportError::ConfigValueError { key, value, .. } => {
                assert_eq!(key, config_keys::ARRIVAL_OFFSET_DAYS);
                assert_eq!(value, "999999999");
            }
            other => panic!("expected ConfigValueError, got {:?}", other),
        }

        config.departure_offset_days = i64::MAX;
        let resolver = EntityResolver::new(&conn, &config);
        assert!(resolver.find_or_create_voyage(&info, &origin, &dest).is_err());
    }

    #[test]
    fn test_create_owned_tree() {
        let config = config();
        let conn = open_and_init(":memory:").unwrap();
        let resolver = EntityResolver::new(&conn, &config);
        let origin = resolver.find_or_create_port(Some("ARBUE")).unwrap().unwrap();
        let dest = resolver.find_or_create_port(Some("UYMVD")).unwrap().unwrap();
        let info = VoyageInfo {
            voyage_number: "KL-AUTO-20250314120000".to_string(),
            vessel_name: None,
            voyage_ref: None,
        };
        let voyage = resolver.find_or_create_voyage(&info, &origin, &dest).unwrap();
        let cargo = cargo();

        let shipment = resolver.create_shipment(&voyage, "BL001", &cargo).unwrap();
        let bill = resolver
            .create_bill_of_lading(&shipment, "BL001", &origin, &dest, &cargo)
            .unwrap();
        let items = resolver.create_shipment_items(&bill, &cargo).unwrap();

        assert_eq!(shipment.total_packages, 3);
        assert_eq!(bill.currency, "USD");
        assert_eq!(bill.status, DocumentStatus::Draft);
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].line_number, 2);
        assert_eq!(items[1].shipment_id, shipment.id);
    }
}
