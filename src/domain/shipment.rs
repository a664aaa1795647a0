// ==========================================
// KLine 提单导入 - 货运/提单/货物明细领域模型
// ==========================================
// 红线: Shipment → BillOfLading → ShipmentItem 为严格从属树
// 用途: 每个提单分组无条件新建,导入后不再修改
// ==========================================

use crate::domain::types::DocumentStatus;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Shipment - 货运
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    pub id: i64,
    pub voyage_id: i64,
    pub company_id: i64,
    pub shipment_number: String,
    pub vessel_name: Option<String>,
    pub status: DocumentStatus,
    pub total_packages: i64,
    pub total_weight_kg: f64,
    pub total_volume_m3: f64,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewShipment {
    pub voyage_id: i64,
    pub company_id: i64,
    pub shipment_number: String,
    pub vessel_name: Option<String>,
    pub status: DocumentStatus,
    pub total_packages: i64,
    pub total_weight_kg: f64,
    pub total_volume_m3: f64,
    pub created_at: NaiveDateTime,
}

// ==========================================
// BillOfLading - 提单
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillOfLading {
    pub id: i64,
    pub shipment_id: i64,
    pub bill_number: String,
    pub loading_port_id: i64,
    pub discharge_port_id: i64,
    pub cargo_description: String,
    pub total_packages: i64,
    pub gross_weight_kg: f64,
    pub volume_m3: f64,
    pub currency: String,
    pub status: DocumentStatus,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBillOfLading {
    pub shipment_id: i64,
    pub bill_number: String,
    pub loading_port_id: i64,
    pub discharge_port_id: i64,
    pub cargo_description: String,
    pub total_packages: i64,
    pub gross_weight_kg: f64,
    pub volume_m3: f64,
    pub currency: String,
    pub status: DocumentStatus,
    pub created_at: NaiveDateTime,
}

// ==========================================
// ShipmentItem - 货物明细
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentItem {
    pub id: i64,
    pub bill_of_lading_id: i64,
    pub shipment_id: i64,
    pub line_number: i64,
    pub description: String,
    pub quantity: i64,
    pub weight_kg: f64,
    pub volume_m3: f64,
    pub currency: String,
    pub status: DocumentStatus,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewShipmentItem {
    pub bill_of_lading_id: i64,
    pub shipment_id: i64,
    pub line_number: i64,
    pub description: String,
    pub quantity: i64,
    pub weight_kg: f64,
    pub volume_m3: f64,
    pub currency: String,
    pub status: DocumentStatus,
    pub created_at: NaiveDateTime,
}
