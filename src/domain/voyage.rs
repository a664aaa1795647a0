// ==========================================
// KLine 提单导入 - 航次领域模型
// ==========================================
// 用途: 共享参考实体,按合成航次号查找或创建
// 对齐: voyages 表（voyage_number 唯一）
// ==========================================

use crate::domain::types::VoyageStatus;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// VoyageInfo - 航次抽取结果（派生值对象）
// ==========================================
// voyage_number 始终为合成值,非文件原始数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoyageInfo {
    pub voyage_number: String,
    pub vessel_name: Option<String>,
    pub voyage_ref: Option<String>,
}

// ==========================================
// Voyage - 航次（已落库）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voyage {
    pub id: i64,
    pub voyage_number: String,
    pub company_id: i64,
    pub vessel_name: Option<String>,
    pub voyage_ref: Option<String>,
    pub origin_port_id: i64,
    pub destination_port_id: i64,
    pub voyage_type: String,
    pub cargo_type: String,
    pub status: VoyageStatus,
    pub estimated_departure: NaiveDate, // 占位值: 导入时刻 + 出发偏移
    pub estimated_arrival: NaiveDate,   // 占位值: 导入时刻 + 到达偏移
    pub created_at: NaiveDateTime,
}

// ==========================================
// NewVoyage - 待插入航次
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVoyage {
    pub voyage_number: String,
    pub company_id: i64,
    pub vessel_name: Option<String>,
    pub voyage_ref: Option<String>,
    pub origin_port_id: i64,
    pub destination_port_id: i64,
    pub voyage_type: String,
    pub cargo_type: String,
    pub status: VoyageStatus,
    pub estimated_departure: NaiveDate,
    pub estimated_arrival: NaiveDate,
    pub created_at: NaiveDateTime,
}
