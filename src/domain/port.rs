// ==========================================
// KLine 提单导入 - 港口领域模型
// ==========================================
// 用途: 共享参考实体,导入层只读或插入,从不删除
// 对齐: ports 表（code 唯一）
// ==========================================

use crate::domain::types::PortType;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Port - 港口（已落库）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub id: i64,
    pub code: String,      // 业务代码（唯一键,如 ARBUE）
    pub name: String,      // 港口名称
    pub country_id: i64,   // 国家 ID（由代码前两位推断）
    pub port_type: PortType,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

// ==========================================
// NewPort - 待插入港口
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPort {
    pub code: String,
    pub name: String,
    pub country_id: i64,
    pub port_type: PortType,
    pub created_at: NaiveDateTime,
}
