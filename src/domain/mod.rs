// ==========================================
// KLine 提单导入 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、导入中间产物
// 红线: 不含数据访问逻辑,不含抽取逻辑
// ==========================================

pub mod manifest;
pub mod port;
pub mod shipment;
pub mod types;
pub mod voyage;

// 重导出核心类型
pub use manifest::{
    BillOutcome, BillOutcomeStatus, BillPreview, CargoLine, CargoSummary, ImportBatch,
    ImportSummary, PortInfo, RecordGroup,
};
pub use port::{NewPort, Port};
pub use shipment::{BillOfLading, NewBillOfLading, NewShipment, NewShipmentItem, Shipment, ShipmentItem};
pub use types::{
    DocumentStatus, Extraction, PortCode, PortRole, PortType, RecordTag, VoyageStatus,
    TAG_WIDTH, UNKNOWN_DEST, UNKNOWN_ORIGIN,
};
pub use voyage::{NewVoyage, Voyage, VoyageInfo};
