// ==========================================
// KLine 提单导入 - 核心库
// ==========================================
// 技术栈: Rust + SQLite (rusqlite) + tracing
// 系统定位: 单厂商平面文件 → 航次/货运/提单/货物明细
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 切分/分组/抽取/落库
pub mod importer;

// 配置层 - 导入配置与覆写
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 导入报告
pub mod report;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    DocumentStatus, Extraction, PortCode, PortRole, PortType, RecordTag, VoyageStatus,
};

// 领域实体
pub use domain::{
    BillOfLading, BillOutcome, BillPreview, ImportSummary, Port, RecordGroup, Shipment,
    ShipmentItem, Voyage, VoyageInfo,
};

// 配置
pub use config::{ConfigManager, FixedClock, ImportConfig, SystemClock};

// 导入器
pub use importer::{ImportError, ImportResult, KLineImporter, KLineImporterImpl};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "KLine 提单导入";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
