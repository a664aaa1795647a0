// ==========================================
// KLine 提单导入 - 导入层
// ==========================================
// 职责: 平面文件 → 提单分组 → 字段抽取 → 实体落库
// 组件: 切分器 / 分组器 / 抽取器 / 实体解析器 / 编排器
// ==========================================

// 模块声明
pub mod bill_grouper;
pub mod cargo_extractor;
pub mod entity_resolver;
pub mod error;
pub mod kline_importer_impl;
pub mod kline_importer_trait;
pub mod port_extractor;
pub mod preview;
pub mod tokenizer;
pub mod voyage_extractor;

// 重导出核心类型
pub use bill_grouper::{group_bills, BillGrouper};
pub use cargo_extractor::{
    extract_cargo_description, extract_quantity, extract_volume, extract_weight, summarize_cargo,
};
pub use entity_resolver::EntityResolver;
pub use error::{ImportError, ImportResult};
pub use kline_importer_impl::KLineImporterImpl;
pub use port_extractor::{extract_port_code, extract_ports};
pub use preview::{preview_content, preview_file};
pub use tokenizer::{decode_content, read_flat_file, tokenize_content, tokenize_line, TaggedLine};
pub use voyage_extractor::{extract_voyage, synthesize_voyage_number};

// 重导出 Trait 接口
pub use kline_importer_trait::KLineImporter;
