// ==========================================
// KLine 提单导入 - 导入中间产物与结果模型
// ==========================================
// 用途: 导入管道中间结构（分组 → 抽取 → 汇总）及导入批次结果
// 生命周期: RecordGroup/PortInfo/CargoSummary 仅在导入流程内
// ==========================================

use crate::domain::types::{PortCode, RecordTag};
use crate::domain::voyage::VoyageInfo;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// RecordGroup - 单个提单范围内的记录分组
// ==========================================
// 标签 → 内容行列表（按出现顺序追加）
// tag_order 记录标签首次出现的顺序,遍历按文件顺序进行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordGroup {
    bill_number: String,
    records: BTreeMap<RecordTag, Vec<String>>,
    #[serde(skip)]
    tag_order: Vec<RecordTag>,
    line_count: usize,
}

impl RecordGroup {
    pub fn new(bill_number: impl Into<String>) -> Self {
        Self {
            bill_number: bill_number.into(),
            records: BTreeMap::new(),
            tag_order: Vec::new(),
            line_count: 0,
        }
    }

    pub fn push(&mut self, tag: RecordTag, content: impl Into<String>) {
        if !self.records.contains_key(&tag) {
            self.tag_order.push(tag.clone());
        }
        self.records.entry(tag).or_default().push(content.into());
        self.line_count += 1;
    }

    pub fn bill_number(&self) -> &str {
        &self.bill_number
    }

    /// 指定标签的内容行（不存在则为空切片）
    pub fn lines(&self, tag: &RecordTag) -> &[String] {
        self.records.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 按标签首次出现顺序遍历 (标签, 内容行)
    pub fn iter(&self) -> impl Iterator<Item = (&RecordTag, &Vec<String>)> {
        self.tag_order
            .iter()
            .filter_map(move |tag| self.records.get(tag).map(|lines| (tag, lines)))
    }

    /// 未识别标签（仅保留,不参与抽取）
    pub fn unknown_tags(&self) -> Vec<String> {
        self.tag_order
            .iter()
            .filter(|tag| !tag.is_known())
            .map(|tag| tag.as_str().to_string())
            .collect()
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    pub fn is_empty(&self) -> bool {
        self.line_count == 0
    }
}

// ==========================================
// PortInfo - 港口抽取结果（派生值对象）
// ==========================================
// origin/destination 抽取后必有值（哨兵兜底）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortInfo {
    pub origin: PortCode,
    pub destination: PortCode,
    pub loading_port: Option<String>,   // 仅来自装货港标签
    pub discharge_port: Option<String>, // 仅来自卸货港标签
}

// ==========================================
// CargoLine - 单行货物描述的抽取结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CargoLine {
    pub description: String,
    pub quantity: i64,
    pub weight_kg: f64,
    pub volume_m3: f64,
}

// ==========================================
// CargoSummary - 提单货物汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CargoSummary {
    pub description: String,   // 前三行描述拼接（或通用兜底）
    pub total_packages: i64,
    pub gross_weight_kg: f64,
    pub volume_m3: f64,
    pub lines: Vec<CargoLine>, // 每行对应一条 ShipmentItem
    pub placeholder_item: bool, // 无描述行时生成的通用明细
}

// ==========================================
// BillPreview - 试运行结果（不落库）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillPreview {
    pub bill_number: String,
    pub line_count: usize,
    pub ports: PortInfo,
    pub voyage: VoyageInfo,
    pub cargo: CargoSummary,
    pub unknown_tags: Vec<String>,
}

// ==========================================
// BillOutcome - 单个提单的处理结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillOutcomeStatus {
    Committed,
    RolledBack,
}

impl BillOutcomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillOutcomeStatus::Committed => "committed",
            BillOutcomeStatus::RolledBack => "rolled_back",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillOutcome {
    pub bill_number: String,
    pub status: BillOutcomeStatus,
    pub voyage_number: Option<String>,
    pub shipment_id: Option<i64>,
    pub message: Option<String>,
}

// ==========================================
// ImportSummary - 导入汇总（调用方唯一可见结果）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub batch_id: String,
    pub file_path: String,
    pub processed: usize,
    pub errors: usize,
    pub warnings: Vec<String>,
    pub bills: Vec<BillOutcome>,
    pub elapsed_ms: u128,
}

// ==========================================
// ImportBatch - 导入批次记录
// ==========================================
// 对齐: import_batches 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportBatch {
    pub batch_id: String,
    pub file_name: Option<String>,
    pub file_path: Option<String>,
    pub company_id: i64,
    pub processed: i64,
    pub errors: i64,
    pub warnings_json: String,
    pub imported_at: NaiveDateTime,
    pub elapsed_ms: i64,
}
