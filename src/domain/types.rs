// ==========================================
// KLine 提单导入 - 领域类型定义
// ==========================================
// 职责: 记录标签词表、抽取结果、港口/航次/货运状态枚举
// 红线: 纯类型定义,不含数据访问
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 记录标签宽度（每行前 8 个字符）
pub const TAG_WIDTH: usize = 8;

/// 起运港哨兵值（抽取失败时兜底）
pub const UNKNOWN_ORIGIN: &str = "UNKNOWN-ORIGIN";

/// 目的港哨兵值（抽取失败时兜底）
pub const UNKNOWN_DEST: &str = "UNKNOWN-DEST";

// ==========================================
// 记录标签 (Record Tag)
// ==========================================
// 封闭词表 + Other 兜底,未识别标签显式保留但不参与抽取
// 序列化格式: 原始 8 位标签文本（可作 JSON 对象键）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordTag {
    BillStart,       // BLHEADER: 新提单开始,内容为提单号
    LoadPort,        // LOADPORT: 装货港
    PortOfLoading,   // POLREC00: 装货港
    DischargePort,   // DISCPORT: 卸货港
    PortOfDischarge, // PODREC00: 卸货港
    PortRecord,      // PORTREC0: 通用港口记录
    VoyageRecord,    // VOYREC00: 航次记录
    VesselRecord,    // VESSEL00: 船舶记录
    Description,     // DESCREC0: 货物描述行
    Measurement,     // MEASREC0: 提单汇总计量
    Other(String),   // 未识别标签
}

impl RecordTag {
    /// 从已 trim 的 8 位标签解析
    pub fn parse(raw: &str) -> Self {
        match raw {
            "BLHEADER" => RecordTag::BillStart,
            "LOADPORT" => RecordTag::LoadPort,
            "POLREC00" => RecordTag::PortOfLoading,
            "DISCPORT" => RecordTag::DischargePort,
            "PODREC00" => RecordTag::PortOfDischarge,
            "PORTREC0" => RecordTag::PortRecord,
            "VOYREC00" => RecordTag::VoyageRecord,
            "VESSEL00" => RecordTag::VesselRecord,
            "DESCREC0" => RecordTag::Description,
            "MEASREC0" => RecordTag::Measurement,
            other => RecordTag::Other(other.to_string()),
        }
    }

    /// 文件中的原始标签文本
    pub fn as_str(&self) -> &str {
        match self {
            RecordTag::BillStart => "BLHEADER",
            RecordTag::LoadPort => "LOADPORT",
            RecordTag::PortOfLoading => "POLREC00",
            RecordTag::DischargePort => "DISCPORT",
            RecordTag::PortOfDischarge => "PODREC00",
            RecordTag::PortRecord => "PORTREC0",
            RecordTag::VoyageRecord => "VOYREC00",
            RecordTag::VesselRecord => "VESSEL00",
            RecordTag::Description => "DESCREC0",
            RecordTag::Measurement => "MEASREC0",
            RecordTag::Other(raw) => raw.as_str(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, RecordTag::Other(_))
    }
}

impl fmt::Display for RecordTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RecordTag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RecordTag {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(RecordTag::parse(raw.trim()))
    }
}

// ==========================================
// 抽取结果 (Extraction)
// ==========================================
// 抽取器只报告"找到/未找到",兜底策略由调用方决定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Extraction<T> {
    Found(T),
    NotFound,
}

impl<T> Extraction<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Extraction::Found(_))
    }

    pub fn found(self) -> Option<T> {
        match self {
            Extraction::Found(v) => Some(v),
            Extraction::NotFound => None,
        }
    }

    pub fn as_ref(&self) -> Extraction<&T> {
        match self {
            Extraction::Found(v) => Extraction::Found(v),
            Extraction::NotFound => Extraction::NotFound,
        }
    }

    pub fn unwrap_or(self, default: T) -> T {
        match self {
            Extraction::Found(v) => v,
            Extraction::NotFound => default,
        }
    }

    /// 已找到则保持,否则尝试下一个来源（先到先得）
    pub fn or_else<F: FnOnce() -> Extraction<T>>(self, f: F) -> Extraction<T> {
        match self {
            Extraction::Found(v) => Extraction::Found(v),
            Extraction::NotFound => f(),
        }
    }
}

impl<T> Default for Extraction<T> {
    fn default() -> Self {
        Extraction::NotFound
    }
}

impl<T> From<Option<T>> for Extraction<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Extraction::Found(v),
            None => Extraction::NotFound,
        }
    }
}

// ==========================================
// 港口代码 (Port Code)
// ==========================================
// 哨兵值与真实代码在类型层面可区分
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "code", rename_all = "snake_case")]
pub enum PortCode {
    Extracted(String),
    Sentinel(&'static str),
}

impl PortCode {
    /// 抽取结果 + 哨兵兜底
    pub fn or_sentinel(extraction: Extraction<String>, sentinel: &'static str) -> Self {
        match extraction {
            Extraction::Found(code) => PortCode::Extracted(code),
            Extraction::NotFound => PortCode::Sentinel(sentinel),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            PortCode::Extracted(code) => code.as_str(),
            PortCode::Sentinel(code) => code,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, PortCode::Sentinel(_))
    }
}

impl fmt::Display for PortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ==========================================
// 港口角色 (Port Role)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortRole {
    Origin,      // 装货港 → 起运港
    Destination, // 卸货港 → 目的港
    Generic,     // 通用: 先补起运港,再补目的港
}

// ==========================================
// 港口类型 (Port Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortType {
    River,
    Maritime,
}

impl PortType {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            PortType::River => "river",
            PortType::Maritime => "maritime",
        }
    }

    pub fn from_db_str(s: &str) -> Self {
        match s {
            "river" => PortType::River,
            _ => PortType::Maritime,
        }
    }
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

// ==========================================
// 航次状态 (Voyage Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoyageStatus {
    Planning,
    InProgress,
    Completed,
    Cancelled,
}

impl VoyageStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            VoyageStatus::Planning => "planning",
            VoyageStatus::InProgress => "in_progress",
            VoyageStatus::Completed => "completed",
            VoyageStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_db_str(s: &str) -> Self {
        match s {
            "in_progress" => VoyageStatus::InProgress,
            "completed" => VoyageStatus::Completed,
            "cancelled" => VoyageStatus::Cancelled,
            _ => VoyageStatus::Planning,
        }
    }
}

// ==========================================
// 单据状态 (Document Status)
// ==========================================
// 货运/提单/明细共用: 导入时一律为草稿
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Draft,
    Planning,
    Confirmed,
}

impl DocumentStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Planning => "planning",
            DocumentStatus::Confirmed => "confirmed",
        }
    }

    pub fn from_db_str(s: &str) -> Self {
        match s {
            "planning" => DocumentStatus::Planning,
            "confirmed" => DocumentStatus::Confirmed,
            _ => DocumentStatus::Draft,
        }
    }
}
