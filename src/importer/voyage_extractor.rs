// ==========================================
// KLine 提单导入 - 航次/船舶抽取
// ==========================================
// 规则: 每个航次/船舶标签只看第一行,标识符 + 余下文本
// 规则: voyage_ref / vessel_name 各自先到先得
// 航次号: {前缀}{voyage_ref}-{YYYYMMDD} 或 {前缀}AUTO-{YYYYMMDDHHMMSS}
// ==========================================

use crate::domain::manifest::RecordGroup;
use crate::domain::types::{Extraction, RecordTag};
use crate::domain::voyage::VoyageInfo;
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

pub const VOYAGE_TAGS: [RecordTag; 2] = [RecordTag::VoyageRecord, RecordTag::VesselRecord];

static VOYAGE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z0-9][A-Z0-9\-/]*)\s*(.*)$").expect("航次正则"));

/// 航次参考号与船名（未合成航次号）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoyageCandidates {
    pub voyage_ref: Extraction<String>,
    pub vessel_name: Extraction<String>,
}

/// 拆分单行: (标识符, 余下文本)
pub fn split_voyage_line(line: &str) -> Option<(String, String)> {
    let caps = VOYAGE_LINE.captures(line.trim())?;
    Some((caps[1].to_string(), caps[2].trim().to_string()))
}

pub fn extract_voyage_candidates(group: &RecordGroup) -> VoyageCandidates {
    let mut result = VoyageCandidates::default();

    for tag in VOYAGE_TAGS.iter() {
        let first = match group.lines(tag).first() {
            Some(line) => line,
            None => continue,
        };
        let (identifier, remainder) = match split_voyage_line(first) {
            Some(parts) => parts,
            None => continue,
        };

        if !result.voyage_ref.is_found() && !identifier.is_empty() {
            result.voyage_ref = Extraction::Found(identifier);
        }
        if !result.vessel_name.is_found() && !remainder.is_empty() {
            result.vessel_name = Extraction::Found(remainder);
        }
    }

    result
}

/// 合成航次号
pub fn synthesize_voyage_number(
    prefix: &str,
    voyage_ref: Option<&str>,
    now: NaiveDateTime,
) -> String {
    match voyage_ref {
        Some(r) => format!("{}{}-{}", prefix, r, now.format("%Y%m%d")),
        None => format!("{}AUTO-{}", prefix, now.format("%Y%m%d%H%M%S")),
    }
}

/// 抽取航次信息并合成航次号
pub fn extract_voyage(group: &RecordGroup, prefix: &str, now: NaiveDateTime) -> VoyageInfo {
    let candidates = extract_voyage_candidates(group);
    let voyage_ref = candidates.voyage_ref.found();

    VoyageInfo {
        voyage_number: synthesize_voyage_number(prefix, voyage_ref.as_deref(), now),
        vessel_name: candidates.vessel_name.found(),
        voyage_ref,
    }
}
