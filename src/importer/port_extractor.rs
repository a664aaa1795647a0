// ==========================================
// KLine 提单导入 - 港口抽取
// ==========================================
// 第一轮: 按标签优先级表逐行正则匹配（专用标签优先于通用标签）
// 第二轮: 起运/目的港仍缺失时,全量扫描已知港口代码白名单
// 兜底: 仍缺失则使用 UNKNOWN-ORIGIN / UNKNOWN-DEST 哨兵
// ==========================================

use crate::domain::manifest::{PortInfo, RecordGroup};
use crate::domain::types::{Extraction, PortCode, PortRole, RecordTag, UNKNOWN_DEST, UNKNOWN_ORIGIN};
use once_cell::sync::Lazy;
use regex::Regex;

/// 标签 → 港口角色（按优先级排序）
pub const PORT_TAG_PRIORITY: [(RecordTag, PortRole); 5] = [
    (RecordTag::LoadPort, PortRole::Origin),
    (RecordTag::PortOfLoading, PortRole::Origin),
    (RecordTag::DischargePort, PortRole::Destination),
    (RecordTag::PortOfDischarge, PortRole::Destination),
    (RecordTag::PortRecord, PortRole::Generic),
];

// 按顺序尝试,每行取第一个命中的模式
static PORT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^([A-Z]{2}[A-Z0-9]{3})\b",         // 行首代码
        r"\s([A-Z]{2}[A-Z0-9]{3})\s",        // 行中代码
        r"^([A-Z0-9]{3,6})$",                // 整行即代码
        r"(?i:PORT):\s*([A-Za-z0-9]{3,6})",  // PORT: 前缀
        r"([A-Z]{2}[A-Z0-9]{3})",            // 紧凑代码
    ]
    .iter()
    .map(|p| Regex::new(p).expect("港口正则"))
    .collect()
});

/// 两轮抽取后的原始结果（未套用哨兵）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortCandidates {
    pub origin: Extraction<String>,
    pub destination: Extraction<String>,
    pub loading_port: Option<String>,
    pub discharge_port: Option<String>,
}

fn is_acceptable_code(code: &str) -> bool {
    (3..=6).contains(&code.len()) && code.chars().all(|c| c.is_ascii_alphanumeric())
}

/// 从单行内容中抽取港口代码
pub fn extract_port_code(line: &str) -> Extraction<String> {
    let line = line.trim();
    PORT_PATTERNS
        .iter()
        .filter_map(|re| re.captures(line))
        .map(|caps| caps[1].to_uppercase())
        .find(|code| is_acceptable_code(code))
        .into()
}

fn fill(slot: &mut Extraction<String>, code: String) {
    if !slot.is_found() {
        *slot = Extraction::Found(code);
    }
}

fn same_code(slot: &Extraction<String>, code: &str) -> bool {
    matches!(slot, Extraction::Found(existing) if existing == code)
}

/// 两轮抽取起运港/目的港
///
/// # 参数
/// - group: 提单分组
/// - known_codes: 第二轮扫描白名单（有序）
pub fn extract_port_candidates(group: &RecordGroup, known_codes: &[String]) -> PortCandidates {
    let mut result = PortCandidates::default();

    // 第一轮: 标签优先级表
    for (tag, role) in PORT_TAG_PRIORITY.iter() {
        for line in group.lines(tag) {
            let code = match extract_port_code(line).found() {
                Some(code) => code,
                None => continue,
            };

            match role {
                PortRole::Origin => {
                    if result.loading_port.is_none() {
                        result.loading_port = Some(code.clone());
                    }
                    fill(&mut result.origin, code);
                }
                PortRole::Destination => {
                    if result.discharge_port.is_none() {
                        result.discharge_port = Some(code.clone());
                    }
                    fill(&mut result.destination, code);
                }
                PortRole::Generic => {
                    if !result.origin.is_found() {
                        result.origin = Extraction::Found(code);
                    } else if !same_code(&result.origin, &code) {
                        fill(&mut result.destination, code);
                    }
                }
            }
        }
    }

    // 第二轮: 白名单子串扫描
    if !result.origin.is_found() || !result.destination.is_found() {
        scan_known_codes(group, known_codes, &mut result);
    }

    result
}

/// 按标签首次出现顺序逐行扫描
fn scan_known_codes(group: &RecordGroup, known_codes: &[String], result: &mut PortCandidates) {
    for (_, lines) in group.iter() {
        for line in lines {
            let upper = line.to_uppercase();
            for code in known_codes.iter().filter(|c| upper.contains(c.as_str())) {
                if !result.origin.is_found() {
                    if !same_code(&result.destination, code) {
                        result.origin = Extraction::Found(code.clone());
                    }
                } else if !result.destination.is_found() && !same_code(&result.origin, code) {
                    result.destination = Extraction::Found(code.clone());
                }

                if result.origin.is_found() && result.destination.is_found() {
                    return;
                }
            }
        }
    }
}

/// 抽取港口信息并套用哨兵兜底
pub fn extract_ports(group: &RecordGroup, known_codes: &[String]) -> PortInfo {
    let candidates = extract_port_candidates(group, known_codes);
    PortInfo {
        origin: PortCode::or_sentinel(candidates.origin, UNKNOWN_ORIGIN),
        destination: PortCode::or_sentinel(candidates.destination, UNKNOWN_DEST),
        loading_port: candidates.loading_port,
        discharge_port: candidates.discharge_port,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known() -> Vec<String> {
        ["ARBUE", "ARROS", "PYASU", "UYMVD"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_extract_port_code_patterns() {
        assert_eq!(extract_port_code("ARBUE terminal"), Extraction::Found("ARBUE".into()));
        assert_eq!(extract_port_code("TERMINAL PYASU 3"), Extraction::Found("PYASU".into()));
        assert_eq!(extract_port_code("BUE"), Extraction::Found("BUE".into()));
        assert_eq!(extract_port_code("port: uymvd"), Extraction::Found("UYMVD".into()));
        assert_eq!(extract_port_code("buenos aires"), Extraction::NotFound);
    }

    #[test]
    fn test_specific_tag_beats_generic() {
        let mut group = RecordGroup::new("BL001");
        group.push(RecordTag::PortRecord, "ARROS");
        group.push(RecordTag::LoadPort, "ARBUE terminal");

        let ports = extract_ports(&group, &known());
        assert_eq!(ports.origin, PortCode::Extracted("ARBUE".into()));
        assert_eq!(ports.destination, PortCode::Extracted("ARROS".into()));
        assert_eq!(ports.loading_port.as_deref(), Some("ARBUE"));
        assert_eq!(ports.discharge_port, None);
    }

    #[test]
    fn test_first_code_per_role_wins() {
        let mut group = RecordGroup::new("BL001");
        group.push(RecordTag::DischargePort, "PYASU");
        group.push(RecordTag::DischargePort, "UYMVD");
        group.push(RecordTag::PortOfLoading, "ARROS");

        let ports = extract_ports(&group, &known());
        assert_eq!(ports.origin.code(), "ARROS");
        assert_eq!(ports.destination.code(), "PYASU");
    }

    #[test]
    fn test_secondary_scan_uses_known_codes() {
        let mut group = RecordGroup::new("BL001");
        group.push(RecordTag::Description, "rolls shipped via arbue to pyasu");

        let ports = extract_ports(&group, &known());
        assert_eq!(ports.origin.code(), "ARBUE");
        assert_eq!(ports.destination.code(), "PYASU");
        assert!(!ports.origin.is_sentinel());
    }

    #[test]
    fn test_secondary_scan_follows_file_order() {
        let mut group = RecordGroup::new("BL001");
        group.push(RecordTag::Description, "cargo discharged at uymvd");
        group.push(RecordTag::VoyageRecord, "045W ARROS");

        let ports = extract_ports(&group, &known());
        assert_eq!(ports.origin.code(), "UYMVD");
        assert_eq!(ports.destination.code(), "ARROS");
    }

    #[test]
    fn test_secondary_scan_destination_distinct_from_origin() {
        let mut group = RecordGroup::new("BL001");
        group.push(RecordTag::LoadPort, "ARBUE");
        group.push(RecordTag::Description, "ex arbue, final arbue");

        let ports = extract_ports(&group, &known());
        assert_eq!(ports.origin.code(), "ARBUE");
        assert_eq!(ports.destination, PortCode::Sentinel(UNKNOWN_DEST));
    }

    #[test]
    fn test_sentinel_fallback() {
        let mut group = RecordGroup::new("BL001");
        group.push(RecordTag::Description, "general cargo");

        let ports = extract_ports(&group, &known());
        assert_eq!(ports.origin, PortCode::Sentinel(UNKNOWN_ORIGIN));
        assert_eq!(ports.destination, PortCode::Sentinel(UNKNOWN_DEST));
        assert!(ports.origin.is_sentinel());
    }
}
