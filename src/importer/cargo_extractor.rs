// ==========================================
// KLine 提单导入 - 货物字段抽取
// ==========================================
// 单位: 重量统一为千克,体积统一为立方米
// 换算: 磅 × 0.453592 / 吨 × 1000 / 立方英尺 × 0.0283168
// 约束: 纯函数,未命中返回 NotFound,由调用方决定默认值
// ==========================================

use crate::domain::manifest::{CargoLine, CargoSummary, RecordGroup};
use crate::domain::types::{Extraction, RecordTag};
use once_cell::sync::Lazy;
use regex::Regex;

pub const LBS_TO_KG: f64 = 0.453592;
pub const TONS_TO_KG: f64 = 1000.0;
pub const CFT_TO_M3: f64 = 0.0283168;

/// 货物描述最多取前几行
pub const DESCRIPTION_LINE_LIMIT: usize = 3;
pub const DESCRIPTION_SEPARATOR: &str = "; ";
pub const GENERIC_DESCRIPTION: &str = "Mercaderia general";

/// 单行件数上限,超出视为未识别
pub const MAX_LINE_PACKAGES: i64 = 10_000_000;

const NUMBER: &str = r"(\d+(?:[.,]\d+)*)";

static WEIGHT_NUMBER_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i){}\s*(kgs?|lbs?|tons?)\b", NUMBER)).expect("重量正则")
});
static WEIGHT_UNIT_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b(kgs?|lbs?|tons?)\s*[:.]?\s*{}", NUMBER)).expect("重量正则")
});
static VOLUME_NUMBER_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i){}\s*(cbm|m3|cft|ft3)\b", NUMBER)).expect("体积正则")
});
static VOLUME_UNIT_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b(cbm|m3|cft|ft3)\s*[:.]?\s*{}", NUMBER)).expect("体积正则")
});
static QUANTITY_WITH_UNIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)\s*(pkgs?|packages?|bultos?|pcs)\b").expect("件数正则")
});
static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)(?:\s|$)").expect("件数正则"));

/// 解析带千分位/小数分隔符的数字
///
/// 规则: 两种分隔符都出现时,最后出现的是小数点;
///       只出现一种且出现多次时视为千分位;
///       只出现一次逗号且其后恰为三位数字时视为千分位,否则视为小数点
pub fn parse_number(raw: &str) -> Option<f64> {
    let commas = raw.matches(',').count();
    let dots = raw.matches('.').count();

    let normalized = match (commas, dots) {
        (0, 0) => raw.to_string(),
        (c, d) if c > 0 && d > 0 => {
            let last_comma = raw.rfind(',').unwrap_or(0);
            let last_dot = raw.rfind('.').unwrap_or(0);
            if last_dot > last_comma {
                raw.replace(',', "")
            } else {
                raw.replace('.', "").replace(',', ".")
            }
        }
        (c, 0) if c > 1 => raw.replace(',', ""),
        (0, d) if d > 1 => raw.replace('.', ""),
        (_, 0) if is_thousands_group(raw) => raw.replace(',', ""),
        (_, 0) => raw.replace(',', "."),
        _ => raw.to_string(),
    };

    normalized.parse::<f64>().ok()
}

fn is_thousands_group(raw: &str) -> bool {
    raw.rsplit_once(',')
        .map(|(_, tail)| tail.len() == 3 && tail.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false)
}

fn valid_packages(n: &i64) -> bool {
    (1..=MAX_LINE_PACKAGES).contains(n)
}

fn weight_factor(unit: &str) -> f64 {
    match unit.to_ascii_lowercase().as_str() {
        "lb" | "lbs" => LBS_TO_KG,
        "ton" | "tons" => TONS_TO_KG,
        _ => 1.0,
    }
}

fn volume_factor(unit: &str) -> f64 {
    match unit.to_ascii_lowercase().as_str() {
        "cft" | "ft3" => CFT_TO_M3,
        _ => 1.0,
    }
}

/// 数字在前优先,其次单位在前
fn match_measure(
    line: &str,
    number_first: &Regex,
    unit_first: &Regex,
    factor: fn(&str) -> f64,
) -> Extraction<f64> {
    if let Some(caps) = number_first.captures(line) {
        if let Some(value) = parse_number(&caps[1]) {
            return Extraction::Found(value * factor(&caps[2]));
        }
    }
    if let Some(caps) = unit_first.captures(line) {
        if let Some(value) = parse_number(&caps[2]) {
            return Extraction::Found(value * factor(&caps[1]));
        }
    }
    Extraction::NotFound
}

/// 抽取重量（千克）
pub fn extract_weight(line: &str) -> Extraction<f64> {
    match_measure(line, &WEIGHT_NUMBER_FIRST, &WEIGHT_UNIT_FIRST, weight_factor)
}

/// 抽取体积（立方米）
pub fn extract_volume(line: &str) -> Extraction<f64> {
    match_measure(line, &VOLUME_NUMBER_FIRST, &VOLUME_UNIT_FIRST, volume_factor)
}

/// 抽取件数
///
/// 先匹配"数字 + 件数单位",再退回行首裸数字;
/// 行首数字紧跟重量/体积单位时不算件数
pub fn extract_quantity(line: &str) -> Extraction<i64> {
    if let Some(caps) = QUANTITY_WITH_UNIT.captures(line) {
        if let Ok(n) = caps[1].parse::<i64>() {
            return Extraction::Found(n);
        }
    }

    let trimmed = line.trim_start();
    let leading_is_measure = [&*WEIGHT_NUMBER_FIRST, &*VOLUME_NUMBER_FIRST]
        .iter()
        .any(|re| re.find(trimmed).map(|m| m.start() == 0).unwrap_or(false));
    if leading_is_measure {
        return Extraction::NotFound;
    }

    LEADING_NUMBER
        .captures(trimmed)
        .and_then(|caps| caps[1].parse::<i64>().ok())
        .into()
}

/// 抽取货物描述（前三行拼接）
pub fn extract_cargo_description(group: &RecordGroup) -> Extraction<String> {
    let lines: Vec<&str> = description_lines(group)
        .take(DESCRIPTION_LINE_LIMIT)
        .collect();

    if lines.is_empty() {
        Extraction::NotFound
    } else {
        Extraction::Found(lines.join(DESCRIPTION_SEPARATOR))
    }
}

fn description_lines(group: &RecordGroup) -> impl Iterator<Item = &str> {
    group
        .lines(&RecordTag::Description)
        .iter()
        .map(|l| l.as_str())
        .filter(|l| !l.trim().is_empty())
}

/// 单行 → 货物明细
pub fn extract_cargo_line(line: &str) -> CargoLine {
    CargoLine {
        description: line.to_string(),
        quantity: extract_quantity(line)
            .found()
            .filter(valid_packages)
            .unwrap_or(1),
        weight_kg: extract_weight(line).unwrap_or(0.0),
        volume_m3: extract_volume(line).unwrap_or(0.0),
    }
}

/// 汇总提单货物
///
/// - 每条非空描述行生成一条明细
/// - 无描述行时生成一条通用明细（件数 1,重量/体积 0）
/// - 总量 = 明细求和（件数饱和相加）;MEASREC0 中首个非零值覆盖对应字段
pub fn summarize_cargo(group: &RecordGroup) -> CargoSummary {
    let mut lines: Vec<CargoLine> = description_lines(group).map(extract_cargo_line).collect();

    let placeholder_item = lines.is_empty();
    if placeholder_item {
        lines.push(CargoLine {
            description: format!("{} - B/L {}", GENERIC_DESCRIPTION, group.bill_number()),
            quantity: 1,
            weight_kg: 0.0,
            volume_m3: 0.0,
        });
    }

    let mut total_packages: i64 = lines
        .iter()
        .fold(0i64, |acc, l| acc.saturating_add(l.quantity));
    let mut gross_weight_kg: f64 = lines.iter().map(|l| l.weight_kg).sum();
    let mut volume_m3: f64 = lines.iter().map(|l| l.volume_m3).sum();

    let measures = group.lines(&RecordTag::Measurement);
    if let Some(w) = first_non_zero(measures, extract_weight) {
        gross_weight_kg = w;
    }
    if let Some(v) = first_non_zero(measures, extract_volume) {
        volume_m3 = v;
    }
    if let Some(p) = measures
        .iter()
        .filter_map(|l| QUANTITY_WITH_UNIT.captures(l))
        .filter_map(|caps| caps[1].parse::<i64>().ok())
        .find(valid_packages)
    {
        total_packages = p;
    }

    CargoSummary {
        description: extract_cargo_description(group)
            .found()
            .unwrap_or_else(|| GENERIC_DESCRIPTION.to_string()),
        total_packages,
        gross_weight_kg,
        volume_m3,
        lines,
        placeholder_item,
    }
}

fn first_non_zero(lines: &[String], extract: fn(&str) -> Extraction<f64>) -> Option<f64> {
    lines
        .iter()
        .filter_map(|l| extract(l).found())
        .find(|v| *v > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_weight_conversions() {
        assert!(approx(extract_weight("10 LBS").unwrap_or(0.0), 4.53592));
        assert!(approx(extract_weight("2 TONS").unwrap_or(0.0), 2000.0));
        assert!(approx(extract_weight("1500 KGS").unwrap_or(0.0), 1500.0));
        assert!(approx(extract_weight("GROSS WEIGHT KG: 250,5").unwrap_or(0.0), 250.5));
        assert_eq!(extract_weight("STEEL COILS").unwrap_or(0.0), 0.0);
    }

    #[test]
    fn test_weight_ignores_packages_unit() {
        assert_eq!(extract_weight("PKGS 10"), Extraction::NotFound);
    }

    #[test]
    fn test_volume_conversions() {
        assert!(approx(extract_volume("5 CFT").unwrap_or(0.0), 0.141584));
        assert!(approx(extract_volume("12.5 M3").unwrap_or(0.0), 12.5));
        assert!(approx(extract_volume("CBM 3").unwrap_or(0.0), 3.0));
        assert_eq!(extract_volume("NO MEASURE").unwrap_or(0.0), 0.0);
    }

    #[test]
    fn test_quantity_patterns() {
        assert_eq!(extract_quantity("25 PKGS STEEL"), Extraction::Found(25));
        assert_eq!(extract_quantity("RICE 40 BULTOS"), Extraction::Found(40));
        assert_eq!(extract_quantity("12 BOXES OF TILES"), Extraction::Found(12));
        assert_eq!(extract_quantity("500 KGS RICE"), Extraction::NotFound);
        assert_eq!(extract_quantity("TILES"), Extraction::NotFound);
    }

    #[test]
    fn test_parse_number_separators() {
        assert_eq!(parse_number("1,234.56"), Some(1234.56));
        assert_eq!(parse_number("1.234,56"), Some(1234.56));
        assert_eq!(parse_number("12,5"), Some(12.5));
        assert_eq!(parse_number("1.000.000"), Some(1_000_000.0));
        assert_eq!(parse_number("10,000"), Some(10_000.0));
        assert_eq!(parse_number("10,0000"), Some(10.0));
        assert_eq!(parse_number("42"), Some(42.0));
    }

    #[test]
    fn test_comma_thousands_weight() {
        assert!(approx(extract_weight("10,000 KGS").unwrap_or(0.0), 10_000.0));
        assert!(approx(extract_weight("2,5 TONS").unwrap_or(0.0), 2500.0));
    }

    #[test]
    fn test_oversized_quantity_falls_back_to_one() {
        let line = extract_cargo_line("9223372036854775807 PKGS STEEL");
        assert_eq!(line.quantity, 1);

        let line = extract_cargo_line("99999999999999999999 PKGS STEEL");
        assert_eq!(line.quantity, 1);

        let line = extract_cargo_line("10000000 PKGS STEEL");
        assert_eq!(line.quantity, MAX_LINE_PACKAGES);
    }

    #[test]
    fn test_summary_packages_never_overflow() {
        let mut group = RecordGroup::new("BL001");
        group.push(RecordTag::Description, "9223372036854775807 PKGS STEEL");
        group.push(RecordTag::Description, "9223372036854775806 PKGS STEEL");
        group.push(RecordTag::Description, "5 PKGS WIRE");
        let summary = summarize_cargo(&group);

        assert_eq!(summary.total_packages, 7);
        assert!(summary.lines.iter().all(|l| l.quantity > 0));
    }

    #[test]
    fn test_description_first_three_lines() {
        let mut group = RecordGroup::new("BL001");
        for line in ["A", "B", "C", "D"] {
            group.push(RecordTag::Description, line);
        }
        assert_eq!(
            extract_cargo_description(&group),
            Extraction::Found("A; B; C".to_string())
        );
    }

    #[test]
    fn test_summary_placeholder_without_description() {
        let group = RecordGroup::new("BL009");
        let summary = summarize_cargo(&group);

        assert!(summary.placeholder_item);
        assert_eq!(summary.lines.len(), 1);
        assert_eq!(summary.lines[0].quantity, 1);
        assert_eq!(summary.lines[0].weight_kg, 0.0);
        assert!(summary.lines[0].description.contains("BL009"));
        assert_eq!(summary.description, GENERIC_DESCRIPTION);
    }

    #[test]
    fn test_summary_sums_lines_and_measure_overrides() {
        let mut group = RecordGroup::new("BL001");
        group.push(RecordTag::Description, "10 PKGS STEEL 1000 KGS 2 CBM");
        group.push(RecordTag::Description, "5 PKGS WIRE 500 KGS");
        let summary = summarize_cargo(&group);

        assert_eq!(summary.total_packages, 15);
        assert!(approx(summary.gross_weight_kg, 1500.0));
        assert!(approx(summary.volume_m3, 2.0));

        group.push(RecordTag::Measurement, "GROSS 1620 KGS 3,5 M3");
        let summary = summarize_cargo(&group);
        assert!(approx(summary.gross_weight_kg, 1620.0));
        assert!(approx(summary.volume_m3, 3.5));
        assert_eq!(summary.total_packages, 15);
    }
}
