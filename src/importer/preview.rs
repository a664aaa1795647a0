// ==========================================
// KLine 提单导入 - 预览（试运行）
// ==========================================
// 切分 → 分组 → 抽取,不访问数据库
// ==========================================

use crate::config::ImportConfig;
use crate::domain::manifest::BillPreview;
use crate::importer::bill_grouper::group_bills;
use crate::importer::cargo_extractor::summarize_cargo;
use crate::importer::error::ImportResult;
use crate::importer::port_extractor::extract_ports;
use crate::importer::tokenizer::{read_flat_file, tokenize_content};
use crate::importer::voyage_extractor::extract_voyage;
use std::path::Path;

/// 预览文本内容
pub fn preview_content(content: &str, config: &ImportConfig) -> Vec<BillPreview> {
    let now = config.now();

    group_bills(tokenize_content(content))
        .into_iter()
        .map(|group| BillPreview {
            bill_number: group.bill_number().to_string(),
            line_count: group.line_count(),
            ports: extract_ports(&group, &config.known_port_codes),
            voyage: extract_voyage(&group, &config.voyage_number_prefix, now),
            cargo: summarize_cargo(&group),
            unknown_tags: group.unknown_tags(),
        })
        .collect()
}

/// 预览文件
pub fn preview_file(path: &Path, config: &ImportConfig) -> ImportResult<Vec<BillPreview>> {
    let content = read_flat_file(path)?;
    Ok(preview_content(&content, config))
}
