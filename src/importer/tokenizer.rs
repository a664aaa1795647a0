// ==========================================
// KLine 提单导入 - 记录切分器
// ==========================================
// 格式: 每行 = 8 位记录标签 + 内容
// 容错: 不足 8 个字符的行直接跳过（尾部空行/残行）
// 解码: 优先 UTF-8,失败时按 Windows-1252 解码
// ==========================================

use crate::domain::types::{RecordTag, TAG_WIDTH};
use crate::importer::error::{ImportError, ImportResult};
use std::path::Path;
use tracing::debug;

/// 已切分的记录行
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedLine {
    pub tag: RecordTag,
    pub content: String,
}

/// 切分单行
///
/// # 返回
/// - Some(TaggedLine): 标签与内容均已 trim
/// - None: 行长度不足 8 个字符
pub fn tokenize_line(line: &str) -> Option<TaggedLine> {
    // 按字符切分,避免在多字节字符中间截断
    let split_at = line.char_indices().nth(TAG_WIDTH).map(|(idx, _)| idx);
    let (raw_tag, raw_content) = match split_at {
        Some(idx) => line.split_at(idx),
        None if line.chars().count() == TAG_WIDTH => (line, ""),
        None => return None,
    };

    Some(TaggedLine {
        tag: RecordTag::parse(raw_tag.trim()),
        content: raw_content.trim().to_string(),
    })
}

/// 切分整个文件内容（按行,保持顺序）
pub fn tokenize_content(content: &str) -> Vec<TaggedLine> {
    content
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let tagged = tokenize_line(line);
            match &tagged {
                Some(t) => debug!(line_no = idx + 1, tag = %t.tag, "记录行"),
                None => debug!(line_no = idx + 1, "行长度不足,跳过"),
            }
            tagged
        })
        .collect()
}

/// 解码文件字节
///
/// # 返回
/// (文本, 实际使用的编码名)
pub fn decode_content(bytes: &[u8]) -> (String, &'static str) {
    match std::str::from_utf8(bytes) {
        Ok(text) => (text.trim_start_matches('\u{feff}').to_string(), "utf-8"),
        Err(_) => {
            let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            (text.into_owned(), "windows-1252")
        }
    }
}

/// 读取并解码平面文件
pub fn read_flat_file(path: &Path) -> ImportResult<String> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }

    let bytes = std::fs::read(path)
        .map_err(|e| ImportError::FileReadError(format!("{}: {}", path.display(), e)))?;
    let (text, encoding) = decode_content(&bytes);
    debug!(path = %path.display(), bytes = bytes.len(), encoding, "文件读取完成");

    Ok(text)
}
