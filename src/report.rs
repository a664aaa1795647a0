// ==========================================
// KLine 提单导入 - 导入报告输出
// ==========================================
// 格式: CSV,每个提单一行
// 列: bill_number,status,voyage_number,message
// ==========================================

use crate::domain::manifest::ImportSummary;
use crate::importer::error::{ImportError, ImportResult};
use std::io::Write;
use std::path::Path;
use tracing::info;

const HEADER: [&str; 4] = ["bill_number", "status", "voyage_number", "message"];

/// 写入任意 Writer
pub fn write_summary<W: Write>(summary: &ImportSummary, writer: W) -> ImportResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;

    for bill in &summary.bills {
        wtr.write_record([
            bill.bill_number.as_str(),
            bill.status.as_str(),
            bill.voyage_number.as_deref().unwrap_or(""),
            bill.message.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()
        .map_err(|e| ImportError::ReportWriteError(e.to_string()))?;
    Ok(())
}

/// 写入 CSV 文件
pub fn write_summary_csv(summary: &ImportSummary, path: &Path) -> ImportResult<()> {
    let file = std::fs::File::create(path)
        .map_err(|e| ImportError::ReportWriteError(format!("{}: {}", path.display(), e)))?;
    write_summary(summary, file)?;
    info!(path = %path.display(), bills = summary.bills.len(), "导入报告已写出");
    Ok(())
}
