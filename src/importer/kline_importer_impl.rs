// ==========================================
// KLine 提单导入 - 导入器实现
// ==========================================
// 职责: 整合导入流程,从平面文件到数据库
// 流程: 读取 → 切分 → 分组 → (每个提单一个事务) 抽取 → 解析/创建 → 提交
// 红线: 单个提单失败只回滚该提单,不中断批次
// ==========================================

use crate::config::{ConfigManager, ImportConfig};
use crate::db::open_and_init;
use crate::domain::manifest::{
    BillOutcome, BillOutcomeStatus, ImportBatch, ImportSummary, RecordGroup,
};
use crate::domain::types::PortCode;
use crate::importer::bill_grouper::group_bills;
use crate::importer::cargo_extractor::summarize_cargo;
use crate::importer::entity_resolver::EntityResolver;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::kline_importer_trait::KLineImporter;
use crate::importer::port_extractor::extract_ports;
use crate::importer::tokenizer::{read_flat_file, tokenize_content};
use crate::importer::voyage_extractor::extract_voyage;
use crate::repository::ImportBatchRepository;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// 单个提单成功落库后的结果
#[derive(Debug)]
struct PersistedBill {
    voyage_number: String,
    shipment_id: i64,
    notes: Vec<String>, // 哨兵兜底等提示信息
}

// ==========================================
// KLineImporterImpl - KLine 导入器实现
// ==========================================
pub struct KLineImporterImpl {
    conn: Arc<Mutex<Connection>>,
    config: ImportConfig,
}

impl KLineImporterImpl {
    /// 创建新的导入器实例
    ///
    /// # 参数
    /// - conn: 共享数据库连接（需已建表）
    /// - config: 导入配置
    pub fn new(conn: Arc<Mutex<Connection>>, config: ImportConfig) -> Self {
        Self { conn, config }
    }

    /// 打开数据库、建表,并叠加 config_kv 中的配置覆写
    pub fn from_db_path(db_path: &str, base_config: ImportConfig) -> ImportResult<Self> {
        let conn = Arc::new(Mutex::new(open_and_init(db_path)?));
        let config = ConfigManager::from_connection(conn.clone()).load_import_config(base_config)?;
        Ok(Self::new(conn, config))
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }

    /// 导入已解码的文本内容
    ///
    /// # 参数
    /// - content: 平面文件全文
    /// - file_path: 仅用于日志与批次登记
    pub fn import_content(&self, content: &str, file_path: &str) -> ImportResult<ImportSummary> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        info!(batch_id = %batch_id, file_path = %file_path, "开始解析 KLine 文件");

        // === 步骤 1: 切分与分组 ===
        let groups = group_bills(tokenize_content(content));
        info!(bills = groups.len(), "提单分组完成");

        let conn = self
            .conn
            .lock()
            .map_err(|e| ImportError::LockError(e.to_string()))?;

        // === 步骤 2: 逐提单落库 ===
        let mut processed = 0usize;
        let mut errors = 0usize;
        let mut warnings = Vec::new();
        let mut bills = Vec::with_capacity(groups.len());

        for group in &groups {
            let bill_number = group.bill_number().to_string();
            match self.process_bill(&conn, group) {
                Ok(persisted) => {
                    processed += 1;
                    info!(
                        bill_number = %bill_number,
                        voyage_number = %persisted.voyage_number,
                        shipment_id = persisted.shipment_id,
                        "提单导入成功"
                    );
                    let message = if persisted.notes.is_empty() {
                        None
                    } else {
                        Some(persisted.notes.join("; "))
                    };
                    warnings.extend(persisted.notes);
                    bills.push(BillOutcome {
                        bill_number,
                        status: BillOutcomeStatus::Committed,
                        voyage_number: Some(persisted.voyage_number),
                        shipment_id: Some(persisted.shipment_id),
                        message,
                    });
                }
                Err(e) => {
                    errors += 1;
                    error!(bill_number = %bill_number, error = %e, "提单导入失败,已回滚");
                    warnings.push(format!("B/L {}: {}", bill_number, e));
                    bills.push(BillOutcome {
                        bill_number,
                        status: BillOutcomeStatus::RolledBack,
                        voyage_number: None,
                        shipment_id: None,
                        message: Some(e.to_string()),
                    });
                }
            }
        }

        let summary = ImportSummary {
            batch_id,
            file_path: file_path.to_string(),
            processed,
            errors,
            warnings,
            bills,
            elapsed_ms: start_time.elapsed().as_millis(),
        };

        // === 步骤 3: 登记批次（失败只记日志） ===
        self.record_batch(&conn, &summary);

        info!(
            batch_id = %summary.batch_id,
            processed = summary.processed,
            errors = summary.errors,
            warnings = summary.warnings.len(),
            elapsed_ms = summary.elapsed_ms as u64,
            "KLine 文件导入完成"
        );

        Ok(summary)
    }

    /// 单个提单: 开事务 → 落库 → 提交;出错时事务随 drop 回滚
    fn process_bill(&self, conn: &Connection, group: &RecordGroup) -> ImportResult<PersistedBill> {
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| ImportError::DatabaseTransactionError(e.to_string()))?;

        let persisted = self.persist_bill(&tx, group)?;

        tx.commit()
            .map_err(|e| ImportError::DatabaseTransactionError(e.to_string()))?;
        Ok(persisted)
    }

    #[instrument(skip(self, conn, group), fields(bill_number = %group.bill_number()))]
    fn persist_bill(&self, conn: &Connection, group: &RecordGroup) -> ImportResult<PersistedBill> {
        let bill_number = group.bill_number();

        // === 抽取 ===
        let ports = extract_ports(group, &self.config.known_port_codes);
        let voyage_info = extract_voyage(group, &self.config.voyage_number_prefix, self.config.now());
        let cargo = summarize_cargo(group);
        debug!(
            origin = %ports.origin,
            destination = %ports.destination,
            voyage_number = %voyage_info.voyage_number,
            items = cargo.lines.len(),
            "字段抽取完成"
        );

        let unknown = group.unknown_tags();
        if !unknown.is_empty() {
            debug!(tags = ?unknown, "未识别标签,已忽略");
        }

        // === 港口 ===
        let resolver = EntityResolver::new(conn, &self.config);
        let origin = resolver.find_or_create_port(Some(ports.origin.code()))?;
        let destination = resolver.find_or_create_port(Some(ports.destination.code()))?;
        let (origin, destination) = match (origin, destination) {
            (Some(o), Some(d)) => (o, d),
            _ => {
                return Err(ImportError::UnresolvablePorts {
                    bill_number: bill_number.to_string(),
                    origin: ports.origin.code().to_string(),
                    destination: ports.destination.code().to_string(),
                })
            }
        };

        // === 航次 / 货运 / 提单 / 明细 ===
        let voyage = resolver.find_or_create_voyage(&voyage_info, &origin, &destination)?;
        let shipment = resolver.create_shipment(&voyage, bill_number, &cargo)?;
        let bill = resolver.create_bill_of_lading(&shipment, bill_number, &origin, &destination, &cargo)?;
        resolver.create_shipment_items(&bill, &cargo)?;

        let mut notes = Vec::new();
        if let PortCode::Sentinel(code) = &ports.origin {
            warn!(bill_number = %bill_number, "未找到起运港,使用哨兵代码");
            notes.push(format!("B/L {}: 未找到起运港,使用 {}", bill_number, code));
        }
        if let PortCode::Sentinel(code) = &ports.destination {
            warn!(bill_number = %bill_number, "未找到目的港,使用哨兵代码");
            notes.push(format!("B/L {}: 未找到目的港,使用 {}", bill_number, code));
        }

        Ok(PersistedBill {
            voyage_number: voyage.voyage_number,
            shipment_id: shipment.id,
            notes,
        })
    }

    fn record_batch(&self, conn: &Connection, summary: &ImportSummary) {
        let path = Path::new(&summary.file_path);
        let warnings_json = match serde_json::to_string(&summary.warnings) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "警告列表序列化失败");
                "[]".to_string()
            }
        };

        let batch = ImportBatch {
            batch_id: summary.batch_id.clone(),
            file_name: path.file_name().map(|n| n.to_string_lossy().to_string()),
            file_path: Some(summary.file_path.clone()),
            company_id: self.config.company_id,
            processed: summary.processed as i64,
            errors: summary.errors as i64,
            warnings_json,
            imported_at: self.config.now(),
            elapsed_ms: summary.elapsed_ms as i64,
        };

        if let Err(e) = ImportBatchRepository::new(conn).insert_batch(&batch) {
            warn!(batch_id = %batch.batch_id, error = %e, "导入批次登记失败");
        }
    }
}

#[async_trait::async_trait]
impl KLineImporter for KLineImporterImpl {
    #[instrument(skip(self, file_path))]
    async fn import_file<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
    ) -> ImportResult<ImportSummary> {
        let path = file_path.as_ref();
        let content = read_flat_file(path).map_err(|e| {
            error!(path = %path.display(), error = %e, "文件读取失败");
            e
        })?;

        self.import_content(&content, &path.display().to_string())
    }

    async fn import_files<P: AsRef<Path> + Send + Sync>(
        &self,
        file_paths: Vec<P>,
    ) -> Vec<ImportResult<ImportSummary>> {
        let mut results = Vec::with_capacity(file_paths.len());
        for path in file_paths {
            let result = self.import_file(path).await;
            if let Err(e) = &result {
                warn!(error = %e, "文件导入失败,继续下一个文件");
            }
            results.push(result);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FixedClock;
    use crate::repository::{PortRepository, ShipmentRepository, VoyageRepository};
    use chrono::NaiveDate;

    fn importer() -> KLineImporterImpl {
        let now = NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let config = ImportConfig::default().with_clock(Arc::new(FixedClock(now)));
        let conn = open_and_init(":memory:").unwrap();
        KLineImporterImpl::new(Arc::new(Mutex::new(conn)), config)
    }

    #[test]
    fn test_import_content_single_bill() {
        let importer = importer();
        let content = "\
BLHEADERBL500
LOADPORTARBUE
DISCPORTUYMVD
VOYREC00112E
DESCREC05 PKGS TILES 200 KGS
";
        let summary = importer.import_content(content, "memory.txt").unwrap();
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.errors, 0);
        assert!(summary.warnings.is_empty());
        assert_eq!(summary.bills[0].voyage_number.as_deref(), Some("KL-112E-20250314"));

        let conn = importer.conn.lock().unwrap();
        assert_eq!(PortRepository::new(&conn).count().unwrap(), 2);
        assert_eq!(VoyageRepository::new(&conn).count().unwrap(), 1);
        assert_eq!(ShipmentRepository::new(&conn).count_items().unwrap(), 1);
        let batch = ImportBatchRepository::new(&conn)
            .find_batch(&summary.batch_id)
            .unwrap()
            .unwrap();
        assert_eq!(batch.processed, 1);
        assert_eq!(batch.file_name.as_deref(), Some("memory.txt"));
    }

    #[test]
    fn test_empty_bill_number_rolled_back() {
        let importer = importer();
        let content = "BLHEADER\nDESCREC0ORPHAN CARGO\nBLHEADERBL2\nLOADPORTARBUE\n";
        let summary = importer.import_content(content, "memory.txt").unwrap();

        assert_eq!(summary.processed, 1);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.bills[0].status, BillOutcomeStatus::RolledBack);
        assert!(summary.warnings.iter().any(|w| w.starts_with("B/L : ")));

        let conn = importer.conn.lock().unwrap();
        assert_eq!(ShipmentRepository::new(&conn).count_bills().unwrap(), 1);
    }

    #[test]
    fn test_sentinel_notes_do_not_count_as_errors() {
        let importer = importer();
        let summary = importer.import_content("BLHEADERBL9\n", "memory.txt").unwrap();

        assert_eq!(summary.processed, 1);
        assert_eq!(summary.errors, 0);
        assert_eq!(summary.warnings.len(), 2);
        assert!(summary.warnings[0].contains("UNKNOWN-ORIGIN"));
        assert!(summary.warnings[1].contains("UNKNOWN-DEST"));
    }
}
