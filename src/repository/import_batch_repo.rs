// ==========================================
// KLine 提单导入 - 导入批次仓储
// ==========================================
// 职责: import_batches 表的写入与查询
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::manifest::ImportBatch;
use crate::repository::error::RepositoryResult;
use rusqlite::{params, Connection, OptionalExtension, Row};

fn map_batch_row(row: &Row<'_>) -> rusqlite::Result<ImportBatch> {
    Ok(ImportBatch {
        batch_id: row.get(0)?,
        file_name: row.get(1)?,
        file_path: row.get(2)?,
        company_id: row.get(3)?,
        processed: row.get(4)?,
        errors: row.get(5)?,
        warnings_json: row.get(6)?,
        imported_at: row.get(7)?,
        elapsed_ms: row.get(8)?,
    })
}

// ==========================================
// ImportBatchRepository
// ==========================================
pub struct ImportBatchRepository<'a> {
    conn: &'a Connection,
}

impl<'a> ImportBatchRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// 插入导入批次记录
    pub fn insert_batch(&self, batch: &ImportBatch) -> RepositoryResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO import_batches (
                batch_id, file_name, file_path, company_id,
                processed, errors, warnings_json, imported_at, elapsed_ms
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                batch.batch_id,
                batch.file_name,
                batch.file_path,
                batch.company_id,
                batch.processed,
                batch.errors,
                batch.warnings_json,
                batch.imported_at,
                batch.elapsed_ms,
            ],
        )?;
        Ok(())
    }

    pub fn find_batch(&self, batch_id: &str) -> RepositoryResult<Option<ImportBatch>> {
        let batch = self
            .conn
            .query_row(
                r#"
                SELECT batch_id, file_name, file_path, company_id,
                       processed, errors, warnings_json, imported_at, elapsed_ms
                FROM import_batches WHERE batch_id = ?1
                "#,
                params![batch_id],
                map_batch_row,
            )
            .optional()?;
        Ok(batch)
    }

    /// 查询最近的导入批次
    ///
    /// # 参数
    /// - limit: 返回记录数限制
    pub fn get_recent_batches(&self, limit: usize) -> RepositoryResult<Vec<ImportBatch>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT batch_id, file_name, file_path, company_id,
                   processed, errors, warnings_json, imported_at, elapsed_ms
            FROM import_batches
            ORDER BY imported_at DESC
            LIMIT ?1
            "#,
        )?;
        let batches = stmt
            .query_map(params![limit as i64], map_batch_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(batches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_schema, open_sqlite_connection};
    use chrono::NaiveDate;

    #[test]
    fn test_insert_and_read_recent_batches() {
        let conn = open_sqlite_connection(":memory:").unwrap();
        init_schema(&conn).unwrap();
        let repo = ImportBatchRepository::new(&conn);

        for (i, day) in [1u32, 2, 3].iter().enumerate() {
            repo.insert_batch(&ImportBatch {
                batch_id: format!("batch-{}", i),
                file_name: Some("manifest.txt".to_string()),
                file_path: Some("/tmp/manifest.txt".to_string()),
                company_id: 1,
                processed: 2,
                errors: 1,
                warnings_json: "[\"B/L BL2: boom\"]".to_string(),
                imported_at: NaiveDate::from_ymd_opt(2025, 3, *day)
                    .unwrap()
                    .and_hms_opt(8, 0, 0)
                    .unwrap(),
                elapsed_ms: 12,
            })
            .unwrap();
        }

        let recent = repo.get_recent_batches(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].batch_id, "batch-2");

        let one = repo.find_batch("batch-0").unwrap().unwrap();
        assert_eq!(one.errors, 1);
    }
}
