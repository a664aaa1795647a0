// ==========================================
// KLine 提单导入 - 配置管理器
// ==========================================
// 职责: 从 config_kv 表读取/写入导入配置覆写项
// 存储: config_kv 表 (key-value + scope,当前只用 global)
// ==========================================

use crate::config::import_config::ImportConfig;
use crate::db::open_sqlite_connection;
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

/// 配置键
pub mod config_keys {
    pub const COMPANY_ID: &str = "import.company_id";
    pub const DEFAULT_CURRENCY: &str = "import.default_currency";
    pub const VOYAGE_NUMBER_PREFIX: &str = "import.voyage_number_prefix";
    pub const DEPARTURE_OFFSET_DAYS: &str = "import.departure_offset_days";
    pub const ARRIVAL_OFFSET_DAYS: &str = "import.arrival_offset_days";

    pub const ALL: [&str; 5] = [
        COMPANY_ID,
        DEFAULT_CURRENCY,
        VOYAGE_NUMBER_PREFIX,
        DEPARTURE_OFFSET_DAYS,
        ARRIVAL_OFFSET_DAYS,
    ];
}

const GLOBAL_SCOPE: &str = "global";

/// 预计出发/到达偏移天数允许范围
pub const OFFSET_DAYS_RANGE: RangeInclusive<i64> = 0..=3650;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![GLOBAL_SCOPE, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES (?1, ?2, ?3, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![GLOBAL_SCOPE, key, value],
        )?;
        Ok(())
    }

    /// 列出全部 global 配置（按键排序）
    pub fn list_global(&self) -> RepositoryResult<Vec<(String, String)>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;
        let rows = stmt
            .query_map(params![GLOBAL_SCOPE], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<(String, String)>, _>>()?;
        Ok(rows)
    }

    /// 在基础配置上叠加 config_kv 覆写项
    ///
    /// # 返回
    /// - Err(ConfigValueError): 覆写值无法解析或偏移天数超出范围
    pub fn load_import_config(&self, base: ImportConfig) -> ImportResult<ImportConfig> {
        let mut config = base;

        if let Some(v) = self.read_parsed::<i64>(config_keys::COMPANY_ID)? {
            config.company_id = v;
        }
        if let Some(v) = self.read_text(config_keys::DEFAULT_CURRENCY)? {
            config.default_currency = v.to_uppercase();
        }
        if let Some(v) = self.read_text(config_keys::VOYAGE_NUMBER_PREFIX)? {
            config.voyage_number_prefix = v;
        }
        if let Some(v) = self.read_offset_days(config_keys::DEPARTURE_OFFSET_DAYS)? {
            config.departure_offset_days = v;
        }
        if let Some(v) = self.read_offset_days(config_keys::ARRIVAL_OFFSET_DAYS)? {
            config.arrival_offset_days = v;
        }

        Ok(config)
    }

    fn read_text(&self, key: &str) -> ImportResult<Option<String>> {
        let raw = self
            .get_config_value(key)
            .map_err(|e| ImportError::ConfigReadError {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        Ok(raw.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()))
    }

    fn read_offset_days(&self, key: &str) -> ImportResult<Option<i64>> {
        match self.read_parsed::<i64>(key)? {
            Some(days) if !OFFSET_DAYS_RANGE.contains(&days) => {
                Err(ImportError::ConfigValueError {
                    key: key.to_string(),
                    value: days.to_string(),
                    message: format!(
                        "偏移天数须在 {}..={} 之间",
                        OFFSET_DAYS_RANGE.start(),
                        OFFSET_DAYS_RANGE.end()
                    ),
                })
            }
            other => Ok(other),
        }
    }

    fn read_parsed<T>(&self, key: &str) -> ImportResult<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.read_text(key)? {
            Some(raw) => raw
                .parse::<T>()
                .map(Some)
                .map_err(|e| ImportError::ConfigValueError {
                    key: key.to_string(),
                    value: raw.clone(),
                    message: e.to_string(),
                }),
            None => Ok(None),
        }
    }
}
