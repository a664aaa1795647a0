// ==========================================
// KLine 提单导入 - SQLite 连接初始化与建表
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键、busy_timeout）
// - 幂等建表（CREATE TABLE IF NOT EXISTS）,供 CLI 与测试共用
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 建表语句
///
/// 说明：
/// - ports.code / voyages.voyage_number 唯一,配合 ON CONFLICT 实现查找或创建
/// - bills_of_lading.bill_number 非空校验,空提单号在落库时失败并整单回滚
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id TEXT NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS ports (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    code TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    country_id INTEGER NOT NULL,
    port_type TEXT NOT NULL,
    active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS voyages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    voyage_number TEXT NOT NULL UNIQUE,
    company_id INTEGER NOT NULL,
    vessel_name TEXT,
    voyage_ref TEXT,
    origin_port_id INTEGER NOT NULL REFERENCES ports(id),
    destination_port_id INTEGER NOT NULL REFERENCES ports(id),
    voyage_type TEXT NOT NULL,
    cargo_type TEXT NOT NULL,
    status TEXT NOT NULL,
    estimated_departure TEXT NOT NULL,
    estimated_arrival TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS shipments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    voyage_id INTEGER NOT NULL REFERENCES voyages(id),
    company_id INTEGER NOT NULL,
    shipment_number TEXT NOT NULL,
    vessel_name TEXT,
    status TEXT NOT NULL,
    total_packages INTEGER NOT NULL DEFAULT 0,
    total_weight_kg REAL NOT NULL DEFAULT 0,
    total_volume_m3 REAL NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS bills_of_lading (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    shipment_id INTEGER NOT NULL REFERENCES shipments(id),
    bill_number TEXT NOT NULL CHECK (length(trim(bill_number)) > 0),
    loading_port_id INTEGER NOT NULL REFERENCES ports(id),
    discharge_port_id INTEGER NOT NULL REFERENCES ports(id),
    cargo_description TEXT NOT NULL,
    total_packages INTEGER NOT NULL DEFAULT 0,
    gross_weight_kg REAL NOT NULL DEFAULT 0,
    volume_m3 REAL NOT NULL DEFAULT 0,
    currency TEXT NOT NULL,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS shipment_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    bill_of_lading_id INTEGER NOT NULL REFERENCES bills_of_lading(id),
    shipment_id INTEGER NOT NULL REFERENCES shipments(id),
    line_number INTEGER NOT NULL,
    description TEXT NOT NULL,
    quantity INTEGER NOT NULL DEFAULT 1,
    weight_kg REAL NOT NULL DEFAULT 0,
    volume_m3 REAL NOT NULL DEFAULT 0,
    currency TEXT NOT NULL,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS import_batches (
    batch_id TEXT PRIMARY KEY,
    file_name TEXT,
    file_path TEXT,
    company_id INTEGER NOT NULL,
    processed INTEGER NOT NULL,
    errors INTEGER NOT NULL,
    warnings_json TEXT NOT NULL,
    imported_at TEXT NOT NULL,
    elapsed_ms INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_bills_of_lading_number ON bills_of_lading(bill_number);
CREATE INDEX IF NOT EXISTS idx_shipment_items_bill ON shipment_items(bill_of_lading_id);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 幂等建表并登记 schema_version
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 打开连接并确保 schema 存在（CLI 入口使用）
pub fn open_and_init(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = open_sqlite_connection(db_path)?;
    init_schema(&conn)?;
    Ok(conn)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 默认数据库路径
///
/// 优先级: 环境变量 KLINE_IMPORTER_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("KLINE_IMPORTER_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./kline_importer.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("kline-importer");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("kline_importer.db");
        }
    }

    path.to_string_lossy().to_string()
}
