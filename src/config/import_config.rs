// ==========================================
// KLine 提单导入 - 导入配置
// ==========================================
// 职责: 显式传入导入流程的配置（公司、时钟、国家/港口表）
// 红线: 不读环境、不读数据库（覆写由 ConfigManager 负责）
// ==========================================

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

// ==========================================
// Clock - 时钟来源
// ==========================================
// 航次号、预计日期、审计时间均取自此处,测试可注入固定时钟
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> NaiveDateTime;
}

/// 系统本地时钟
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// 固定时钟（测试用）
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

// ==========================================
// CountryEntry - 国家前缀表项
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryEntry {
    pub prefix: String,  // 港口代码前两位（ISO 3166 alpha-2）
    pub country_id: i64, // 国家表主键
    pub name: String,
    pub river: bool,     // 该国港口按内河港处理
}

impl CountryEntry {
    fn new(prefix: &str, country_id: i64, name: &str, river: bool) -> Self {
        Self {
            prefix: prefix.to_string(),
            country_id,
            name: name.to_string(),
            river,
        }
    }
}

// ==========================================
// ImportConfig - 导入配置
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct ImportConfig {
    // ===== 归属 =====
    pub company_id: i64,
    pub default_currency: String,

    // ===== 航次 =====
    pub voyage_number_prefix: String,
    pub departure_offset_days: i64, // 预计出发 = 导入时刻 + N 天（占位）
    pub arrival_offset_days: i64,   // 预计到达 = 导入时刻 + N 天（占位）
    pub voyage_type: String,
    pub cargo_type: String,

    // ===== 参考表 =====
    pub country_table: Vec<CountryEntry>,
    pub fallback_country_id: i64,
    pub port_names: BTreeMap<String, String>,
    pub known_port_codes: Vec<String>, // 二次扫描白名单（有序）

    #[serde(skip_serializing)]
    pub clock: Arc<dyn Clock>,
}

impl ImportConfig {
    /// 替换时钟
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// 按代码前两位查找国家
    pub fn country_for_code(&self, code: &str) -> Option<&CountryEntry> {
        let prefix: String = code.chars().take(2).collect::<String>().to_uppercase();
        self.country_table.iter().find(|c| c.prefix == prefix)
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        let country_table = vec![
            CountryEntry::new("AR", 1, "Argentina", true),
            CountryEntry::new("PY", 2, "Paraguay", true),
            CountryEntry::new("BR", 3, "Brasil", false),
            CountryEntry::new("UY", 4, "Uruguay", false),
            CountryEntry::new("CL", 5, "Chile", false),
            CountryEntry::new("BO", 6, "Bolivia", false),
        ];

        let port_names: BTreeMap<String, String> = [
            ("ARBUE", "Buenos Aires"),
            ("ARROS", "Rosario"),
            ("ARSFE", "Santa Fe"),
            ("ARPAR", "Parana"),
            ("ARCMP", "Campana"),
            ("ARZAE", "Zarate"),
            ("ARSLO", "San Lorenzo"),
            ("ARSNS", "San Nicolas"),
            ("ARVCN", "Villa Constitucion"),
            ("PYASU", "Asuncion"),
            ("PYVLL", "Villeta"),
            ("PYTVT", "Terport Villeta"),
            ("UYMVD", "Montevideo"),
            ("UYNVP", "Nueva Palmira"),
            ("BRSSZ", "Santos"),
            ("BRPNG", "Paranagua"),
            ("BRRIG", "Rio Grande"),
            ("CLVAP", "Valparaiso"),
            ("CLSAI", "San Antonio"),
        ]
        .iter()
        .map(|(code, name)| (code.to_string(), name.to_string()))
        .collect();

        let known_port_codes = port_names.keys().cloned().collect();

        Self {
            company_id: 1,
            default_currency: "USD".to_string(),
            voyage_number_prefix: "KL-".to_string(),
            departure_offset_days: 1,
            arrival_offset_days: 3,
            voyage_type: "regular".to_string(),
            cargo_type: "general".to_string(),
            country_table,
            fallback_country_id: 1,
            port_names,
            known_port_codes,
            clock: Arc::new(SystemClock),
        }
    }
}
