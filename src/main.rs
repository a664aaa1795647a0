// ==========================================
// KLine 提单导入 - 命令行入口
// ==========================================
// 命令:
//   kline-importer init-db [--db PATH]
//   kline-importer import <FILES>... [--db PATH] [--report CSV]
//   kline-importer preview <FILE>
//   kline-importer config show [--db PATH]
// ==========================================

use clap::{Parser, Subcommand};
use kline_importer::config::{config_keys, ConfigManager, ImportConfig};
use kline_importer::db::{get_default_db_path, open_and_init, read_schema_version};
use kline_importer::importer::{preview_file, KLineImporter, KLineImporterImpl};
use kline_importer::{logging, report};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

#[derive(Parser)]
#[command(name = "kline-importer")]
#[command(version, about = "KLine 平面文件提单导入", long_about = None)]
struct Cli {
    /// 以 JSON 行格式输出日志
    #[arg(long, global = true)]
    json_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 初始化数据库（幂等建表）
    InitDb {
        /// 数据库路径（默认: KLINE_IMPORTER_DB_PATH 或用户数据目录）
        #[arg(long)]
        db: Option<String>,
    },

    /// 导入一个或多个 KLine 平面文件
    Import {
        /// 平面文件
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// 数据库路径
        #[arg(long)]
        db: Option<String>,

        /// 导入报告 CSV（多个文件时按文件名追加后缀）
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// 试运行: 输出每个提单的抽取结果（JSON,不写库）
    Preview {
        file: PathBuf,
    },

    /// 配置管理
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// 显示生效配置（默认值 + config_kv 覆写）
    Show {
        #[arg(long)]
        db: Option<String>,
    },
}

fn resolve_db_path(db: Option<String>) -> String {
    db.filter(|p| !p.trim().is_empty())
        .unwrap_or_else(get_default_db_path)
}

fn report_path_for(base: &Path, file: &Path, multiple: bool) -> PathBuf {
    if !multiple {
        return base.to_path_buf();
    }
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "report".to_string());
    let source = file
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "input".to_string());
    base.with_file_name(format!("{}-{}.csv", stem, source))
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    match cli.command {
        Commands::InitDb { db } => {
            let db_path = resolve_db_path(db);
            let conn = open_and_init(&db_path)?;
            let version = read_schema_version(&conn)?.unwrap_or(0);
            tracing::info!(db_path = %db_path, schema_version = version, "数据库初始化完成");
            println!("{} (schema v{})", db_path, version);
            Ok(true)
        }

        Commands::Import { files, db, report } => {
            let db_path = resolve_db_path(db);
            tracing::info!(db_path = %db_path, files = files.len(), "使用数据库");

            let importer = KLineImporterImpl::from_db_path(&db_path, ImportConfig::default())?;
            let results = importer.import_files(files.clone()).await;
            let multiple = files.len() > 1;

            let mut all_ok = true;
            for (file, result) in files.iter().zip(results) {
                match result {
                    Ok(summary) => {
                        println!(
                            "{}: processed={} errors={} warnings={}",
                            file.display(),
                            summary.processed,
                            summary.errors,
                            summary.warnings.len()
                        );
                        for warning in &summary.warnings {
                            println!("  - {}", warning);
                        }
                        if summary.errors > 0 {
                            all_ok = false;
                        }
                        if let Some(base) = &report {
                            report::write_summary_csv(
                                &summary,
                                &report_path_for(base, file, multiple),
                            )?;
                        }
                    }
                    Err(e) => {
                        all_ok = false;
                        eprintln!("{}: {}", file.display(), e);
                    }
                }
            }
            Ok(all_ok)
        }

        Commands::Preview { file } => {
            let previews = preview_file(&file, &ImportConfig::default())?;
            println!("{}", serde_json::to_string_pretty(&previews)?);
            Ok(true)
        }

        Commands::Config {
            action: ConfigAction::Show { db },
        } => {
            let db_path = resolve_db_path(db);
            let conn = Arc::new(Mutex::new(open_and_init(&db_path)?));
            let manager = ConfigManager::from_connection(conn);
            let config = manager.load_import_config(ImportConfig::default())?;

            for key in config_keys::ALL {
                let source = match manager.get_config_value(key)? {
                    Some(_) => "config_kv",
                    None => "default",
                };
                println!("{} ({})", key, source);
            }
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(true)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.json_log {
        logging::init_json();
    } else {
        logging::init();
    }

    tracing::debug!("{} v{}", kline_importer::APP_NAME, kline_importer::VERSION);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            tracing::error!(error = %e, "执行失败");
            eprintln!("错误: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
