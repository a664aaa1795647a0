// ==========================================
// KLine 提单导入 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 单个提单内的错误在编排层被捕获并转为警告,
//       只有文件级错误会返回给调用方
// ==========================================

use crate::repository::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    // ===== 业务规则错误 =====
    #[error("提单 {bill_number} 港口无法解析: 起运港={origin}, 目的港={destination}")]
    UnresolvablePorts {
        bill_number: String,
        origin: String,
        destination: String,
    },

    // ===== 数据库错误 =====
    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    // ===== 配置错误 =====
    #[error("配置读取失败 (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },

    // ===== 报告输出错误 =====
    #[error("导入报告写入失败: {0}")]
    ReportWriteError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<rusqlite::Error>（经仓储层分类）
impl From<rusqlite::Error> for ImportError {
    fn from(err: rusqlite::Error) -> Self {
        ImportError::Repository(RepositoryError::from(err))
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::ReportWriteError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolvable_ports_message_carries_codes() {
        let err = ImportError::UnresolvablePorts {
            bill_number: "BL0042".to_string(),
            origin: "UNKNOWN-ORIGIN".to_string(),
            destination: "UNKNOWN-DEST".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("BL0042"));
        assert!(msg.contains("UNKNOWN-ORIGIN"));
        assert!(msg.contains("UNKNOWN-DEST"));
    }

    #[test]
    fn test_rusqlite_error_goes_through_repository_classification() {
        let err: ImportError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(
            err,
            ImportError::Repository(RepositoryError::NotFound { .. })
        ));
    }
}
