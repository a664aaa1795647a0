// ==========================================
// KLine 提单导入 - 导入器 Trait
// ==========================================
// 职责: 定义导入接口（不包含实现）
// 实现者: KLineImporterImpl
// ==========================================

use crate::domain::manifest::ImportSummary;
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use std::path::Path;

// ==========================================
// KLineImporter Trait
// ==========================================
#[async_trait]
pub trait KLineImporter: Send + Sync {
    /// 导入单个 KLine 平面文件
    ///
    /// # 参数
    /// - file_path: 平面文件路径
    ///
    /// # 返回
    /// - Ok(ImportSummary): 处理数/错误数/警告列表（单个提单失败不会导致 Err）
    /// - Err: 文件不存在、无法读取、数据库锁获取失败
    ///
    /// # 导入流程
    /// 1. 读取并解码（UTF-8,失败时 Windows-1252）
    /// 2. 切分记录行
    /// 3. 按 BLHEADER 分组
    /// 4. 每个提单一个事务: 抽取 → 港口/航次查找或创建 → 货运/提单/明细新建
    /// 5. 登记导入批次
    async fn import_file<P: AsRef<Path> + Send>(&self, file_path: P)
        -> ImportResult<ImportSummary>;

    /// 依次导入多个文件
    ///
    /// # 说明
    /// - 顺序执行,共享同一连接
    /// - 某个文件失败不影响其他文件
    async fn import_files<P: AsRef<Path> + Send + Sync>(
        &self,
        file_paths: Vec<P>,
    ) -> Vec<ImportResult<ImportSummary>>;
}
