// ==========================================
// KLine 提单导入 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// 约束: 仓储借用连接,由导入层决定事务边界（每个提单一个事务）
// ==========================================

pub mod error;
pub mod import_batch_repo;
pub mod port_repo;
pub mod shipment_repo;
pub mod voyage_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use import_batch_repo::ImportBatchRepository;
pub use port_repo::PortRepository;
pub use shipment_repo::ShipmentRepository;
pub use voyage_repo::VoyageRepository;
