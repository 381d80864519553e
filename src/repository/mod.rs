// ==========================================
// 组件序列号分配系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 两个相互独立的持久化存储
// - 组件注册表 (ComponentRegistry)
// - 序列号状态 (SerialStateRepository)
// 约束: 单写者；每次变更同步整体重写
// ==========================================

pub mod component_repo;
pub mod error;
pub mod json_store;
pub mod serial_state_repo;

// 重导出核心仓储
pub use component_repo::ComponentRegistry;
pub use error::{RepositoryError, RepositoryResult};
pub use json_store::JsonFileStore;
pub use serial_state_repo::SerialStateRepository;
