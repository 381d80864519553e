// ==========================================
// 组件序列号分配系统 - 引擎层错误类型
// ==========================================
// 职责: 批次编排中的业务错误
// 约束: 除持久化错误外，所有错误都在第一次分配之前抛出
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("首次分配必须提供零件编码: component={component}")]
    MissingPartCode { component: String },

    #[error("无效的覆写值: {0}")]
    InvalidOverride(String),

    #[error("无效的批次请求: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
