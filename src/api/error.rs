// ==========================================
// 组件序列号分配系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，把仓储/引擎错误转换为调用方可区分的类别
// 类别: 重复组件 / 组件不存在 / 缺少零件编码 / 无效覆写值 / 无效输入 / 持久化失败
// ==========================================

use crate::engine::error::EngineError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 注册表错误
    // ==========================================
    #[error("组件已存在: {0}")]
    DuplicateComponent(String),

    #[error("组件不存在: {0}")]
    ComponentNotFound(String),

    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("缺少零件编码: {0}")]
    MissingPartCode(String),

    #[error("无效的起始序号或索引策略: {0}")]
    InvalidOverride(String),

    #[error("无效输入: {0}")]
    InvalidInput(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("持久化失败: {0}")]
    Persistence(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::UniqueConstraintViolation(msg) => ApiError::DuplicateComponent(msg),
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),

            err @ (RepositoryError::StoreReadError { .. }
            | RepositoryError::CorruptStore { .. }
            | RepositoryError::StoreWriteError { .. }) => ApiError::Persistence(err.to_string()),
        }
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::MissingPartCode { component } => ApiError::MissingPartCode(component),
            EngineError::InvalidOverride(msg) => ApiError::InvalidOverride(msg),
            EngineError::InvalidRequest(msg) => ApiError::InvalidInput(msg),
            EngineError::Repository(err) => ApiError::from(err),
        }
    }
}

impl ApiError {
    /// 是否为持久化错误（调用方应停止后续操作并检查存储）
    pub fn is_persistence(&self) -> bool {
        matches!(self, ApiError::Persistence(_))
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
