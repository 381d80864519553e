// ==========================================
// 组件序列号分配系统 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 读写不对称:
// - 文件不存在 → 合法的空存储（不是错误）
// - 文件存在但不可读/内容损坏 → 硬错误，绝不当作空存储
// - 写入失败 → 当前变更调用失败，内存状态不前进
// ==========================================

use std::path::Path;
use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 记录错误 =====
    #[error("唯一约束违反: {0}")]
    UniqueConstraintViolation(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ===== 持久化错误 =====
    #[error("存储文件读取失败 (path={path}): {message}")]
    StoreReadError { path: String, message: String },

    #[error("存储文件内容损坏 (path={path}): {message}")]
    CorruptStore { path: String, message: String },

    #[error("存储文件写入失败 (path={path}): {message}")]
    StoreWriteError { path: String, message: String },
}

impl RepositoryError {
    pub(crate) fn read(path: &Path, err: impl std::fmt::Display) -> Self {
        RepositoryError::StoreReadError {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn corrupt(path: &Path, err: impl std::fmt::Display) -> Self {
        RepositoryError::CorruptStore {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn write(path: &Path, err: impl std::fmt::Display) -> Self {
        RepositoryError::StoreWriteError {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    /// 是否为持久化（存储 I/O）类错误
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            RepositoryError::StoreReadError { .. }
                | RepositoryError::CorruptStore { .. }
                | RepositoryError::StoreWriteError { .. }
        )
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
