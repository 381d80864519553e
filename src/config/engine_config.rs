// ==========================================
// 组件序列号分配系统 - 引擎配置
// ==========================================
// 职责: 存储路径与回写策略
// 来源优先级: 环境变量 > 配置文件 > 默认值
// 配置文件不存在 → 默认值；存在但不可读/格式错误 → 报错
// ==========================================

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// 数据目录环境变量
pub const DATA_DIR_ENV: &str = "SERIAL_LABEL_ENGINE_DATA_DIR";

/// 默认注册表文件名
pub const DEFAULT_REGISTRY_FILE: &str = "components.json";

/// 默认序列号状态文件名
pub const DEFAULT_SERIAL_STATE_FILE: &str = "serial_numbers_state.json";

// ==========================================
// PolicyWriteBack - 索引策略回写方式
// ==========================================
// 批次结束时如何处理注册表中已存储的索引策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyWriteBack {
    /// 仅当本次批次显式提供策略时才覆盖
    #[default]
    PreserveUnlessSupplied,
    /// 总是用本次批次的策略覆盖（未提供时清空为未设置）
    AlwaysOverwrite,
}

impl fmt::Display for PolicyWriteBack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyWriteBack::PreserveUnlessSupplied => write!(f, "PRESERVE_UNLESS_SUPPLIED"),
            PolicyWriteBack::AlwaysOverwrite => write!(f, "ALWAYS_OVERWRITE"),
        }
    }
}

// ==========================================
// EngineConfig - 引擎配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub data_dir: PathBuf,
    pub registry_file: String,
    pub serial_state_file: String,
    pub policy_write_back: PolicyWriteBack,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            registry_file: DEFAULT_REGISTRY_FILE.to_string(),
            serial_state_file: DEFAULT_SERIAL_STATE_FILE.to_string(),
            policy_write_back: PolicyWriteBack::default(),
        }
    }
}

impl EngineConfig {
    /// 指定数据目录的配置（其余取默认值）
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// 加载配置
    ///
    /// # 参数
    /// - path: 配置文件路径（None 表示只用默认值 + 环境变量）
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
                serde_json::from_str::<EngineConfig>(&content)
                    .with_context(|| format!("配置文件格式错误: {}", path.display()))?
            }
            Some(path) => {
                tracing::debug!(path = %path.display(), "配置文件不存在，使用默认配置");
                Self::default()
            }
            None => Self::default(),
        };

        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            let trimmed = dir.trim();
            if !trimmed.is_empty() {
                config.data_dir = PathBuf::from(trimmed);
            }
        }

        Ok(config)
    }

    pub fn registry_path(&self) -> PathBuf {
        self.data_dir.join(&self.registry_file)
    }

    pub fn serial_state_path(&self) -> PathBuf {
        self.data_dir.join(&self.serial_state_file)
    }
}

/// 默认数据目录
///
/// 用户数据目录下的 serial-label-engine（开发构建使用独立目录），
/// 无法获取用户数据目录时回退到 ./DB
pub fn default_data_dir() -> PathBuf {
    match dirs::data_dir() {
        Some(data_dir) => {
            if cfg!(debug_assertions) {
                data_dir.join("serial-label-engine-dev")
            } else {
                data_dir.join("serial-label-engine")
            }
        }
        None => PathBuf::from("./DB"),
    }
}
