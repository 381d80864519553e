// ==========================================
// 组件序列号分配系统 - 配置层
// ==========================================
// 职责: 存储位置与回写策略配置
// 存储: JSON 配置文件 + 环境变量覆写
// ==========================================

pub mod engine_config;

// 重导出核心配置
pub use engine_config::{default_data_dir, EngineConfig, PolicyWriteBack, DATA_DIR_ENV};
