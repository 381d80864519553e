// ==========================================
// 组件序列号分配系统 - 核心库
// ==========================================
// 系统定位: 为生产批次中的每个组件副本分配唯一序列号与卡型标签
// 存储: 组件注册表 + 序列号状态，均为 JSON 文件（原子替换写入）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 文件存储
pub mod repository;

// 引擎层 - 分配、索引、编排
pub mod engine;

// 配置层 - 存储路径与回写策略
pub mod config;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::IndexPolicy;

// 领域实体
pub use domain::{
    BatchRequest, BatchResult, ComponentDefinition, ComponentRequest, ComponentRunSummary,
    GeneratedRecord, SerialNumber, SerialState,
};

// 引擎
pub use engine::{BatchOrchestrator, Clock, FixedClock, IndexEngine, SerialAllocator, SystemClock};

// 配置
pub use config::{EngineConfig, PolicyWriteBack};

// API
pub use api::{ApiError, ApiResult, BatchApi, ComponentApi, SerialApi};

// 应用
pub use app::AppState;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "组件序列号分配系统";
