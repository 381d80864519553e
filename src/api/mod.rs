// ==========================================
// 组件序列号分配系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口，供命令行及渲染端调用
// ==========================================

pub mod batch_api;
pub mod component_api;
pub mod error;
pub mod serial_api;
pub mod validator;

// 重导出核心类型
pub use batch_api::BatchApi;
pub use component_api::ComponentApi;
pub use error::{ApiError, ApiResult};
pub use serial_api::{SerialApi, SerialStateView};
pub use validator::{parse_index_policy, parse_override_start, validate_component_name};
