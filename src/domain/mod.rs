// ==========================================
// 组件序列号分配系统 - 领域模型层
// ==========================================
// 职责: 定义组件、序列号、批次等领域值类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod batch;
pub mod component;
pub mod serial;
pub mod types;

// 重导出核心类型
pub use batch::{BatchRequest, BatchResult, ComponentRequest, ComponentRunSummary, GeneratedRecord};
pub use component::ComponentDefinition;
pub use serial::{AllocationOutcome, SerialNumber, SerialParseError, SerialState};
pub use types::{month_from_letter, month_letter, IndexPolicy};
