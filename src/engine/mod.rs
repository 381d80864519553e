// ==========================================
// 组件序列号分配系统 - 引擎层
// ==========================================
// 职责: 序列号分配、卡型索引、批次编排
// 红线: 引擎不直接读写文件，持久化全部经由 repository 层
// ==========================================

pub mod clock;
pub mod error;
pub mod index_engine;
pub mod orchestrator;
pub mod serial_allocator;

// 重导出核心引擎
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{EngineError, EngineResult};
pub use index_engine::IndexEngine;
pub use orchestrator::BatchOrchestrator;
pub use serial_allocator::{SerialAllocator, NO_SERIAL};
