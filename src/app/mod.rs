// ==========================================
// 组件序列号分配系统 - 应用层
// ==========================================
// 职责: 组装存储、引擎与 API
// ==========================================

pub mod state;

// 重导出
pub use state::AppState;
