// ==========================================
// 组件序列号分配系统 - 序列号查询 API
// ==========================================
// 职责: 计数器状态只读视图（管理/审计）
// 红线: 本 API 不分配序列号，分配只发生在批次执行中
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::serial::SerialNumber;
use crate::engine::serial_allocator::SerialAllocator;

// ==========================================
// SerialStateView - 计数器状态视图
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialStateView {
    pub description: String,
    pub last_serial: i64,
    /// 最后一次发放的完整序列号（按发放时刻格式化）
    pub last_serial_code: String,
    pub last_used_at: NaiveDateTime,
    pub associated_code: Option<String>,
}

// ==========================================
// SerialApi - 序列号查询 API
// ==========================================
pub struct SerialApi {
    allocator: Arc<Mutex<SerialAllocator>>,
}

impl SerialApi {
    pub fn new(allocator: Arc<Mutex<SerialAllocator>>) -> Self {
        Self { allocator }
    }

    fn get_allocator(&self) -> ApiResult<MutexGuard<'_, SerialAllocator>> {
        self.allocator
            .lock()
            .map_err(|e| ApiError::InternalError(format!("分配器锁获取失败: {}", e)))
    }

    /// 全部计数器（按描述键排序）
    pub fn list_states(&self) -> ApiResult<Vec<SerialStateView>> {
        let allocator = self.get_allocator()?;
        Ok(allocator
            .list()
            .into_iter()
            .map(|(description, state)| SerialStateView {
                last_serial_code: SerialNumber::new(state.last_used_at.date(), state.last_serial)
                    .to_string(),
                description,
                last_serial: state.last_serial,
                last_used_at: state.last_used_at,
                associated_code: state.associated_code,
            })
            .collect())
    }

    /// 最后发放的计数值，从未分配时为 -1
    pub fn get_last(&self, description: &str) -> ApiResult<i64> {
        Ok(self.get_allocator()?.get_last(description))
    }

    /// 下一次分配的计数值（不修改状态）
    pub fn peek_next(&self, description: &str, override_value: Option<i64>) -> ApiResult<i64> {
        if let Some(v) = override_value {
            if v < 0 {
                return Err(ApiError::InvalidOverride(format!("覆写值不能为负数: {}", v)));
            }
        }
        Ok(self.get_allocator()?.peek_next(description, override_value)?)
    }
}
