// ==========================================
// 组件序列号分配系统 - 批次 API
// ==========================================
// 职责: 执行一次批次（分配 + 标签 + 回写）
// 锁顺序: 先注册表，后分配器（全进程统一，避免死锁）
// ==========================================

use std::sync::{Arc, Mutex};
use tracing::{error, info};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::batch::{BatchRequest, BatchResult};
use crate::engine::orchestrator::BatchOrchestrator;
use crate::engine::serial_allocator::SerialAllocator;
use crate::repository::component_repo::ComponentRegistry;

// ==========================================
// BatchApi - 批次 API
// ==========================================
pub struct BatchApi {
    registry: Arc<Mutex<ComponentRegistry>>,
    allocator: Arc<Mutex<SerialAllocator>>,
    orchestrator: BatchOrchestrator,
}

impl BatchApi {
    /// 创建新的BatchApi实例
    ///
    /// # 参数
    /// - registry: 与 ComponentApi 共享的注册表
    /// - allocator: 与 SerialApi 共享的分配器
    /// - orchestrator: 批次编排器
    pub fn new(
        registry: Arc<Mutex<ComponentRegistry>>,
        allocator: Arc<Mutex<SerialAllocator>>,
        orchestrator: BatchOrchestrator,
    ) -> Self {
        Self {
            registry,
            allocator,
            orchestrator,
        }
    }

    /// 执行批次
    ///
    /// # 返回
    /// - Ok(BatchResult): 生成记录（总线 → 组件 → 元素顺序）
    /// - Err(MissingPartCode/InvalidOverride/InvalidInput): 无任何状态变化
    /// - Err(Persistence): 已发放的序列号保持已提交，调用方不得重试同一请求
    pub fn run_batch(&self, request: &BatchRequest) -> ApiResult<BatchResult> {
        let mut registry = self
            .registry
            .lock()
            .map_err(|e| ApiError::InternalError(format!("注册表锁获取失败: {}", e)))?;
        let mut allocator = self
            .allocator
            .lock()
            .map_err(|e| ApiError::InternalError(format!("分配器锁获取失败: {}", e)))?;

        match self.orchestrator.run(&mut registry, &mut allocator, request) {
            Ok(result) => {
                info!(
                    run_id = %result.run_id,
                    records = result.records.len(),
                    "批次执行成功"
                );
                Ok(result)
            }
            Err(e) => {
                let err = ApiError::from(e);
                error!(error = %err, "批次执行失败");
                Err(err)
            }
        }
    }
}
