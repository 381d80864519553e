// ==========================================
// 组件序列号分配系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 共享: 注册表与分配器各一份，由各 API 通过 Arc<Mutex<>> 共享
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{ApiResult, BatchApi, ComponentApi, SerialApi};
use crate::config::EngineConfig;
use crate::engine::clock::{Clock, SystemClock};
use crate::engine::orchestrator::BatchOrchestrator;
use crate::engine::serial_allocator::SerialAllocator;
use crate::repository::component_repo::ComponentRegistry;
use crate::repository::serial_state_repo::SerialStateRepository;

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 生效的配置
    pub config: EngineConfig,

    /// 组件注册表API
    pub component_api: Arc<ComponentApi>,

    /// 序列号查询API
    pub serial_api: Arc<SerialApi>,

    /// 批次API
    pub batch_api: Arc<BatchApi>,
}

impl AppState {
    /// 创建新的AppState实例（系统本地时钟）
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(Persistence): 存储文件存在但不可读或已损坏
    pub fn new(config: EngineConfig) -> ApiResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// 创建新的AppState实例（指定时钟）
    ///
    /// 该方法会：
    /// 1. 打开注册表（必要时迁移旧格式）
    /// 2. 打开序列号状态存储
    /// 3. 创建所有API实例
    pub fn with_clock(config: EngineConfig, clock: Arc<dyn Clock>) -> ApiResult<Self> {
        tracing::info!(
            data_dir = %config.data_dir.display(),
            policy_write_back = %config.policy_write_back,
            "初始化AppState"
        );

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let registry = Arc::new(Mutex::new(ComponentRegistry::open(config.registry_path())?));
        let serial_repo = SerialStateRepository::open(config.serial_state_path())?;

        // ==========================================
        // 初始化Engine层
        // ==========================================
        let allocator = Arc::new(Mutex::new(SerialAllocator::new(serial_repo, clock)));
        let orchestrator = BatchOrchestrator::new(config.policy_write_back);

        // ==========================================
        // 初始化API层
        // ==========================================
        let component_api = Arc::new(ComponentApi::new(registry.clone()));
        let serial_api = Arc::new(SerialApi::new(allocator.clone()));
        let batch_api = Arc::new(BatchApi::new(registry, allocator, orchestrator));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            config,
            component_api,
            serial_api,
            batch_api,
        })
    }
}
