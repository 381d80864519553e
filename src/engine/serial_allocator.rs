// ==========================================
// 组件序列号分配系统 - 序列号分配器
// ==========================================
// 职责: 每个描述键一个计数器，生成格式化序列号
// 计数规则（优先级从高到低）:
// 1. 显式覆写值 → 计数 = 覆写值（即使已有状态也生效）
// 2. 已有状态 → 计数 = last_serial + 1
// 3. 首次分配 → 计数 = 0
// 每次分配同步落盘后才返回
// ==========================================

use crate::domain::serial::{AllocationOutcome, SerialNumber, SerialState};
use crate::engine::clock::Clock;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::serial_state_repo::SerialStateRepository;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// get_last 在无状态时返回的哨兵值（永远不是合法计数）
pub const NO_SERIAL: i64 = -1;

// ==========================================
// SerialAllocator - 序列号分配器
// ==========================================
pub struct SerialAllocator {
    repo: SerialStateRepository,
    clock: Arc<dyn Clock>,
}

impl SerialAllocator {
    /// 创建分配器
    ///
    /// # 参数
    /// - repo: 序列号状态仓储
    /// - clock: 提供分配时刻（决定月份字母与年份）
    pub fn new(repo: SerialStateRepository, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// 分配一个序列号
    ///
    /// # 参数
    /// - description: 描述键（组件名称）
    /// - override_value: 显式覆写的计数值
    /// - code: 零件编码（None 时保留原关联编码）
    ///
    /// # 返回
    /// - Ok(AllocationOutcome): 格式化序列号 + 新的 last_serial
    /// - Err(ValidationError): 计数器已到 i64 上限
    /// - Err: 落盘失败（内存状态不前进）
    pub fn allocate(
        &mut self,
        description: &str,
        override_value: Option<i64>,
        code: Option<&str>,
    ) -> RepositoryResult<AllocationOutcome> {
        let counter = self.peek_next(description, override_value)?;
        let now = self.clock.now();

        let associated_code = match code.filter(|c| !c.is_empty()) {
            Some(code) => Some(code.to_string()),
            None => self
                .repo
                .get(description)
                .and_then(|s| s.associated_code.clone()),
        };

        self.repo.upsert(
            description,
            SerialState {
                last_serial: counter,
                last_used_at: now,
                associated_code,
            },
        )?;

        let serial = SerialNumber::new(now.date(), counter).to_string();
        debug!(
            description = %description,
            counter = counter,
            overridden = override_value.is_some(),
            serial = %serial,
            "序列号已分配"
        );

        Ok(AllocationOutcome {
            serial,
            last_serial: counter,
        })
    }

    /// 下一次分配将得到的计数值（不修改状态）
    pub fn peek_next(&self, description: &str, override_value: Option<i64>) -> RepositoryResult<i64> {
        match override_value {
            Some(value) => Ok(value),
            None => match self.repo.get(description) {
                Some(state) => state.last_serial.checked_add(1).ok_or_else(|| {
                    RepositoryError::ValidationError(format!("序列号计数器溢出: {}", description))
                }),
                None => Ok(0),
            },
        }
    }

    /// 最后一次发放的计数值，无状态时返回 -1
    pub fn get_last(&self, description: &str) -> i64 {
        self.repo
            .get(description)
            .map(|s| s.last_serial)
            .unwrap_or(NO_SERIAL)
    }

    pub fn has_state(&self, description: &str) -> bool {
        self.repo.contains(description)
    }

    pub fn state(&self, description: &str) -> Option<&SerialState> {
        self.repo.get(description)
    }

    /// 全部计数器状态（快照副本）
    pub fn list(&self) -> BTreeMap<String, SerialState> {
        self.repo.list()
    }
}
