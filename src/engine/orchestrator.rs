// ==========================================
// 组件序列号分配系统 - 批次编排器
// ==========================================
// 用途: 驱动一次生产批次的序列号分配
// 流程:
// 1. 请求校验 + 组件预处理（零件编码、起始计数、索引策略）
//    任何错误都在第一次分配之前抛出
// 2. 主循环: 总线 → 组件（请求顺序）→ 元素位置
//    每个组件在整次运行中只有第一次分配使用起始计数，其余纯自增
// 3. 回写: resume_serial = last_serial + 1，按配置回写索引策略
// 起始计数:
// - 调用方覆写值（唯一允许回退计数器的途径）
// - 注册表 resume_serial，仅当无历史状态或大于 last_serial 时生效
// - last_serial + 1，否则 0
// 注册表回写失败时 resume_serial 会落后于分配器，上述规则保证不会重发
// ==========================================

use crate::config::PolicyWriteBack;
use crate::domain::batch::{
    BatchRequest, BatchResult, ComponentRequest, ComponentRunSummary, GeneratedRecord,
};
use crate::domain::types::IndexPolicy;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::index_engine::IndexEngine;
use crate::engine::serial_allocator::SerialAllocator;
use crate::repository::component_repo::ComponentRegistry;
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// ComponentRun - 单组件的运行计划（仅在一次运行内有效）
// ==========================================
#[derive(Debug)]
struct ComponentRun {
    name: String,
    part_code: String,
    quantity_per_bus: u32,
    start_counter: i64,
    policy: IndexPolicy,                  // 本次运行实际使用的策略
    supplied_policy: Option<IndexPolicy>, // 调用方显式提供的策略
    card_prefix: Option<String>,
    indexing_enabled: bool,
    registered: bool,

    first_allocation_consumed: bool,
    first_counter: Option<i64>,
    last_counter: Option<i64>,
    allocated: u64,
}

impl ComponentRun {
    fn record(&mut self, counter: i64) {
        if self.first_counter.is_none() {
            self.first_counter = Some(counter);
        }
        self.last_counter = Some(counter);
        self.allocated += 1;
    }
}

// ==========================================
// BatchOrchestrator - 批次编排器
// ==========================================
pub struct BatchOrchestrator {
    index: IndexEngine,
    write_back: PolicyWriteBack,
}

impl BatchOrchestrator {
    /// 创建编排器
    ///
    /// # 参数
    /// - write_back: 索引策略回写方式
    pub fn new(write_back: PolicyWriteBack) -> Self {
        Self {
            index: IndexEngine::new(),
            write_back,
        }
    }

    pub fn write_back(&self) -> PolicyWriteBack {
        self.write_back
    }

    /// 执行一次批次
    ///
    /// # 返回
    /// - Ok(BatchResult): 有序生成记录 + 组件摘要
    /// - Err(MissingPartCode/InvalidOverride/InvalidRequest): 未做任何分配
    /// - Err(Repository): 落盘失败，已完成的分配保持已提交
    #[instrument(
        skip(self, registry, allocator, request),
        fields(
            bus_count = request.bus_count,
            start_bus = request.start_bus,
            components = request.components.len()
        )
    )]
    pub fn run(
        &self,
        registry: &mut ComponentRegistry,
        allocator: &mut SerialAllocator,
        request: &BatchRequest,
    ) -> EngineResult<BatchResult> {
        validate_request(request)?;

        let run_id = Uuid::new_v4();
        info!(run_id = %run_id, total_units = request.total_units(), "开始执行批次");

        // ==========================================
        // 步骤1: 预处理（无副作用）
        // ==========================================
        let mut runs = request
            .components
            .iter()
            .map(|req| self.prepare(registry, allocator, req, request.bus_count))
            .collect::<EngineResult<Vec<_>>>()?;

        // ==========================================
        // 步骤2: 主循环 总线 → 组件 → 元素
        // ==========================================
        let mut records = Vec::new();

        for bus_idx in 0..request.bus_count {
            let bus = request.start_bus + bus_idx;

            for run in runs.iter_mut() {
                for position in 0..run.quantity_per_bus as usize {
                    let outcome = if run.first_allocation_consumed {
                        allocator.allocate(&run.name, None, None)?
                    } else {
                        let outcome = allocator.allocate(
                            &run.name,
                            Some(run.start_counter),
                            Some(run.part_code.as_str()),
                        )?;
                        run.first_allocation_consumed = true;
                        outcome
                    };
                    run.record(outcome.last_serial);

                    let card_type = self.index.card_type_label(
                        run.card_prefix.as_deref(),
                        run.indexing_enabled,
                        &run.policy,
                        position,
                    );

                    records.push(GeneratedRecord {
                        bus,
                        component: run.name.clone(),
                        part_code: run.part_code.clone(),
                        serial: outcome.serial,
                        card_type,
                    });
                }
            }
        }

        info!(run_id = %run_id, records = records.len(), "分配完成，开始回写注册表");

        // ==========================================
        // 步骤3: 回写注册表
        // ==========================================
        let mut summaries = Vec::with_capacity(runs.len());
        for run in &runs {
            let next_resume = self.write_back_component(registry, allocator, run)?;
            summaries.push(ComponentRunSummary {
                name: run.name.clone(),
                part_code: run.part_code.clone(),
                first_counter: run.first_counter.unwrap_or(run.start_counter),
                last_counter: run.last_counter.unwrap_or(run.start_counter),
                allocated: run.allocated,
                next_resume,
            });
        }

        info!(run_id = %run_id, "批次执行完成");

        Ok(BatchResult {
            run_id,
            records,
            summaries,
        })
    }

    /// 组件预处理: 解析零件编码、起始计数、索引策略
    fn prepare(
        &self,
        registry: &ComponentRegistry,
        allocator: &SerialAllocator,
        req: &ComponentRequest,
        bus_count: u32,
    ) -> EngineResult<ComponentRun> {
        let def = registry.find(&req.name);

        if let Some(value) = req.override_start {
            if value < 0 {
                return Err(EngineError::InvalidOverride(format!(
                    "组件{}的起始序号不能为负数: {}",
                    req.name, value
                )));
            }
        }

        // 调用方编码优先，其次注册表编码
        let supplied_code = req
            .part_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .or_else(|| def.filter(|d| d.has_part_code()).map(|d| d.part_code.clone()));

        let part_code = if allocator.has_state(&req.name) {
            supplied_code
                .or_else(|| {
                    allocator
                        .state(&req.name)
                        .and_then(|s| s.associated_code.clone())
                })
                .unwrap_or_default()
        } else {
            supplied_code.ok_or_else(|| EngineError::MissingPartCode {
                component: req.name.clone(),
            })?
        };

        let last_serial = allocator.state(&req.name).map(|s| s.last_serial);
        let resume_serial = def.and_then(|d| d.resume_serial);
        let start_counter = match (req.override_start, last_serial, resume_serial) {
            (Some(value), _, _) => value,
            (None, None, Some(resume)) => resume,
            (None, Some(last), Some(resume)) if resume > last => resume,
            (None, Some(last), _) => last
                .checked_add(1)
                .ok_or_else(|| range_overflow(&req.name))?,
            (None, None, None) => 0,
        };

        // 整个批次的计数区间 [start, start + units) 必须落在 i64 内
        let units = (bus_count as i64)
            .checked_mul(req.quantity_per_bus as i64)
            .ok_or_else(|| range_overflow(&req.name))?;
        start_counter
            .checked_add(units)
            .ok_or_else(|| range_overflow(&req.name))?;

        let policy = req
            .index_policy
            .clone()
            .or_else(|| def.map(|d| d.index_policy.clone()))
            .unwrap_or_default();

        let card_prefix = def.and_then(|d| d.effective_card_prefix().map(str::to_string));
        let indexing_enabled = def.map_or(true, |d| d.indexing_enabled);

        // 只有实际生成带序号的标签时才校验偏移
        if let (IndexPolicy::FixedOffset(offset), Some(_), true) =
            (&policy, &card_prefix, indexing_enabled)
        {
            offset
                .checked_add(req.quantity_per_bus as i64 - 1)
                .ok_or_else(|| {
                    EngineError::InvalidOverride(format!(
                        "组件{}的索引偏移溢出: {}",
                        req.name, offset
                    ))
                })?;
        }

        if def.is_none() {
            warn!(component = %req.name, "组件未在注册表中登记，将不生成卡型标签且不回写");
        }

        debug!(
            component = %req.name,
            part_code = %part_code,
            start_counter = start_counter,
            policy = %policy,
            "组件预处理完成"
        );

        Ok(ComponentRun {
            name: req.name.clone(),
            part_code,
            quantity_per_bus: req.quantity_per_bus,
            start_counter,
            policy,
            supplied_policy: req.index_policy.clone(),
            card_prefix,
            indexing_enabled,
            registered: def.is_some(),
            first_allocation_consumed: false,
            first_counter: None,
            last_counter: None,
            allocated: 0,
        })
    }

    /// 回写单个组件，返回新的 resume_serial
    fn write_back_component(
        &self,
        registry: &mut ComponentRegistry,
        allocator: &SerialAllocator,
        run: &ComponentRun,
    ) -> EngineResult<i64> {
        let next_resume = allocator
            .get_last(&run.name)
            .checked_add(1)
            .ok_or_else(|| range_overflow(&run.name))?;

        if !run.registered {
            warn!(component = %run.name, "组件不在注册表中，跳过回写");
            return Ok(next_resume);
        }

        let policy = match self.write_back {
            PolicyWriteBack::PreserveUnlessSupplied => run.supplied_policy.clone(),
            PolicyWriteBack::AlwaysOverwrite => {
                Some(run.supplied_policy.clone().unwrap_or_default())
            }
        };

        registry.apply_run_outcome(&run.name, next_resume, policy)?;
        info!(
            component = %run.name,
            resume_serial = next_resume,
            write_back = %self.write_back,
            "注册表已回写"
        );
        Ok(next_resume)
    }
}

impl Default for BatchOrchestrator {
    fn default() -> Self {
        Self::new(PolicyWriteBack::default())
    }
}

fn range_overflow(component: &str) -> EngineError {
    EngineError::InvalidOverride(format!("组件{}的序列号区间超出上限", component))
}

/// 请求校验（不访问任何存储）
fn validate_request(request: &BatchRequest) -> EngineResult<()> {
    if request.bus_count == 0 {
        return Err(EngineError::InvalidRequest("总线数量必须大于0".to_string()));
    }
    if request.start_bus.checked_add(request.bus_count - 1).is_none() {
        return Err(EngineError::InvalidRequest(format!(
            "总线编号溢出: start_bus={}, bus_count={}",
            request.start_bus, request.bus_count
        )));
    }
    if request.components.is_empty() {
        return Err(EngineError::InvalidRequest("至少需要一个组件".to_string()));
    }

    let mut seen = HashSet::new();
    for component in &request.components {
        if component.name.trim().is_empty() {
            return Err(EngineError::InvalidRequest("组件名称不能为空".to_string()));
        }
        if component.quantity_per_bus == 0 {
            return Err(EngineError::InvalidRequest(format!(
                "组件{}的每总线数量必须大于0",
                component.name
            )));
        }
        if !seen.insert(component.name.as_str()) {
            return Err(EngineError::InvalidRequest(format!(
                "组件在同一请求中重复: {}",
                component.name
            )));
        }
    }

    Ok(())
}
