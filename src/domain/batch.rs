// ==========================================
// 组件序列号分配系统 - 批次领域模型
// ==========================================
// 职责: 批次请求（输入）与生成记录（输出）
// 输出消费者: 表格/标签渲染（只读）
// ==========================================

use crate::domain::types::IndexPolicy;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_quantity() -> u32 {
    1
}

// ==========================================
// ComponentRequest - 单个组件的批次请求
// ==========================================
// 覆写值/索引策略未提供时回退到注册表中的值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRequest {
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity_per_bus: u32,
    #[serde(default)]
    pub override_start: Option<i64>,
    // null/缺省 = 沿用注册表策略；"AUTO" = 本次显式使用顺序策略
    #[serde(default)]
    pub index_policy: Option<IndexPolicy>,
    #[serde(default)]
    pub part_code: Option<String>,
}

impl ComponentRequest {
    pub fn new(name: impl Into<String>, quantity_per_bus: u32) -> Self {
        Self {
            name: name.into(),
            quantity_per_bus,
            override_start: None,
            index_policy: None,
            part_code: None,
        }
    }

    pub fn with_override(mut self, start: i64) -> Self {
        self.override_start = Some(start);
        self
    }

    pub fn with_index_policy(mut self, policy: IndexPolicy) -> Self {
        self.index_policy = Some(policy);
        self
    }

    pub fn with_part_code(mut self, code: impl Into<String>) -> Self {
        self.part_code = Some(code.into());
        self
    }
}

// ==========================================
// BatchRequest - 批次请求
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub bus_count: u32, // 总线数量 N
    pub start_bus: u32, // 起始总线编号 B0
    pub components: Vec<ComponentRequest>,
}

impl BatchRequest {
    pub fn new(bus_count: u32, start_bus: u32, components: Vec<ComponentRequest>) -> Self {
        Self {
            bus_count,
            start_bus,
            components,
        }
    }

    /// 本批次将生成的记录总数（溢出时饱和，仅用于日志）
    pub fn total_units(&self) -> u64 {
        let per_bus = self
            .components
            .iter()
            .fold(0u64, |acc, c| acc.saturating_add(c.quantity_per_bus as u64));
        per_bus.saturating_mul(self.bus_count as u64)
    }
}

// ==========================================
// GeneratedRecord - 生成记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedRecord {
    pub bus: u32,
    pub component: String,
    pub part_code: String,
    pub serial: String,
    pub card_type: String, // 卡型标签（可能为空）
}

// ==========================================
// ComponentRunSummary - 单组件运行摘要
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRunSummary {
    pub name: String,
    pub part_code: String,
    pub first_counter: i64,
    pub last_counter: i64,
    pub allocated: u64,
    pub next_resume: i64,
}

// ==========================================
// BatchResult - 批次结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub run_id: Uuid,
    pub records: Vec<GeneratedRecord>,  // 顺序: 总线 → 组件 → 元素位置
    pub summaries: Vec<ComponentRunSummary>, // 顺序与请求一致
}
