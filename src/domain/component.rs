// ==========================================
// 组件序列号分配系统 - 组件定义领域模型
// ==========================================
// 职责: 组件注册表中的一条记录
// 主键: name（全系统唯一）
// ==========================================

use crate::domain::types::IndexPolicy;
use serde::{Deserialize, Serialize};

fn default_indexing_enabled() -> bool {
    true
}

// ==========================================
// ComponentDefinition - 组件定义
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDefinition {
    pub name: String,      // 组件名称（同时是序列号计数器的描述键）
    #[serde(default)]
    pub part_code: String, // 外部零件编码，首次注册必填

    #[serde(default)]
    pub resume_serial: Option<i64>, // 下次分配使用的计数值（无覆写时）

    #[serde(default)]
    pub card_prefix: Option<String>, // 卡型标签前缀
    #[serde(default = "default_indexing_enabled")]
    pub indexing_enabled: bool, // false 时标签 = 前缀原样
    #[serde(default)]
    pub index_policy: IndexPolicy,
}

impl ComponentDefinition {
    /// 创建组件定义（默认启用索引、顺序策略）
    pub fn new(name: impl Into<String>, part_code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            part_code: part_code.into(),
            resume_serial: None,
            card_prefix: None,
            indexing_enabled: true,
            index_policy: IndexPolicy::Sequential,
        }
    }

    pub fn with_card_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.card_prefix = Some(prefix.into());
        self
    }

    pub fn with_resume_serial(mut self, value: i64) -> Self {
        self.resume_serial = Some(value);
        self
    }

    pub fn with_index_policy(mut self, policy: IndexPolicy) -> Self {
        self.index_policy = policy;
        self
    }

    pub fn without_indexing(mut self) -> Self {
        self.indexing_enabled = false;
        self
    }

    /// 有效前缀（空字符串视为未设置）
    pub fn effective_card_prefix(&self) -> Option<&str> {
        self.card_prefix.as_deref().filter(|p| !p.is_empty())
    }

    /// 零件编码是否已填写
    pub fn has_part_code(&self) -> bool {
        !self.part_code.trim().is_empty()
    }
}
