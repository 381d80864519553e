// ==========================================
// 组件序列号分配系统 - 卡型索引引擎
// ==========================================
// 职责: 由索引策略与 "总线内位置" 计算卡型标签的数字后缀
// 特性: 纯函数，无状态
// 位置: 同一总线内该组件的第几个副本（从 0 开始，每条总线重置）
// ==========================================

use crate::domain::types::IndexPolicy;

// ==========================================
// IndexEngine - 卡型索引引擎
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexEngine;

impl IndexEngine {
    pub fn new() -> Self {
        Self
    }

    /// 计算索引值
    ///
    /// - Sequential → 位置 + 1
    /// - FixedOffset(o) → o + 位置
    /// - Cyclic(L) → L[位置 % len(L)]
    pub fn compute_index(&self, policy: &IndexPolicy, position: usize) -> i64 {
        match policy {
            IndexPolicy::Sequential => position as i64 + 1,
            // 偏移溢出在批次预处理时已拒绝，这里只做饱和保护
            IndexPolicy::FixedOffset(offset) => offset.saturating_add(position as i64),
            IndexPolicy::Cyclic(values) if !values.is_empty() => values[position % values.len()],
            // 空列表只可能来自手工构造，按顺序策略处理
            IndexPolicy::Cyclic(_) => position as i64 + 1,
        }
    }

    /// 生成卡型标签
    ///
    /// - 未启用索引 → 前缀原样（无前缀时为空）
    /// - 启用索引但前缀为空 → 空
    /// - 否则 → 前缀 + 索引值
    pub fn card_type_label(
        &self,
        prefix: Option<&str>,
        indexing_enabled: bool,
        policy: &IndexPolicy,
        position: usize,
    ) -> String {
        let prefix = prefix.unwrap_or("");
        if !indexing_enabled {
            return prefix.to_string();
        }
        if prefix.is_empty() {
            return String::new();
        }
        format!("{}{}", prefix, self.compute_index(policy, position))
    }
}
