// ==========================================
// 组件序列号分配系统 - 领域类型定义
// ==========================================
// 职责: 索引策略、月份字母等基础值类型
// 存储格式: 索引策略 = null | 整数 | 整数数组
// ==========================================

use serde::de::Deserializer;
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 索引策略 (Index Policy)
// ==========================================
// 决定卡型标签的数字后缀如何随 "总线内位置" 变化
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IndexPolicy {
    /// 未设置: 位置 + 1
    #[default]
    Sequential,
    /// 起始偏移: offset + 位置
    FixedOffset(i64),
    /// 循环列表: list[位置 % 长度]，列表保证非空
    Cyclic(Vec<i64>),
}

impl IndexPolicy {
    /// 构造循环列表策略
    ///
    /// 空列表退化为 Sequential（与历史数据的读取规则一致）
    pub fn cyclic(values: Vec<i64>) -> Self {
        if values.is_empty() {
            IndexPolicy::Sequential
        } else {
            IndexPolicy::Cyclic(values)
        }
    }
}

impl fmt::Display for IndexPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexPolicy::Sequential => write!(f, "AUTO"),
            IndexPolicy::FixedOffset(offset) => write!(f, "{}", offset),
            IndexPolicy::Cyclic(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", parts.join(","))
            }
        }
    }
}

// 原始形态: 整数 / 整数数组 / "AUTO"
// "AUTO" 只出现在批次请求中，用于显式要求顺序策略（null 表示未提供）
#[derive(Deserialize)]
#[serde(untagged)]
enum RawIndexPolicy {
    Offset(i64),
    Cyclic(Vec<i64>),
    Keyword(String),
}

impl Serialize for IndexPolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            IndexPolicy::Sequential => serializer.serialize_none(),
            IndexPolicy::FixedOffset(offset) => serializer.serialize_i64(*offset),
            IndexPolicy::Cyclic(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for IndexPolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<RawIndexPolicy>::deserialize(deserializer)?;
        Ok(match raw {
            None => IndexPolicy::Sequential,
            Some(RawIndexPolicy::Offset(offset)) => IndexPolicy::FixedOffset(offset),
            Some(RawIndexPolicy::Cyclic(values)) => IndexPolicy::cyclic(values),
            Some(RawIndexPolicy::Keyword(word)) if word.trim().eq_ignore_ascii_case("auto") => {
                IndexPolicy::Sequential
            }
            Some(RawIndexPolicy::Keyword(word)) => {
                return Err(serde::de::Error::custom(format!("无效的索引策略: {}", word)))
            }
        })
    }
}

// ==========================================
// 月份字母 (Month Letter)
// ==========================================
// 1→A, 2→B, ..., 12→L，固定映射不可配置
const MONTH_LETTERS: [char; 12] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L'];

/// 月份 (1-12) 转换为字母
pub fn month_letter(month: u32) -> Option<char> {
    if (1..=12).contains(&month) {
        Some(MONTH_LETTERS[(month - 1) as usize])
    } else {
        None
    }
}

/// 字母转换为月份 (1-12)
pub fn month_from_letter(letter: char) -> Option<u32> {
    MONTH_LETTERS
        .iter()
        .position(|c| *c == letter.to_ascii_uppercase())
        .map(|idx| idx as u32 + 1)
}
