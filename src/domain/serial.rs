// ==========================================
// 组件序列号分配系统 - 序列号领域模型
// ==========================================
// 格式: <月份字母><YY> <NNNNN>，例如 "J25 00138"
// - 月份字母: 1→A ... 12→L
// - YY: 两位年份
// - NNNNN: 计数值补零至 5 位（超过 99999 时自然加宽，不截断）
// ==========================================

use crate::domain::types::{month_from_letter, month_letter};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ==========================================
// SerialState - 每个描述键的计数器状态
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialState {
    pub last_serial: i64,             // 最后一次发放的计数值
    pub last_used_at: NaiveDateTime,  // 最后一次分配时间（本地时间）
    #[serde(default)]
    pub associated_code: Option<String>, // 最近一次已知的零件编码（审计/展示用）
}

// ==========================================
// AllocationOutcome - 单次分配结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationOutcome {
    pub serial: String,   // 格式化后的序列号
    pub last_serial: i64, // 本次写入的计数值
}

// ==========================================
// SerialNumber - 序列号值对象
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SerialNumber {
    month: u32,
    year_2d: u32,
    counter: i64,
}

/// 序列号解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SerialParseError {
    #[error("序列号缺少空格分隔符: {0}")]
    MissingSeparator(String),

    #[error("无效的月份字母: {0}")]
    InvalidMonthLetter(String),

    #[error("无效的两位年份: {0}")]
    InvalidYear(String),

    #[error("无效的计数部分: {0}")]
    InvalidCounter(String),
}

impl SerialNumber {
    /// 由分配日期和计数值构造
    pub fn new(date: NaiveDate, counter: i64) -> Self {
        Self {
            month: date.month(),
            year_2d: date.year().rem_euclid(100) as u32,
            counter,
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn month_letter(&self) -> char {
        // month 只能由 new()/parse 构造，始终在 1..=12
        month_letter(self.month).unwrap_or('?')
    }

    pub fn year_2d(&self) -> u32 {
        self.year_2d
    }

    pub fn counter(&self) -> i64 {
        self.counter
    }

    /// 月份年份部分，例如 "J25"
    pub fn period_code(&self) -> String {
        format!("{}{:02}", self.month_letter(), self.year_2d)
    }

    /// 计数部分，例如 "00138"
    pub fn counter_code(&self) -> String {
        format!("{:05}", self.counter)
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.period_code(), self.counter_code())
    }
}

impl FromStr for SerialNumber {
    type Err = SerialParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (period, counter) = trimmed
            .split_once(' ')
            .ok_or_else(|| SerialParseError::MissingSeparator(trimmed.to_string()))?;

        let mut chars = period.chars();
        let letter = chars
            .next()
            .ok_or_else(|| SerialParseError::InvalidMonthLetter(period.to_string()))?;
        let month = month_from_letter(letter)
            .ok_or_else(|| SerialParseError::InvalidMonthLetter(letter.to_string()))?;

        let year_part = chars.as_str();
        if year_part.len() != 2 || !year_part.chars().all(|c| c.is_ascii_digit()) {
            return Err(SerialParseError::InvalidYear(year_part.to_string()));
        }
        let year_2d = year_part
            .parse::<u32>()
            .map_err(|_| SerialParseError::InvalidYear(year_part.to_string()))?;

        let counter_part = counter.trim();
        if counter_part.len() < 5 || !counter_part.chars().all(|c| c.is_ascii_digit()) {
            return Err(SerialParseError::InvalidCounter(counter_part.to_string()));
        }
        let counter = counter_part
            .parse::<i64>()
            .map_err(|_| SerialParseError::InvalidCounter(counter_part.to_string()))?;

        Ok(Self {
            month,
            year_2d,
            counter,
        })
    }
}
