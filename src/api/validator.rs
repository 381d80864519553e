// ==========================================
// 组件序列号分配系统 - 输入解析与校验
// ==========================================
// 职责: 把管理端/命令行的文本输入解析为类型化的值
// - 起始序号: 空 / "auto" → 未设置; 非负整数 → 覆写值
// - 索引策略: 空 → 未设置; 单个整数 → 起始偏移; 逗号分隔 → 循环列表
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::types::IndexPolicy;

/// 解析起始序号覆写值
///
/// # 返回
/// - Ok(None): 空文本或 "auto"（不区分大小写）
/// - Ok(Some(n)): 非负整数
/// - Err(InvalidOverride): 其他任何输入
pub fn parse_override_start(text: &str) -> ApiResult<Option<i64>> {
    let text = text.trim();
    if text.is_empty() || text.eq_ignore_ascii_case("auto") {
        return Ok(None);
    }

    let value: i64 = text
        .parse()
        .map_err(|_| ApiError::InvalidOverride(format!("起始序号必须是非负整数: {}", text)))?;
    if value < 0 {
        return Err(ApiError::InvalidOverride(format!(
            "起始序号不能为负数: {}",
            value
        )));
    }
    Ok(Some(value))
}

/// 解析索引策略文本
///
/// # 示例
/// - "" → None
/// - "7" → FixedOffset(7)
/// - "1,3,5" / "1, ,3" → Cyclic
pub fn parse_index_policy(text: &str) -> ApiResult<Option<IndexPolicy>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    if !text.contains(',') {
        let offset = parse_index_value(text)?;
        return Ok(Some(IndexPolicy::FixedOffset(offset)));
    }

    let values = text
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(parse_index_value)
        .collect::<ApiResult<Vec<_>>>()?;

    if values.is_empty() {
        return Ok(None);
    }
    Ok(Some(IndexPolicy::Cyclic(values)))
}

fn parse_index_value(item: &str) -> ApiResult<i64> {
    item.parse()
        .map_err(|_| ApiError::InvalidOverride(format!("索引策略包含非整数项: {}", item)))
}

/// 组件名称校验（去空白后非空）
pub fn validate_component_name(name: &str) -> ApiResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::InvalidInput("组件名称不能为空".to_string()));
    }
    Ok(name.to_string())
}
