// ==========================================
// 日志初始化
// ==========================================
// stdout 只放命令结果（JSON），日志一律走 stderr
// 过滤器取 RUST_LOG，缺省 info
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// 安装全局订阅者，进程内只调用一次
///
/// `json = true` 时每条事件一行 JSON，便于日志采集；
/// 否则为带目标模块和行号的文本格式。
pub fn init(json: bool) {
    let subscriber = fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_line_number(true);

    if json {
        subscriber.json().init();
    } else {
        subscriber.with_target(true).init();
    }
}

/// 测试用: 输出交给测试框架捕获，重复调用无副作用
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("serial_label_engine=debug"))
        .with_test_writer()
        .try_init();
}
