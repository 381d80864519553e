// ==========================================
// 组件序列号分配系统 - 命令行入口
// ==========================================
// 输出: 查询与批次结果以 JSON 写到 stdout，日志写到 stderr
// ==========================================

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

use serial_label_engine::api::{parse_index_policy, parse_override_start};
use serial_label_engine::{
    logging, AppState, BatchRequest, ComponentDefinition, ComponentRequest, EngineConfig,
};

/// 组件序列号分配与卡型标签生成
#[derive(Parser)]
#[command(name = "serial-label-engine", version)]
#[command(about = "组件序列号分配与卡型标签索引引擎", long_about = None)]
struct Cli {
    /// 配置文件路径（JSON）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 以 JSON 行输出日志
    #[arg(long, global = true)]
    json_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 组件注册表管理
    #[command(subcommand)]
    Component(ComponentCommand),

    /// 序列号计数器查询
    #[command(subcommand)]
    Serial(SerialCommand),

    /// 执行一次批次，输出生成记录
    Run {
        /// 总线数量
        #[arg(short, long)]
        buses: u32,

        /// 起始总线编号
        #[arg(short, long, default_value = "1")]
        start: u32,

        /// 组件请求文件（JSON 数组）
        #[arg(short, long)]
        request: PathBuf,
    },
}

#[derive(Subcommand)]
enum ComponentCommand {
    /// 列出全部组件
    List,

    /// 登记新组件
    Add {
        name: String,

        /// 零件编码（必填）
        #[arg(long)]
        code: String,

        /// 卡型前缀
        #[arg(long)]
        prefix: Option<String>,

        /// 起始序号（整数或 auto）
        #[arg(long, default_value = "")]
        resume: String,

        /// 索引策略（"7" 或 "1,3,5"）
        #[arg(long, default_value = "")]
        policy: String,

        /// 关闭卡型索引（标签 = 前缀原样）
        #[arg(long)]
        no_indexing: bool,
    },

    /// 修改组件（未给出的字段保持不变）
    Update {
        name: String,

        /// 新名称
        #[arg(long)]
        rename: Option<String>,

        #[arg(long)]
        code: Option<String>,

        #[arg(long)]
        prefix: Option<String>,

        /// 索引策略，传 auto 清空
        #[arg(long)]
        policy: Option<String>,

        /// 开启/关闭卡型索引
        #[arg(long)]
        indexing: Option<bool>,
    },

    /// 删除组件（计数器保留）
    Remove { name: String },

    /// 设置下一次批次的起始序号
    SetResume { name: String, value: String },
}

#[derive(Subcommand)]
enum SerialCommand {
    /// 列出全部计数器
    List,

    /// 最后发放的计数值（从未分配时为 -1）
    Last { name: String },

    /// 下一次分配的计数值
    Next {
        name: String,

        /// 覆写值（整数或 auto）
        #[arg(long = "override", default_value = "")]
        override_text: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.json_log);

    let config = EngineConfig::load(cli.config.as_deref())?;
    tracing::debug!(
        app = serial_label_engine::APP_NAME,
        version = serial_label_engine::VERSION,
        "启动"
    );

    let state = AppState::new(config).context("无法初始化AppState")?;

    match cli.command {
        Commands::Component(cmd) => run_component(&state, cmd),
        Commands::Serial(cmd) => run_serial(&state, cmd),
        Commands::Run {
            buses,
            start,
            request,
        } => {
            let components = read_request(&request)?;
            let result = state
                .batch_api
                .run_batch(&BatchRequest::new(buses, start, components))?;
            print_json(&result)
        }
    }
}

fn run_component(state: &AppState, cmd: ComponentCommand) -> Result<()> {
    let api = &state.component_api;

    match cmd {
        ComponentCommand::List => print_json(&api.list_components()?),

        ComponentCommand::Add {
            name,
            code,
            prefix,
            resume,
            policy,
            no_indexing,
        } => {
            let mut def = ComponentDefinition::new(name, code);
            def.card_prefix = prefix;
            def.resume_serial = parse_override_start(&resume)?;
            def.index_policy = parse_index_policy(&policy)?.unwrap_or_default();
            def.indexing_enabled = !no_indexing;

            api.add_component(def)?;
            println!("OK");
            Ok(())
        }

        ComponentCommand::Update {
            name,
            rename,
            code,
            prefix,
            policy,
            indexing,
        } => {
            let mut def = api.get_component(&name)?;
            if let Some(rename) = rename {
                def.name = rename;
            }
            if let Some(code) = code {
                def.part_code = code;
            }
            if let Some(prefix) = prefix {
                def.card_prefix = Some(prefix);
            }
            if let Some(policy) = policy {
                let text = if policy.trim().eq_ignore_ascii_case("auto") {
                    ""
                } else {
                    policy.as_str()
                };
                def.index_policy = parse_index_policy(text)?.unwrap_or_default();
            }
            if let Some(indexing) = indexing {
                def.indexing_enabled = indexing;
            }

            api.update_component(&name, def)?;
            println!("OK");
            Ok(())
        }

        ComponentCommand::Remove { name } => {
            api.remove_component(&name)?;
            println!("OK");
            Ok(())
        }

        ComponentCommand::SetResume { name, value } => {
            let Some(value) = parse_override_start(&value)? else {
                bail!("set-resume 需要一个非负整数");
            };
            api.set_resume_serial(&name, value)?;
            println!("OK");
            Ok(())
        }
    }
}

fn run_serial(state: &AppState, cmd: SerialCommand) -> Result<()> {
    let api = &state.serial_api;

    match cmd {
        SerialCommand::List => print_json(&api.list_states()?),
        SerialCommand::Last { name } => {
            println!("{}", api.get_last(&name)?);
            Ok(())
        }
        SerialCommand::Next {
            name,
            override_text,
        } => {
            let value = parse_override_start(&override_text)?;
            println!("{}", api.peek_next(&name, value)?);
            Ok(())
        }
    }
}

fn read_request(path: &Path) -> Result<Vec<ComponentRequest>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("无法读取请求文件: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("请求文件格式错误: {}", path.display()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
