// cli.rs — 命令行接口定义模块
// 使用 clap 的 derive 模式定义所有子命令和参数

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Bing 每日壁纸抓取与推送服务
///
/// 抓取 Bing 当日壁纸，推送到 Telegram 频道，
/// 并通过 HTTP 对外提供图片直出或 JSON 摘要。
#[derive(Parser)]
#[command(name = "bingwall")]
#[command(version)]
#[command(about = "Bing 每日壁纸抓取与推送服务 — 定时推送到 Telegram，HTTP 对外提供壁纸")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 启动 HTTP 服务（按配置可同时启用内置定时推送循环）
    ///
    /// 用法示例:
    ///   bingwall serve
    ///   bingwall serve --listen 0.0.0.0:8080
    Serve {
        /// 监听地址（覆盖配置文件中的 server.listen）
        #[arg(short, long)]
        listen: Option<String>,
    },

    /// 执行一轮推送流程后退出（供 cron / systemd timer 调用）
    ///
    /// 用法示例:
    ///   bingwall tick
    Tick,

    /// 抓取一次当日壁纸元数据并打印到终端
    ///
    /// 用法示例:
    ///   bingwall fetch
    ///   bingwall fetch --region cn --resolution 1080
    Fetch {
        /// 地区代码（短代码如 "cn"，或 locale 如 "zh-CN"）
        #[arg(short, long)]
        region: Option<String>,

        /// 分辨率标签（1080 / 4K）
        #[arg(short = 'R', long)]
        resolution: Option<String>,
    },

    /// 生成 shell 补全脚本（支持 bash, zsh, fish, elvish, powershell）
    ///
    /// 用法示例：
    ///   bingwall completions zsh > ~/.zsh/completions/_bingwall
    Completions {
        /// 目标 shell 类型
        shell: Shell,
    },

    /// 配置管理操作
    ///
    /// 用法示例:
    ///   bingwall config show
    ///   bingwall config dump
    ///   bingwall config set region cn
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// 配置管理操作
#[derive(Subcommand)]
pub enum ConfigAction {
    /// 查看当前所有配置简报
    Show,
    /// 生成配置文件对应的 JSON Schema
    Schema,
    /// 以 TOML 格式打印当前完整配置内容
    Dump,
    /// 设置配置项的值 (支持: region, resolution, listen, render, interval, schedule-region)
    Set {
        /// 要设置的键
        key: String,
        /// 要设置的值
        value: String,
    },
}
