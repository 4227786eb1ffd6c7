// main.rs — 程序入口
// 负责初始化异步运行时与日志、解析命令行参数、分发子命令

mod catalog; // 地区与分辨率目录
mod cli; // 命令行定义
mod config; // 配置管理
mod error; // 统一错误类型
mod github; // workflow_dispatch 触发
mod schedule; // 定时推送编排
mod server; // 对外 HTTP 服务
mod source; // 壁纸源抽象与 Bing 客户端
mod telegram; // Telegram 推送

use std::sync::Arc;
use std::time::Duration;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use tracing::warn;

use cli::{Cli, Commands};
use config::AppConfig;
use error::{Error, Result};
use github::WorkflowDispatcher;
use schedule::RegionPick;
use server::AppState;
use source::WallpaperSource;
use source::bing::BingClient;
use telegram::TelegramNotifier;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // 解析命令行参数
    let cli = Cli::parse();

    // 创建应用配置（读取配置文件、叠加环境变量）
    let mut config = AppConfig::new();
    config.ensure_dirs()?;

    // 根据子命令分发执行逻辑
    match &cli.command {
        Commands::Serve { listen } => {
            handle_serve(&config, listen.as_deref()).await?;
        }

        Commands::Tick => {
            handle_tick(&config).await?;
        }

        Commands::Fetch { region, resolution } => {
            handle_fetch(&config, region.as_deref(), resolution.as_deref()).await?;
        }

        Commands::Completions { shell } => {
            generate(
                *shell,
                &mut Cli::command(),
                "bingwall",
                &mut std::io::stdout(),
            );
        }

        Commands::Config { action } => {
            handle_config(&mut config, action)?;
        }
    }

    Ok(())
}

/// 日志初始化：RUST_LOG 可覆盖，默认 info
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/// 整个进程共用一个 reqwest::Client（内部有连接池）
fn build_http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("bingwall/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::Config(format!("无法构建 HTTP 客户端: {e}")))
}

fn build_source(config: &AppConfig, client: reqwest::Client) -> BingClient {
    BingClient::new(
        client,
        config.source.market_param,
        config.source.accept_language.clone(),
    )
}

/// 处理 serve 子命令：启动 HTTP 服务，按配置附带定时推送循环
async fn handle_serve(config: &AppConfig, listen_override: Option<&str>) -> Result<()> {
    let client = build_http_client(config.source.timeout_secs)?;

    if config.schedule.enabled {
        match &config.telegram {
            Some(settings) => {
                let source = build_source(config, client.clone());
                let notifier = TelegramNotifier::new(client.clone(), settings);
                let dispatcher = config
                    .github
                    .as_ref()
                    .map(|g| WorkflowDispatcher::new(client.clone(), g));
                let pick = RegionPick::parse(&config.schedule.region);

                tokio::spawn(schedule::run_loop(
                    config.schedule.interval_secs,
                    source,
                    notifier,
                    dispatcher,
                    pick,
                ));
            }
            None => warn!("已启用定时推送但未配置 Telegram，跳过定时循环"),
        }
    }

    let state = AppState {
        source: Arc::new(build_source(config, client)),
        render: config.server.render,
        default_region: config.source.default_region.clone(),
        default_resolution: config.source.default_resolution.clone(),
    };

    let listen = listen_override.unwrap_or(&config.server.listen);
    server::serve(listen, state).await
}

/// 处理 tick 子命令：跑一轮推送流程就退出
/// 流程内部的失败只记日志，不以非零码通知外部定时器
async fn handle_tick(config: &AppConfig) -> Result<()> {
    let settings = config
        .telegram
        .as_ref()
        .ok_or_else(|| Error::Config("未配置 Telegram（bot_token / chat_id）".to_string()))?;

    let client = build_http_client(config.source.timeout_secs)?;
    let source = build_source(config, client.clone());
    let notifier = TelegramNotifier::new(client.clone(), settings);
    let dispatcher = config
        .github
        .as_ref()
        .map(|g| WorkflowDispatcher::new(client, g));
    let pick = RegionPick::parse(&config.schedule.region);

    schedule::run_once(&source, &notifier, dispatcher.as_ref(), &pick).await;
    Ok(())
}

/// 处理 fetch 子命令：抓一次元数据打印出来，方便人工确认
async fn handle_fetch(
    config: &AppConfig,
    region: Option<&str>,
    resolution: Option<&str>,
) -> Result<()> {
    let client = build_http_client(config.source.timeout_secs)?;
    let source = build_source(config, client);

    let region = region.unwrap_or(&config.source.default_region);
    let resolution = resolution.unwrap_or(&config.source.default_resolution);

    let record = source.fetch(region, resolution).await?;

    println!("地区: {}", record.display_region);
    println!("日期: {}", record.date);
    println!("标题: {}", record.title);
    println!("版权: {}", record.copyright);
    println!("原图: {}", record.image_url);
    Ok(())
}

/// 处理 config 子命令：查看或修改配置
fn handle_config(
    config: &mut AppConfig,
    action: &cli::ConfigAction,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    match action {
        cli::ConfigAction::Show => {
            println!("配置文件: {}", config.config_path.display());
            println!("监听地址: {}", config.server.listen);
            println!(
                "渲染模式: {}",
                match config.server.render {
                    server::RenderMode::Image => "image",
                    server::RenderMode::Json => "json",
                }
            );
            println!(
                "默认地区 / 分辨率: {} / {}",
                config.source.default_region, config.source.default_resolution
            );
            println!(
                "Telegram: {}",
                if config.telegram.is_some() {
                    "已配置"
                } else {
                    "未配置"
                }
            );
            println!(
                "GitHub 工作流: {}",
                if config.github.is_some() {
                    "已配置"
                } else {
                    "未配置"
                }
            );
            println!(
                "定时推送: {} (每 {} 秒, 地区 {})",
                if config.schedule.enabled {
                    "启用"
                } else {
                    "停用"
                },
                config.schedule.interval_secs,
                config.schedule.region
            );
        }
        cli::ConfigAction::Schema => {
            println!("{}", AppConfig::get_schema());
        }
        cli::ConfigAction::Dump => {
            println!("{}", config.to_toml());
        }
        cli::ConfigAction::Set { key, value } => {
            config.set(key, value)?;
            config.save()?;
            println!("已更新 {key} = {value}");
        }
    }
    Ok(())
}
