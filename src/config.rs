// config.rs — 配置管理模块
// 遵循 Unix 风格：优先从 ~/.config/bingwall/config.toml 读取配置
// 秘钥的优先级：环境变量 > 配置文件内容；解析结果以显式结构体传给各客户端

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog;
use crate::error::{Error, Result};
use crate::server::RenderMode;
use crate::source::bing::MarketParam;

/// 映射 config.toml 文件内容的嵌套结构体
#[derive(Debug, Deserialize, Serialize, Default, JsonSchema)]
struct ConfigFile {
    #[serde(default)]
    source: SourceSection,
    #[serde(default)]
    server: ServerSection,
    #[serde(default)]
    telegram: TelegramSection,
    #[serde(default)]
    github: GithubSection,
    #[serde(default)]
    schedule: ScheduleSection,
}

/// 上游抓取相关配置
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct SourceSection {
    /// 上游查询参数键法：mkt 传 locale（en-US），cc 传短地区代码（us）
    #[serde(default)]
    pub market_param: MarketParam,
    /// Accept-Language 偏好列表，为空则不发该头
    #[serde(default)]
    pub accept_language: Vec<String>,
    /// 请求未带 region 参数时的默认地区
    #[serde(default = "default_region")]
    pub default_region: String,
    /// 请求未带 resolution 参数时的默认分辨率
    #[serde(default = "default_resolution")]
    pub default_resolution: String,
    /// 出站请求超时（秒）
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            market_param: MarketParam::default(),
            accept_language: Vec::new(),
            default_region: default_region(),
            default_resolution: default_resolution(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// HTTP 服务配置
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct ServerSection {
    /// 监听地址
    #[serde(default = "default_listen")]
    pub listen: String,
    /// 响应渲染模式（image 直出图片字节 / json 返回摘要）
    #[serde(default)]
    pub render: RenderMode,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            render: RenderMode::default(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Default, JsonSchema)]
struct TelegramSection {
    bot_token: Option<String>,
    chat_id: Option<String>,
    /// 是否在消息末尾附上原图链接
    #[serde(default)]
    caption_link: bool,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
struct GithubSection {
    owner: Option<String>,
    repo: Option<String>,
    workflow_id: Option<String>,
    token: Option<String>,
    /// workflow_dispatch 的目标分支
    #[serde(rename = "ref", default = "default_git_ref")]
    git_ref: String,
    /// 固定的 inputs.info 取值
    #[serde(default = "default_dispatch_info")]
    info: String,
}

impl Default for GithubSection {
    fn default() -> Self {
        Self {
            owner: None,
            repo: None,
            workflow_id: None,
            token: None,
            git_ref: default_git_ref(),
            info: default_dispatch_info(),
        }
    }
}

/// 定时推送配置
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct ScheduleSection {
    /// serve 模式下是否启用内置定时循环
    #[serde(default)]
    pub enabled: bool,
    /// 推送周期（秒）
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// 每轮的地区选取："random" 或固定地区代码
    #[serde(default = "default_schedule_region")]
    pub region: String,
}

impl Default for ScheduleSection {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: default_interval_secs(),
            region: default_schedule_region(),
        }
    }
}

fn default_region() -> String {
    "en-US".to_string()
}
fn default_resolution() -> String {
    "4K".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_listen() -> String {
    "127.0.0.1:8080".to_string()
}
fn default_git_ref() -> String {
    "master".to_string()
}
fn default_dispatch_info() -> String {
    "bingwall".to_string()
}
fn default_interval_secs() -> u64 {
    86_400
}
fn default_schedule_region() -> String {
    "random".to_string()
}

/// Telegram 推送所需的全部参数
/// 以结构体整体传入 TelegramNotifier，进程内没有全局可变秘钥
#[derive(Debug, Clone)]
pub struct TelegramSettings {
    pub bot_token: String,
    pub chat_id: String,
    pub caption_link: bool,
}

/// workflow_dispatch 所需的全部参数，四个必填项齐了才算启用
#[derive(Debug, Clone)]
pub struct GithubSettings {
    pub owner: String,
    pub repo: String,
    pub workflow_id: String,
    pub token: String,
    pub git_ref: String,
    pub info: String,
}

/// 环境变量形式的秘钥覆盖
#[derive(Debug, Default)]
struct EnvOverrides {
    bot_token: Option<String>,
    chat_id: Option<String>,
    gh_token: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            bot_token: env::var("TG_BOT_TOKEN").ok(),
            chat_id: env::var("TG_CHAT_ID").ok(),
            gh_token: env::var("GH_TOKEN").ok(),
        }
    }
}

/// 应用全局配置项（解析后的形态）
pub struct AppConfig {
    /// 配置文件所在路径
    pub config_path: PathBuf,
    pub source: SourceSection,
    pub server: ServerSection,
    /// bot_token 与 chat_id 都齐了才是 Some
    pub telegram: Option<TelegramSettings>,
    /// owner/repo/workflow_id/token 都齐了才是 Some
    pub github: Option<GithubSettings>,
    pub schedule: ScheduleSection,
}

impl AppConfig {
    /// 初始化配置：读文件、叠加环境变量
    pub fn new() -> Self {
        let home = env::var("HOME").expect("无法获取 $HOME 环境变量");
        let config_path = PathBuf::from(home)
            .join(".config")
            .join("bingwall")
            .join("config.toml");

        let config_file = Self::load_config_from_file(&config_path).unwrap_or_default();
        Self::resolve(config_file, EnvOverrides::from_env(), config_path)
    }

    /// 辅助函数：解析 TOML 配置文件
    fn load_config_from_file(path: &Path) -> Option<ConfigFile> {
        fs::read_to_string(path)
            .ok()
            .and_then(|content| toml::from_str(&content).ok())
    }

    fn resolve(config_file: ConfigFile, env: EnvOverrides, config_path: PathBuf) -> Self {
        // 优先级：环境变量 > 配置文件内容
        let bot_token = env.bot_token.or(config_file.telegram.bot_token);
        let chat_id = env.chat_id.or(config_file.telegram.chat_id);
        let telegram = match (bot_token, chat_id) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramSettings {
                bot_token,
                chat_id,
                caption_link: config_file.telegram.caption_link,
            }),
            _ => None,
        };

        let gh_token = env.gh_token.or(config_file.github.token);
        let github = match (
            config_file.github.owner,
            config_file.github.repo,
            config_file.github.workflow_id,
            gh_token,
        ) {
            (Some(owner), Some(repo), Some(workflow_id), Some(token)) => Some(GithubSettings {
                owner,
                repo,
                workflow_id,
                token,
                git_ref: config_file.github.git_ref,
                info: config_file.github.info,
            }),
            _ => None,
        };

        Self {
            config_path,
            source: config_file.source,
            server: config_file.server,
            telegram,
            github,
            schedule: config_file.schedule,
        }
    }

    /// 确保配置目录存在
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    fn to_config_file(&self) -> ConfigFile {
        ConfigFile {
            source: self.source.clone(),
            server: self.server.clone(),
            telegram: TelegramSection {
                bot_token: self.telegram.as_ref().map(|t| t.bot_token.clone()),
                chat_id: self.telegram.as_ref().map(|t| t.chat_id.clone()),
                caption_link: self.telegram.as_ref().is_some_and(|t| t.caption_link),
            },
            github: GithubSection {
                owner: self.github.as_ref().map(|g| g.owner.clone()),
                repo: self.github.as_ref().map(|g| g.repo.clone()),
                workflow_id: self.github.as_ref().map(|g| g.workflow_id.clone()),
                token: self.github.as_ref().map(|g| g.token.clone()),
                git_ref: self
                    .github
                    .as_ref()
                    .map(|g| g.git_ref.clone())
                    .unwrap_or_else(default_git_ref),
                info: self
                    .github
                    .as_ref()
                    .map(|g| g.info.clone())
                    .unwrap_or_else(default_dispatch_info),
            },
            schedule: self.schedule.clone(),
        }
    }

    /// 将配置保存回文件
    pub fn save(&self) -> std::io::Result<()> {
        let toml_str = toml::to_string_pretty(&self.to_config_file())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        fs::write(&self.config_path, toml_str)
    }

    /// 修改单个配置项，取值在写入前先过目录校验
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "region" => {
                catalog::lookup_region(value)?;
                self.source.default_region = value.to_string();
            }
            "res" | "resolution" => {
                catalog::lookup_resolution(value)?;
                self.source.default_resolution = value.to_string();
            }
            "listen" => self.server.listen = value.to_string(),
            "render" => {
                self.server.render = match value {
                    "image" => RenderMode::Image,
                    "json" => RenderMode::Json,
                    other => return Err(Error::Config(format!("不支持的渲染模式: {other}"))),
                };
            }
            "interval" => {
                self.schedule.interval_secs = value
                    .parse()
                    .map_err(|_| Error::Config(format!("周期必须是秒数: {value}")))?;
            }
            "schedule-region" => {
                if value != "random" {
                    catalog::lookup_region(value)?;
                }
                self.schedule.region = value.to_string();
            }
            _ => return Err(Error::Config(format!("不支持的配置项: {key}"))),
        }
        Ok(())
    }

    /// 获取配置文件的 JSON Schema
    pub fn get_schema() -> String {
        let schema = schemars::schema_for!(ConfigFile);
        serde_json::to_string_pretty(&schema).unwrap()
    }

    /// 将当前配置转换为 TOML 字符串
    pub fn to_toml(&self) -> String {
        let toml_str = toml::to_string_pretty(&self.to_config_file())
            .unwrap_or_else(|_| "# Error serializing config".to_string());

        // 在 [telegram] 节前追加注释说明
        // toml 库不支持带注释序列化，所以手动插入
        toml_str.replace(
            "[telegram]",
            "# Telegram 推送配置\n# bot_token / chat_id 也可用环境变量 TG_BOT_TOKEN / TG_CHAT_ID 覆盖\n# GitHub token 对应的环境变量是 GH_TOKEN\n[telegram]",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> PathBuf {
        PathBuf::from("/tmp/bingwall-test/config.toml")
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config_file: ConfigFile = toml::from_str("").unwrap();
        let config = AppConfig::resolve(config_file, EnvOverrides::default(), path());

        assert_eq!(config.source.market_param, MarketParam::Mkt);
        assert_eq!(config.source.default_region, "en-US");
        assert_eq!(config.source.default_resolution, "4K");
        assert_eq!(config.server.listen, "127.0.0.1:8080");
        assert_eq!(config.server.render, RenderMode::Image);
        assert_eq!(config.schedule.interval_secs, 86_400);
        assert_eq!(config.schedule.region, "random");
        assert!(!config.schedule.enabled);
        assert!(config.telegram.is_none());
        assert!(config.github.is_none());
    }

    #[test]
    fn telegram_from_file() {
        let config_file: ConfigFile = toml::from_str(
            r#"
            [telegram]
            bot_token = "123:abc"
            chat_id = "@channel"
            caption_link = true
            "#,
        )
        .unwrap();
        let config = AppConfig::resolve(config_file, EnvOverrides::default(), path());

        let telegram = config.telegram.unwrap();
        assert_eq!(telegram.bot_token, "123:abc");
        assert_eq!(telegram.chat_id, "@channel");
        assert!(telegram.caption_link);
    }

    #[test]
    fn env_wins_over_file() {
        let config_file: ConfigFile = toml::from_str(
            r#"
            [telegram]
            bot_token = "file-token"
            chat_id = "@file"
            "#,
        )
        .unwrap();
        let env = EnvOverrides {
            bot_token: Some("env-token".to_string()),
            chat_id: None,
            gh_token: None,
        };
        let config = AppConfig::resolve(config_file, env, path());

        let telegram = config.telegram.unwrap();
        assert_eq!(telegram.bot_token, "env-token");
        assert_eq!(telegram.chat_id, "@file");
    }

    #[test]
    fn incomplete_github_section_is_disabled() {
        let config_file: ConfigFile = toml::from_str(
            r#"
            [github]
            owner = "someone"
            repo = "wallpapers"
            "#,
        )
        .unwrap();
        let config = AppConfig::resolve(config_file, EnvOverrides::default(), path());
        assert!(config.github.is_none());
    }

    #[test]
    fn complete_github_section_with_env_token() {
        let config_file: ConfigFile = toml::from_str(
            r#"
            [github]
            owner = "someone"
            repo = "wallpapers"
            workflow_id = "build.yml"
            ref = "main"
            "#,
        )
        .unwrap();
        let env = EnvOverrides {
            bot_token: None,
            chat_id: None,
            gh_token: Some("ghp_xxx".to_string()),
        };
        let config = AppConfig::resolve(config_file, env, path());

        let github = config.github.unwrap();
        assert_eq!(github.owner, "someone");
        assert_eq!(github.git_ref, "main");
        assert_eq!(github.info, "bingwall");
        assert_eq!(github.token, "ghp_xxx");
    }

    #[test]
    fn market_param_cc_from_file() {
        let config_file: ConfigFile = toml::from_str(
            r#"
            [source]
            market_param = "cc"
            accept_language = ["en-US", "zh-CN"]
            "#,
        )
        .unwrap();
        let config = AppConfig::resolve(config_file, EnvOverrides::default(), path());
        assert_eq!(config.source.market_param, MarketParam::Cc);
        assert_eq!(config.source.accept_language, vec!["en-US", "zh-CN"]);
    }

    #[test]
    fn set_rejects_unknown_values() {
        let config_file: ConfigFile = toml::from_str("").unwrap();
        let mut config = AppConfig::resolve(config_file, EnvOverrides::default(), path());

        assert!(config.set("region", "atlantis").is_err());
        assert!(config.set("resolution", "8K").is_err());
        assert!(config.set("render", "xml").is_err());
        assert!(config.set("whatever", "x").is_err());

        config.set("region", "cn").unwrap();
        assert_eq!(config.source.default_region, "cn");
        config.set("render", "json").unwrap();
        assert_eq!(config.server.render, RenderMode::Json);
        config.set("schedule-region", "random").unwrap();
        config.set("interval", "3600").unwrap();
        assert_eq!(config.schedule.interval_secs, 3600);
    }
}
