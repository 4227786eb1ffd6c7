// telegram.rs — Telegram Bot 推送模块
// 调用 sendPhoto 接口把壁纸 URL 和文字说明推到频道，响应体直接丢弃

use crate::config::TelegramSettings;
use crate::error::{Error, Result};
use crate::source::WallpaperRecord;
use async_trait::async_trait;
use serde::Serialize;

/// 推送端的抽象 Trait，定时任务通过它与具体实现解耦
#[async_trait]
pub trait Notifier {
    /// 推送一条壁纸消息（fire-and-forget，不关心返回内容）
    async fn notify(&self, record: &WallpaperRecord) -> Result<()>;
}

/// sendPhoto 的请求体
/// photo 传图片 URL，由 Telegram 服务端自行拉取，不传图片字节
#[derive(Serialize)]
struct SendPhoto<'a> {
    chat_id: &'a str,
    photo: &'a str,
    caption: String,
}

/// Telegram Bot API 异步客户端
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
    /// 是否在文字说明末尾附上原图链接
    caption_link: bool,
}

impl TelegramNotifier {
    pub fn new(client: reqwest::Client, settings: &TelegramSettings) -> Self {
        Self {
            client,
            api_base: String::from("https://api.telegram.org"),
            bot_token: settings.bot_token.clone(),
            chat_id: settings.chat_id.clone(),
            caption_link: settings.caption_link,
        }
    }

    /// 拼接消息文字：标题 + 版权行，按配置附原图链接
    fn caption(&self, record: &WallpaperRecord) -> String {
        if self.caption_link {
            format!(
                "{}\n\n{}\n\n原图：{}",
                record.title, record.copyright, record.image_url
            )
        } else {
            format!("{}\n{}", record.title, record.copyright)
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, record: &WallpaperRecord) -> Result<()> {
        let url = format!("{}/bot{}/sendPhoto", self.api_base, self.bot_token);

        let body = SendPhoto {
            chat_id: &self.chat_id,
            photo: &record.image_url,
            caption: self.caption(record),
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::NotificationDelivery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::NotificationDelivery(format!("HTTP {status}")));
        }

        Ok(())
    }
}
