// bing.rs — Bing 每日壁纸异步客户端模块
// 负责与 HPImageArchive 接口交互：查询当日壁纸元数据、下载原图

use super::{WallpaperRecord, WallpaperSource};
use crate::catalog::{self, RegionEntry};
use crate::error::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::ACCEPT_LANGUAGE;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// 上游查询参数的两种键法：mkt 传 locale（en-US），cc 传短地区代码（us）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MarketParam {
    #[default]
    Mkt,
    Cc,
}

/// HPImageArchive 响应的顶层结构
///
/// 只提取需要的字段，JSON 中多余的字段会被 serde 自动忽略
#[derive(Deserialize, Debug)]
pub struct ImageArchive {
    /// 当日壁纸列表（n=1 时至多一个元素）
    pub images: Vec<ArchiveImage>,
}

/// 单张壁纸的数据结构
#[derive(Deserialize, Debug)]
pub struct ArchiveImage {
    /// 不含分辨率后缀的 URL 片段（如 "/th?id=OHR.Xxx"）
    pub urlbase: String,
    /// 壁纸对应的日期（yyyyMMdd）
    pub enddate: String,
    pub title: String,
    pub copyright: String,
}

/// Bing 每日壁纸异步客户端
///
/// 封装了 reqwest::Client 和查询配置，提供抓取与下载方法。
/// `reqwest::Client` 内部维护连接池，整个进程复用同一个实例。
pub struct BingClient {
    client: reqwest::Client,
    /// 上游站点根地址（也是拼壁纸 URL 的 host）
    base_url: String,
    /// 查询参数键法（mkt / cc）
    market_param: MarketParam,
    /// Accept-Language 偏好列表，为空则不发该头
    accept_language: Vec<String>,
}

impl BingClient {
    pub fn new(
        client: reqwest::Client,
        market_param: MarketParam,
        accept_language: Vec<String>,
    ) -> Self {
        Self {
            client,
            base_url: String::from("https://www.bing.com"),
            market_param,
            accept_language,
        }
    }

    /// 根据键法配置选出 (参数名, 参数值)
    fn market_query(&self, region: &RegionEntry) -> (&'static str, &'static str) {
        match self.market_param {
            MarketParam::Mkt => ("mkt", region.locale),
            MarketParam::Cc => ("cc", region.key),
        }
    }
}

#[async_trait]
impl WallpaperSource for BingClient {
    async fn fetch(&self, region_key: &str, resolution_key: &str) -> Result<WallpaperRecord> {
        // 先查目录，查不到直接报错，不发任何网络请求
        let region = catalog::lookup_region(region_key)?;
        let resolution = catalog::lookup_resolution(resolution_key)?;

        let url = format!("{}/HPImageArchive.aspx", self.base_url);
        let (param, code) = self.market_query(region);

        let mut request = self.client.get(&url).query(&[
            ("format", "js"),
            ("idx", "0"),
            ("n", "1"),
            (param, code),
        ]);

        if !self.accept_language.is_empty() {
            request = request.header(ACCEPT_LANGUAGE, self.accept_language.join(", "));
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream(format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Upstream(e.to_string()))?;

        let archive: ImageArchive =
            serde_json::from_str(&body).map_err(|e| Error::MalformedResponse(e.to_string()))?;

        record_from_archive(&self.base_url, region, resolution.suffix, archive)
    }

    async fn download(&self, record: &WallpaperRecord) -> Result<Bytes> {
        let response = self
            .client
            .get(&record.image_url)
            .send()
            .await
            .map_err(|e| Error::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream(format!("HTTP {status}")));
        }

        response
            .bytes()
            .await
            .map_err(|e| Error::Upstream(e.to_string()))
    }
}

/// 从解析好的响应构造统一的壁纸元数据
/// 取列表第 0 个元素；列表为空返回 NoWallpaper
fn record_from_archive(
    base_url: &str,
    region: &RegionEntry,
    suffix: &str,
    archive: ImageArchive,
) -> Result<WallpaperRecord> {
    let image = archive.images.into_iter().next().ok_or(Error::NoWallpaper)?;

    Ok(WallpaperRecord {
        image_url: format!("{}{}_{}", base_url, image.urlbase, suffix),
        display_region: region.display_name.to_string(),
        date: image.enddate,
        title: image.title,
        copyright: image.copyright,
    })
}
