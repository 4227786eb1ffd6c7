// source/mod.rs — 壁纸源抽象接口模块
// 定义壁纸上游（目前只有 Bing）必须实现的通用 Trait

pub mod bing;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// 统一的每日壁纸元数据结构
/// 每次抓取新建一份，用完即弃，不做任何缓存
#[derive(Debug, Clone)]
pub struct WallpaperRecord {
    /// 壁纸原图的完整 URL（host + urlbase + "_" + 分辨率后缀）
    pub image_url: String,
    /// 展示用地区名（如 "China"）
    pub display_region: String,
    /// 上游给出的日期（enddate，格式 yyyyMMdd）
    pub date: String,
    /// 壁纸标题
    pub title: String,
    /// 版权说明
    pub copyright: String,
}

/// 壁纸源的抽象 Trait
///
/// # 异步 Trait 说明
/// Rust 原生目前对 Trait 中的 async fn 支持有限，
/// 这里使用 `async_trait` 宏来支持异步接口。
#[async_trait]
pub trait WallpaperSource {
    /// 按地区和分辨率抓取当日壁纸的元数据
    /// 两个参数都必须能在目录中查到，否则在发出任何网络请求前就报错
    async fn fetch(&self, region_key: &str, resolution_key: &str) -> Result<WallpaperRecord>;

    /// 下载壁纸原图字节（图片直出模式使用）
    async fn download(&self, record: &WallpaperRecord) -> Result<Bytes>;
}
