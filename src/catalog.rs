// catalog.rs — 地区与分辨率目录
// 两张编译期固定的小表：地区代码 -> 展示名 / 上游 locale，分辨率标签 -> 文件名后缀

use crate::error::{Error, Result};
use rand::seq::SliceRandom;

/// 单个地区条目
///
/// 同一条目同时携带短代码（如 "us"）和上游 locale（如 "en-US"），
/// 查询参数用哪一个由配置里的 market_param 决定。
#[derive(Debug, Clone, Copy)]
pub struct RegionEntry {
    /// 短地区代码（cc 参数使用）
    pub key: &'static str,
    /// 展示用地区名
    pub display_name: &'static str,
    /// 上游 locale 代码（mkt 参数使用）
    pub locale: &'static str,
}

pub static REGIONS: [RegionEntry; 9] = [
    RegionEntry { key: "us", display_name: "United States", locale: "en-US" },
    RegionEntry { key: "cn", display_name: "China", locale: "zh-CN" },
    RegionEntry { key: "jp", display_name: "Japan", locale: "ja-JP" },
    RegionEntry { key: "de", display_name: "Germany", locale: "de-DE" },
    RegionEntry { key: "ca", display_name: "Canada", locale: "en-CA" },
    RegionEntry { key: "gb", display_name: "United Kingdom", locale: "en-GB" },
    RegionEntry { key: "in", display_name: "India", locale: "en-IN" },
    RegionEntry { key: "fr", display_name: "France", locale: "fr-FR" },
    RegionEntry { key: "it", display_name: "Italy", locale: "it-IT" },
];

/// 单个分辨率条目：标签 -> 壁纸文件名后缀
#[derive(Debug, Clone, Copy)]
pub struct ResolutionEntry {
    pub key: &'static str,
    pub suffix: &'static str,
}

pub static RESOLUTIONS: [ResolutionEntry; 2] = [
    ResolutionEntry { key: "1080", suffix: "1920x1080.jpg" },
    ResolutionEntry { key: "4K", suffix: "UHD.jpg" },
];

/// 定时推送固定使用的最高画质档
pub const HIGHEST_RESOLUTION: &str = "4K";

/// 按短代码或 locale 查找地区，查不到返回 UnknownRegion
pub fn lookup_region(key: &str) -> Result<&'static RegionEntry> {
    REGIONS
        .iter()
        .find(|r| r.key == key || r.locale == key)
        .ok_or_else(|| Error::UnknownRegion(key.to_string()))
}

/// 按标签查找分辨率，查不到返回 InvalidResolution
pub fn lookup_resolution(key: &str) -> Result<&'static ResolutionEntry> {
    RESOLUTIONS
        .iter()
        .find(|r| r.key == key)
        .ok_or_else(|| Error::InvalidResolution(key.to_string()))
}

/// 从地区表中等概率随机挑一个短代码
pub fn random_region_key() -> &'static str {
    REGIONS
        .choose(&mut rand::thread_rng())
        .unwrap_or(&REGIONS[0])
        .key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_region_by_short_key() {
        let region = lookup_region("cn").unwrap();
        assert_eq!(region.locale, "zh-CN");
        assert_eq!(region.display_name, "China");
    }

    #[test]
    fn lookup_region_by_locale() {
        let region = lookup_region("en-US").unwrap();
        assert_eq!(region.key, "us");
    }

    #[test]
    fn lookup_region_unknown_is_error() {
        let err = lookup_region("atlantis").unwrap_err();
        assert!(matches!(err, Error::UnknownRegion(key) if key == "atlantis"));
    }

    #[test]
    fn lookup_resolution_known_keys() {
        assert_eq!(lookup_resolution("1080").unwrap().suffix, "1920x1080.jpg");
        assert_eq!(lookup_resolution("4K").unwrap().suffix, "UHD.jpg");
    }

    #[test]
    fn lookup_resolution_unknown_is_error() {
        let err = lookup_resolution("8K").unwrap_err();
        assert!(matches!(err, Error::InvalidResolution(key) if key == "8K"));
    }

    #[test]
    fn random_region_key_is_from_catalog() {
        for _ in 0..32 {
            let key = random_region_key();
            assert!(REGIONS.iter().any(|r| r.key == key));
        }
    }
}
