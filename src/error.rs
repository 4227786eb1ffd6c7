// error.rs — 统一错误类型
// 所有模块共用这一个枚举，在两个入口（HTTP 处理器、定时任务）处兜底转换

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// 地区代码不在目录中
    #[error("未知的地区代码: {0}")]
    UnknownRegion(String),

    /// 分辨率标签不在目录中
    #[error("未知的分辨率: {0}")]
    InvalidResolution(String),

    /// 上游请求失败（网络错误或非 2xx 状态码）
    #[error("上游服务不可用: {0}")]
    Upstream(String),

    /// 上游返回的内容无法按预期结构解析
    #[error("上游响应格式不正确: {0}")]
    MalformedResponse(String),

    /// 上游 images 列表为空
    #[error("上游未返回任何壁纸")]
    NoWallpaper,

    /// Telegram sendPhoto 调用失败
    #[error("Telegram 推送失败: {0}")]
    NotificationDelivery(String),

    /// 配置缺失或取值非法
    #[error("配置错误: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
