// schedule.rs — 定时推送编排模块
// 选地区 -> 抓壁纸 -> 推 Telegram -> （可选）触发工作流，严格串行
// 任一步失败即中止本轮并记日志，错误不向宿主定时器传播

use std::time::Duration;

use tracing::{error, info, warn};

use crate::catalog;
use crate::error::Result;
use crate::github::Dispatcher;
use crate::source::WallpaperSource;
use crate::telegram::Notifier;

/// 每轮推送的地区选取方式
#[derive(Debug, Clone)]
pub enum RegionPick {
    /// 从地区目录中等概率随机挑选
    Random,
    /// 固定使用同一个地区代码
    Fixed(String),
}

impl RegionPick {
    /// 配置里 "random" 表示随机，其余值当作固定地区代码
    pub fn parse(value: &str) -> Self {
        if value == "random" {
            RegionPick::Random
        } else {
            RegionPick::Fixed(value.to_string())
        }
    }

    fn select(&self) -> String {
        match self {
            RegionPick::Random => catalog::random_region_key().to_string(),
            RegionPick::Fixed(key) => key.clone(),
        }
    }
}

/// 执行一轮推送，内部兜住所有错误
pub async fn run_once<S, N, D>(
    source: &S,
    notifier: &N,
    dispatcher: Option<&D>,
    pick: &RegionPick,
) where
    S: WallpaperSource + Sync,
    N: Notifier + Sync,
    D: Dispatcher + Sync,
{
    let region = pick.select();
    info!(region = %region, "开始定时推送");

    match run_pipeline(source, notifier, dispatcher, &region).await {
        Ok(()) => info!(region = %region, "定时推送完成"),
        Err(err) => error!(region = %region, error = %err, "定时推送失败"),
    }
}

/// 串行执行三步；前一步失败直接经 ? 中止后续步骤
async fn run_pipeline<S, N, D>(
    source: &S,
    notifier: &N,
    dispatcher: Option<&D>,
    region: &str,
) -> Result<()>
where
    S: WallpaperSource + Sync,
    N: Notifier + Sync,
    D: Dispatcher + Sync,
{
    let record = source.fetch(region, catalog::HIGHEST_RESOLUTION).await?;
    info!(date = %record.date, title = %record.title, "已抓到当日壁纸");

    notifier.notify(&record).await?;
    info!("已推送到 Telegram");

    // 工作流触发本身也是 fire-and-forget，失败只记日志
    if let Some(dispatcher) = dispatcher {
        match dispatcher.trigger().await {
            Ok(()) => info!("已触发远端工作流"),
            Err(err) => warn!(error = %err, "远端工作流触发失败"),
        }
    }

    Ok(())
}

/// serve 模式下的内置定时循环：每个周期跑一轮 run_once
/// 启动时先空转掉 interval 的立即触发，首轮在一个完整周期之后
pub async fn run_loop<S, N, D>(
    interval_secs: u64,
    source: S,
    notifier: N,
    dispatcher: Option<D>,
    pick: RegionPick,
) where
    S: WallpaperSource + Sync,
    N: Notifier + Sync,
    D: Dispatcher + Sync,
{
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    ticker.tick().await;

    info!(interval_secs, "定时推送循环已启动");
    loop {
        ticker.tick().await;
        run_once(&source, &notifier, dispatcher.as_ref(), &pick).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::source::WallpaperRecord;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubSource {
        fail: bool,
        fetches: AtomicUsize,
    }

    impl StubSource {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                fetches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl WallpaperSource for StubSource {
        async fn fetch(&self, _region: &str, resolution: &str) -> crate::error::Result<WallpaperRecord> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            assert_eq!(resolution, catalog::HIGHEST_RESOLUTION);
            if self.fail {
                return Err(Error::NoWallpaper);
            }
            Ok(WallpaperRecord {
                image_url: "https://www.bing.com/th?id=OHR.Sample_UHD.jpg".to_string(),
                display_region: "China".to_string(),
                date: "20260801".to_string(),
                title: "Sample Title".to_string(),
                copyright: "Somewhere (©Someone)".to_string(),
            })
        }

        async fn download(&self, _record: &WallpaperRecord) -> crate::error::Result<bytes::Bytes> {
            unreachable!("定时路径不会下载图片字节")
        }
    }

    struct CountingNotifier {
        fail: bool,
        calls: AtomicUsize,
    }

    impl CountingNotifier {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Notifier for CountingNotifier {
        async fn notify(&self, _record: &WallpaperRecord) -> crate::error::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::NotificationDelivery("HTTP 502".to_string()));
            }
            Ok(())
        }
    }

    struct CountingDispatcher {
        calls: AtomicUsize,
    }

    impl CountingDispatcher {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Dispatcher for CountingDispatcher {
        async fn trigger(&self) -> crate::error::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn successful_run_notifies_and_dispatches_once() {
        let source = StubSource::new(false);
        let notifier = CountingNotifier::new(false);
        let dispatcher = CountingDispatcher::new();

        run_once(&source, &notifier, Some(&dispatcher), &RegionPick::Fixed("cn".to_string())).await;

        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 1);
        assert_eq!(dispatcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fetch_failure_skips_notify_and_dispatch() {
        let source = StubSource::new(true);
        let notifier = CountingNotifier::new(false);
        let dispatcher = CountingDispatcher::new();

        run_once(&source, &notifier, Some(&dispatcher), &RegionPick::Fixed("cn".to_string())).await;

        assert_eq!(notifier.calls.load(Ordering::SeqCst), 0);
        assert_eq!(dispatcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn notify_failure_skips_dispatch() {
        let source = StubSource::new(false);
        let notifier = CountingNotifier::new(true);
        let dispatcher = CountingDispatcher::new();

        run_once(&source, &notifier, Some(&dispatcher), &RegionPick::Fixed("cn".to_string())).await;

        assert_eq!(notifier.calls.load(Ordering::SeqCst), 1);
        assert_eq!(dispatcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn run_without_dispatcher_still_notifies() {
        let source = StubSource::new(false);
        let notifier = CountingNotifier::new(false);

        run_once::<_, _, CountingDispatcher>(
            &source,
            &notifier,
            None,
            &RegionPick::Random,
        )
        .await;

        assert_eq!(notifier.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn region_pick_parse() {
        assert!(matches!(RegionPick::parse("random"), RegionPick::Random));
        assert!(matches!(RegionPick::parse("cn"), RegionPick::Fixed(key) if key == "cn"));
    }
}
