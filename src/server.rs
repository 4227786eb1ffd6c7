// server.rs — 对外 HTTP 服务模块
// 单条路由：按 query 参数抓当日壁纸，按配置直出图片字节或返回 JSON 摘要

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::Result;
use crate::source::{WallpaperRecord, WallpaperSource, bing::BingClient};

/// 响应渲染模式：图片直出 / JSON 摘要
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    #[default]
    Image,
    Json,
}

/// 路由共享状态：抓取客户端 + 渲染配置
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<BingClient>,
    pub render: RenderMode,
    pub default_region: String,
    pub default_resolution: String,
}

/// 入站 query 参数，两个都可省略
#[derive(Debug, Default, Deserialize)]
pub struct WallpaperQuery {
    region: Option<String>,
    resolution: Option<String>,
}

/// JSON 摘要响应体
#[derive(Debug, Serialize)]
struct WallpaperSummary {
    text: String,
    img: String,
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/", get(handle_wallpaper)).with_state(state)
}

/// 绑定监听地址并一直跑到进程退出
pub async fn serve(listen: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(listen).await?;
    info!(listen = %listen, "HTTP 服务已启动");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn handle_wallpaper(
    State(state): State<AppState>,
    Query(query): Query<WallpaperQuery>,
) -> Response {
    let (region, resolution) = resolve_params(
        &query,
        &state.default_region,
        &state.default_resolution,
    );

    match render(&state, &region, &resolution).await {
        Ok(response) => response,
        Err(err) => {
            // 细节只进日志，给调用方的是不带内情的 500
            error!(region = %region, resolution = %resolution, error = %err, "壁纸请求处理失败");
            (StatusCode::INTERNAL_SERVER_ERROR, "Error handling request").into_response()
        }
    }
}

async fn render(state: &AppState, region: &str, resolution: &str) -> Result<Response> {
    let record = state.source.fetch(region, resolution).await?;

    match state.render {
        RenderMode::Image => {
            let bytes = state.source.download(&record).await?;
            Ok(Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "image/jpeg")
                .body(Body::from(bytes))
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()))
        }
        RenderMode::Json => Ok(Json(WallpaperSummary {
            text: summary_text(&record),
            img: record.image_url,
        })
        .into_response()),
    }
}

/// 缺省参数回退到配置的默认地区 / 默认分辨率
fn resolve_params(
    query: &WallpaperQuery,
    default_region: &str,
    default_resolution: &str,
) -> (String, String) {
    (
        query
            .region
            .clone()
            .unwrap_or_else(|| default_region.to_string()),
        query
            .resolution
            .clone()
            .unwrap_or_else(|| default_resolution.to_string()),
    )
}

/// JSON 摘要的 text 字段：标题 + 截断后的版权行
/// 版权行只保留 " (©" 标记之前的内容，没有标记则整行保留
fn summary_text(record: &WallpaperRecord) -> String {
    let copyright = record
        .copyright
        .split(" (©")
        .next()
        .unwrap_or(&record.copyright);
    format!("{}{}", record.title, copyright)
}
