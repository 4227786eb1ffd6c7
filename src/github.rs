// github.rs — GitHub Actions workflow_dispatch 触发模块
// 推送成功后补一脚远端工作流，入参是固定的，不携带壁纸数据

use crate::config::GithubSettings;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Serialize;

/// 自动化触发端的抽象 Trait
#[async_trait]
pub trait Dispatcher {
    /// 触发一次远端工作流（fire-and-forget，结果只记日志）
    async fn trigger(&self) -> Result<()>;
}

#[derive(Serialize)]
struct DispatchBody<'a> {
    #[serde(rename = "ref")]
    git_ref: &'a str,
    inputs: DispatchInputs<'a>,
}

#[derive(Serialize)]
struct DispatchInputs<'a> {
    info: &'a str,
}

/// workflow_dispatch 异步客户端
pub struct WorkflowDispatcher {
    client: reqwest::Client,
    api_base: String,
    owner: String,
    repo: String,
    workflow_id: String,
    token: String,
    git_ref: String,
    info: String,
}

impl WorkflowDispatcher {
    pub fn new(client: reqwest::Client, settings: &GithubSettings) -> Self {
        Self {
            client,
            api_base: String::from("https://api.github.com"),
            owner: settings.owner.clone(),
            repo: settings.repo.clone(),
            workflow_id: settings.workflow_id.clone(),
            token: settings.token.clone(),
            git_ref: settings.git_ref.clone(),
            info: settings.info.clone(),
        }
    }
}

#[async_trait]
impl Dispatcher for WorkflowDispatcher {
    async fn trigger(&self) -> Result<()> {
        let url = format!(
            "{}/repos/{}/{}/actions/workflows/{}/dispatches",
            self.api_base, self.owner, self.repo, self.workflow_id
        );

        let body = DispatchBody {
            git_ref: &self.git_ref,
            inputs: DispatchInputs { info: &self.info },
        };

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, "application/vnd.github+json")
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header("X-GitHub-Api-Version", "2022-11-28")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream(format!("HTTP {status}")));
        }

        Ok(())
    }
}
