use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tau_github_approve::approve_comment::{GithubIssueComment, GithubReview, GithubReviewComment};
use tau_github_approve::approve_event_gate::GithubPullRequestPayload;
use tau_github_approve::github_client::{
    ApproveGithubClient, GithubIssueEvent, GithubLabel, GithubPullRequestFile,
};
use tokio::sync::OnceCell;

use super::github_transport_helpers::{
    is_retryable_github_status, is_retryable_transport_error, parse_retry_after, retry_delay,
    truncate_for_error,
};

const PAGE_SIZE: usize = 100;
const ERROR_BODY_MAX_CHARS: usize = 800;

pub(super) struct GithubApiClient {
    http: reqwest::Client,
    api_base: String,
    bot_login: OnceCell<String>,
    retry_max_attempts: usize,
    retry_base_delay_ms: u64,
}

impl GithubApiClient {
    pub(super) fn new(
        api_base: String,
        token: String,
        bot_login: Option<String>,
        request_timeout_ms: u64,
        retry_max_attempts: usize,
        retry_base_delay_ms: u64,
    ) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("tau-github-approve"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            reqwest::header::HeaderValue::from_static("2022-11-28"),
        );
        let auth_header = format!("Bearer {}", token.trim());
        headers.insert(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_str(&auth_header)
                .context("invalid github authorization header")?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(request_timeout_ms.max(1)))
            .build()
            .context("failed to create github api client")?;
        let bot_login = bot_login
            .map(|login| login.trim().to_string())
            .filter(|login| !login.is_empty());
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            bot_login: OnceCell::new_with(bot_login),
            retry_max_attempts: retry_max_attempts.max(1),
            retry_base_delay_ms: retry_base_delay_ms.max(1),
        })
    }

    fn repo_url(&self, org: &str, repo: &str, suffix: &str) -> String {
        format!("{}/repos/{org}/{repo}/{suffix}", self.api_base)
    }

    pub(super) async fn get_pull_request(
        &self,
        org: &str,
        repo: &str,
        number: u64,
    ) -> Result<GithubPullRequestPayload> {
        let url = self.repo_url(org, repo, &format!("pulls/{number}"));
        self.request_json("get pull request", || self.http.get(&url))
            .await
    }

    async fn list_paginated<T>(&self, operation: &str, url: &str) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let mut page = 1_u32;
        let mut rows = Vec::new();
        loop {
            let page_value = page.to_string();
            let per_page = PAGE_SIZE.to_string();
            let chunk: Vec<T> = self
                .request_json(operation, || {
                    self.http.get(url).query(&[
                        ("per_page", per_page.as_str()),
                        ("page", page_value.as_str()),
                    ])
                })
                .await?;
            let chunk_len = chunk.len();
            rows.extend(chunk);
            if chunk_len < PAGE_SIZE {
                break;
            }
            page = page.saturating_add(1);
        }
        Ok(rows)
    }

    async fn request_json<T, F>(&self, operation: &str, request_builder: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: FnMut() -> reqwest::RequestBuilder,
    {
        let response = self.send_with_retry(operation, request_builder).await?;
        response
            .json::<T>()
            .await
            .with_context(|| format!("failed to decode github {operation}"))
    }

    async fn request_empty<F>(&self, operation: &str, request_builder: F) -> Result<()>
    where
        F: FnMut() -> reqwest::RequestBuilder,
    {
        self.send_with_retry(operation, request_builder).await?;
        Ok(())
    }

    async fn send_with_retry<F>(
        &self,
        operation: &str,
        mut request_builder: F,
    ) -> Result<reqwest::Response>
    where
        F: FnMut() -> reqwest::RequestBuilder,
    {
        let mut attempt = 0_usize;
        loop {
            attempt = attempt.saturating_add(1);
            let response = request_builder()
                .header("x-tau-retry-attempt", attempt.saturating_sub(1).to_string())
                .send()
                .await;
            match response {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    let retry_after = parse_retry_after(response.headers());
                    let body = response.text().await.unwrap_or_default();
                    if attempt < self.retry_max_attempts
                        && is_retryable_github_status(status.as_u16())
                    {
                        tracing::debug!(
                            operation,
                            attempt,
                            status = status.as_u16(),
                            "retrying github api request"
                        );
                        tokio::time::sleep(retry_delay(
                            self.retry_base_delay_ms,
                            attempt,
                            retry_after,
                        ))
                        .await;
                        continue;
                    }

                    bail!(
                        "github api {operation} failed with status {}: {}",
                        status.as_u16(),
                        truncate_for_error(&body, ERROR_BODY_MAX_CHARS)
                    );
                }
                Err(error) => {
                    if attempt < self.retry_max_attempts && is_retryable_transport_error(&error) {
                        tokio::time::sleep(retry_delay(self.retry_base_delay_ms, attempt, None))
                            .await;
                        continue;
                    }
                    return Err(error)
                        .with_context(|| format!("github api {operation} request failed"));
                }
            }
        }
    }
}

#[async_trait]
impl ApproveGithubClient for GithubApiClient {
    async fn bot_login(&self) -> Result<String> {
        #[derive(Deserialize)]
        struct Viewer {
            login: String,
        }

        let login = self
            .bot_login
            .get_or_try_init(|| async {
                let url = format!("{}/user", self.api_base);
                let viewer: Viewer = self
                    .request_json("resolve bot login", || self.http.get(&url))
                    .await?;
                Ok::<_, anyhow::Error>(viewer.login)
            })
            .await?;
        Ok(login.clone())
    }

    async fn list_changed_files(&self, org: &str, repo: &str, number: u64) -> Result<Vec<String>> {
        let url = self.repo_url(org, repo, &format!("pulls/{number}/files"));
        let files: Vec<GithubPullRequestFile> =
            self.list_paginated("list pull request files", &url).await?;
        Ok(files.into_iter().map(|file| file.filename).collect())
    }

    async fn list_labels(&self, org: &str, repo: &str, number: u64) -> Result<Vec<GithubLabel>> {
        let url = self.repo_url(org, repo, &format!("issues/{number}/labels"));
        self.list_paginated("list issue labels", &url).await
    }

    async fn list_issue_comments(
        &self,
        org: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<GithubIssueComment>> {
        let url = self.repo_url(org, repo, &format!("issues/{number}/comments"));
        self.list_paginated("list issue comments", &url).await
    }

    async fn list_review_comments(
        &self,
        org: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<GithubReviewComment>> {
        let url = self.repo_url(org, repo, &format!("pulls/{number}/comments"));
        self.list_paginated("list review comments", &url).await
    }

    async fn list_reviews(&self, org: &str, repo: &str, number: u64) -> Result<Vec<GithubReview>> {
        let url = self.repo_url(org, repo, &format!("pulls/{number}/reviews"));
        self.list_paginated("list reviews", &url).await
    }

    async fn list_issue_events(
        &self,
        org: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<GithubIssueEvent>> {
        let url = self.repo_url(org, repo, &format!("issues/{number}/events"));
        self.list_paginated("list issue events", &url).await
    }

    async fn add_label(&self, org: &str, repo: &str, number: u64, label: &str) -> Result<()> {
        let url = self.repo_url(org, repo, &format!("issues/{number}/labels"));
        let payload = json!({ "labels": [label] });
        self.request_empty("add issue label", || self.http.post(&url).json(&payload))
            .await
    }

    async fn remove_label(&self, org: &str, repo: &str, number: u64, label: &str) -> Result<()> {
        let mut url = reqwest::Url::parse(&self.repo_url(org, repo, &format!("issues/{number}/labels")))
            .context("invalid github label url")?;
        url.path_segments_mut()
            .map_err(|()| anyhow!("github api base '{}' cannot carry a path", self.api_base))?
            .push(label);
        self.request_empty("remove issue label", || self.http.delete(url.clone()))
            .await
    }

    async fn create_comment(&self, org: &str, repo: &str, number: u64, body: &str) -> Result<()> {
        let url = self.repo_url(org, repo, &format!("issues/{number}/comments"));
        let payload = json!({ "body": body });
        self.request_empty("create issue comment", || self.http.post(&url).json(&payload))
            .await
    }

    async fn delete_comment(&self, org: &str, repo: &str, comment_id: u64) -> Result<()> {
        let url = self.repo_url(org, repo, &format!("issues/comments/{comment_id}"));
        self.request_empty("delete issue comment", || self.http.delete(&url))
            .await
    }
}
