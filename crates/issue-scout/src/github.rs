//! Issue ingestor: one page of issues from the GitHub REST API.
//!
//! `GET {api_base}/repos/{owner}/{repo}/issues?per_page=N` with the
//! versioned JSON media type. A single best-effort attempt: any non-200
//! status or transport fault is logged and yields an empty list. Only the
//! first page is fetched.

use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use issue_scout_core::models::Issue;

use crate::config::GithubConfig;

const ACCEPT: &str = "application/vnd.github.v3+json";

pub struct GithubClient {
    http: reqwest::Client,
    api_base: String,
    per_page: u32,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    number: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    user: Option<RawUser>,
    #[serde(default)]
    comments: u64,
    #[serde(default)]
    labels: Vec<RawLabel>,
    created_at: DateTime<Utc>,
    #[serde(default = "default_state")]
    state: String,
    #[serde(default)]
    html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    login: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawLabel {
    Named { name: String },
    Plain(String),
}

fn default_state() -> String {
    "open".to_string()
}

impl RawLabel {
    fn into_name(self) -> String {
        match self {
            RawLabel::Named { name } | RawLabel::Plain(name) => name,
        }
    }
}

impl From<RawIssue> for Issue {
    fn from(raw: RawIssue) -> Self {
        let mut labels: Vec<String> = Vec::with_capacity(raw.labels.len());
        for name in raw.labels.into_iter().map(RawLabel::into_name) {
            if !labels.contains(&name) {
                labels.push(name);
            }
        }
        Issue {
            number: raw.number,
            title: raw.title,
            body: raw.body,
            author: raw.user.map(|u| u.login).unwrap_or_default(),
            comments: raw.comments,
            labels,
            created_at: raw.created_at,
            state: raw.state,
            url: raw.html_url,
        }
    }
}

impl GithubClient {
    pub fn new(config: &GithubConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            per_page: config.per_page,
        })
    }

    /// Fetch the first page of issues for `owner/repo`.
    ///
    /// Never fails: problems are logged and an empty list is returned.
    pub async fn fetch_issues(&self, owner: &str, repo: &str, token: Option<&str>) -> Vec<Issue> {
        if owner.trim().is_empty() || repo.trim().is_empty() {
            warn!("owner and repo must not be empty; nothing fetched");
            return Vec::new();
        }

        let url = format!("{}/repos/{}/{}/issues", self.api_base, owner, repo);
        let mut request = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, ACCEPT)
            .query(&[("per_page", self.per_page)]);
        match token {
            Some(token) => {
                request = request.header(reqwest::header::AUTHORIZATION, format!("token {}", token))
            }
            None => warn!("no GitHub token set; unauthenticated requests are rate limited"),
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %url, error = %e, "failed to fetch issues");
                return Vec::new();
            }
        };

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "failed to fetch issues");
            return Vec::new();
        }

        let items: Vec<serde_json::Value> = match response.json().await {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "issue list response is not a JSON array");
                return Vec::new();
            }
        };

        let issues: Vec<Issue> = items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<RawIssue>(item) {
                Ok(raw) => Some(Issue::from(raw)),
                Err(e) => {
                    warn!(error = %e, "skipping malformed issue");
                    None
                }
            })
            .collect();

        info!(owner, repo, count = issues.len(), "fetched issues");
        issues
    }
}
