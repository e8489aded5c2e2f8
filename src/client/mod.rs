//! HTTP client for the task API.
//!
//! The board view (`client::board`) drives the four API operations through
//! this thin reqwest wrapper. Non-2xx responses surface the server's
//! `{"error": message}` body as the failure message.

pub mod board;

use anyhow::{bail, Context as _, Result};
use serde_json::{json, Value};
use std::time::Duration;

use crate::storage::TaskRow;
use board::TaskDraft;

const DEFAULT_API_URL: &str = "http://localhost:8080";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client targeting the given API base URL (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self { http, base_url })
    }

    /// Create a client from the `TASKD_API_URL` environment variable,
    /// falling back to the default local server address.
    pub fn from_env() -> Result<Self> {
        let url = std::env::var("TASKD_API_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self::new(url)
    }

    pub async fn list_tasks(&self) -> Result<Vec<TaskRow>> {
        let resp = self
            .http
            .get(format!("{}/tasks", self.base_url))
            .send()
            .await
            .context("failed to reach task API")?;
        Ok(Self::expect_ok(resp).await?.json().await?)
    }

    pub async fn create_task(&self, draft: &TaskDraft) -> Result<TaskRow> {
        let resp = self
            .http
            .post(format!("{}/tasks", self.base_url))
            .json(draft)
            .send()
            .await
            .context("failed to reach task API")?;
        Ok(Self::expect_ok(resp).await?.json().await?)
    }

    /// Full-form update: every draft field is sent, matching the board's
    /// edit-mode submit.
    pub async fn update_task(&self, id: &str, draft: &TaskDraft) -> Result<TaskRow> {
        let resp = self
            .http
            .put(format!("{}/tasks/{id}", self.base_url))
            .json(draft)
            .send()
            .await
            .context("failed to reach task API")?;
        Ok(Self::expect_ok(resp).await?.json().await?)
    }

    /// Partial update carrying only the `completed` flag.
    pub async fn set_completed(&self, id: &str, completed: bool) -> Result<TaskRow> {
        let resp = self
            .http
            .put(format!("{}/tasks/{id}", self.base_url))
            .json(&json!({ "completed": completed }))
            .send()
            .await
            .context("failed to reach task API")?;
        Ok(Self::expect_ok(resp).await?.json().await?)
    }

    pub async fn delete_task(&self, id: &str) -> Result<()> {
        let resp = self
            .http
            .delete(format!("{}/tasks/{id}", self.base_url))
            .send()
            .await
            .context("failed to reach task API")?;
        Self::expect_ok(resp).await?;
        Ok(())
    }

    async fn expect_ok(resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp
            .json::<Value>()
            .await
            .ok()
            .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| "no error body".to_string());
        bail!("task API error ({status}): {message}");
    }
}
