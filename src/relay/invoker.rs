//! External invokers: run one subprocess or one HTTP GET and normalize the outcome.
//!
//! Every failure mode (spawn error, non-zero exit, timeout, network error,
//! non-2xx status, unreadable body) collapses into one [`InvokeFailure`] carrying a
//! non-empty diagnostic string. Resources are scoped to the call: a child process is
//! spawned with `kill_on_drop`, so a timed-out or cancelled call never leaks it.

use async_trait::async_trait;
use serde::Deserialize;
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::Command;
use url::Url;

use super::model::{
    CommandOutput, CommandRequest, ExternalRequest, HttpGetRequest, Payload, RawRecord, ResultRecord,
};
use crate::config::RelayConfig;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct InvokeFailure {
    message: String,
}

impl InvokeFailure {
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            "external call failed without diagnostic output".to_string()
        } else {
            message
        };
        Self { message }
    }

    #[cfg(test)]
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[async_trait]
pub trait Invoker: Send + Sync {
    async fn invoke(&self, request: ExternalRequest) -> Result<Payload, InvokeFailure>;
}

/* ---- Command mode ---- */

#[derive(Debug, Clone)]
pub struct CommandInvoker {
    timeout: Duration,
}

impl CommandInvoker {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub async fn run(&self, request: &CommandRequest) -> Result<CommandOutput, InvokeFailure> {
        let line = request.display_line();
        tracing::debug!(command = %line, cwd = ?request.working_dir, "spawning");

        let mut cmd = Command::new(&request.program);
        cmd.args(&request.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &request.working_dir {
            cmd.current_dir(dir);
        }

        let started = Instant::now();
        let child = cmd.spawn().map_err(|e| {
            InvokeFailure::new(format!("failed to spawn `{}`: {e}", request.program))
        })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                InvokeFailure::new(format!(
                    "`{line}` timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| InvokeFailure::new(format!("failed waiting for `{line}`: {e}")))?;
        tracing::trace!(command = %line, elapsed_ms = started.elapsed().as_millis() as u64, status = %output.status, "finished");

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            let detail = if stderr.trim().is_empty() {
                stdout.trim()
            } else {
                stderr.trim()
            };
            let mut message = format!("Command failed: {line} ({})", output.status);
            if !detail.is_empty() {
                message.push('\n');
                message.push_str(detail);
            }
            return Err(InvokeFailure::new(message));
        }

        Ok(CommandOutput { stdout, stderr })
    }
}

/* ---- Request mode ---- */

/// SearXNG `format=json` body. A missing `results` field means no results.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

impl SearchResponse {
    /// Hits that are not objects or carry no URL are skipped; the rest keep their order.
    fn into_records(self) -> Vec<ResultRecord> {
        self.results
            .into_iter()
            .filter_map(|hit| serde_json::from_value::<RawRecord>(hit).ok())
            .filter_map(RawRecord::into_record)
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct HttpInvoker {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpInvoker {
    pub fn new(base_url: Url, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, base_url })
    }

    /// Full URL for `request`: base path + endpoint path, then the query pairs.
    pub fn url_for(&self, request: &HttpGetRequest) -> Url {
        let mut url = self.base_url.clone();
        let path = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            request.path.trim_start_matches('/')
        );
        url.set_path(&path);
        {
            let mut pairs = url.query_pairs_mut();
            pairs.clear();
            for (key, value) in &request.query {
                pairs.append_pair(key, value);
            }
        }
        url
    }

    pub async fn get(&self, request: &HttpGetRequest) -> Result<Vec<ResultRecord>, InvokeFailure> {
        let url = self.url_for(request);
        tracing::debug!(%url, "GET");
        let started = Instant::now();

        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| InvokeFailure::new(format!("request to {} failed: {e}", self.base_url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(InvokeFailure::new(format!(
                "SearXNG returned status {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown Status")
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| InvokeFailure::new(format!("malformed response body: {e}")))?;
        let received = body.results.len();
        let records = body.into_records();
        if records.len() < received {
            tracing::debug!(%url, skipped = received - records.len(), "dropped unusable results");
        }
        tracing::trace!(%url, results = records.len(), elapsed_ms = started.elapsed().as_millis() as u64, "response");
        Ok(records)
    }
}

/* ---- Composite ---- */

/// Routes each request to the invoker for its mode.
#[derive(Debug, Clone)]
pub struct ExternalInvoker {
    command: CommandInvoker,
    http: HttpInvoker,
}

impl ExternalInvoker {
    pub fn from_config(config: &RelayConfig) -> anyhow::Result<Self> {
        Ok(Self {
            command: CommandInvoker::new(config.timeout),
            http: HttpInvoker::new(config.searxng_url.clone(), config.timeout)?,
        })
    }
}

#[async_trait]
impl Invoker for ExternalInvoker {
    async fn invoke(&self, request: ExternalRequest) -> Result<Payload, InvokeFailure> {
        match request {
            ExternalRequest::Command(cmd) => self.command.run(&cmd).await.map(Payload::Output),
            ExternalRequest::HttpGet(get) => self.http.get(&get).await.map(Payload::Records),
        }
    }
}
