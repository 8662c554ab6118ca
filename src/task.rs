//! Asynchronous scrape tasks: creation payloads, statuses and polling.

use crate::error::{Error, Result};
use crate::payload::FormPayload;
use log::{debug, info};
use serde_json::{Map, Value};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;
use tokio::time::{self, Instant};

/// Status reported for a scrape task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Pending,
    Running,
    Ready,
    Success,
    Finished,
    Failed,
    Error,
    Cancelled,
    Unknown,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Ready => "ready",
            TaskStatus::Success => "success",
            TaskStatus::Finished => "finished",
            TaskStatus::Failed => "failed",
            TaskStatus::Error => "error",
            TaskStatus::Cancelled => "cancelled",
            TaskStatus::Unknown => "unknown",
        }
    }

    /// Parse a provider status; anything unrecognised is `Unknown`.
    pub fn parse(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "pending" => TaskStatus::Pending,
            "running" => TaskStatus::Running,
            "ready" => TaskStatus::Ready,
            "success" => TaskStatus::Success,
            "finished" => TaskStatus::Finished,
            "failed" => TaskStatus::Failed,
            "error" => TaskStatus::Error,
            "cancelled" | "canceled" => TaskStatus::Cancelled,
            _ => TaskStatus::Unknown,
        }
    }

    /// Finished with results available.
    pub fn is_success(self) -> bool {
        matches!(self, TaskStatus::Ready | TaskStatus::Success | TaskStatus::Finished)
    }

    /// Finished without results.
    pub fn is_failure(self) -> bool {
        matches!(self, TaskStatus::Failed | TaskStatus::Error | TaskStatus::Cancelled)
    }

    /// No further status change is expected.
    pub fn is_terminal(self) -> bool {
        self.is_success() || self.is_failure()
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File format of a task's downloadable results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultFormat {
    #[default]
    Json,
    Csv,
    Xlsx,
}

impl ResultFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ResultFormat::Json => "json",
            ResultFormat::Csv => "csv",
            ResultFormat::Xlsx => "xlsx",
        }
    }
}

impl FromStr for ResultFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ResultFormat::Json),
            "csv" => Ok(ResultFormat::Csv),
            "xlsx" => Ok(ResultFormat::Xlsx),
            other => Err(Error::config(format!("unsupported result format {other:?}"))),
        }
    }
}

/// A scrape task to create on the Web Scraper builder.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSpec {
    /// Name of the result file.
    pub file_name: String,
    pub spider_id: String,
    pub spider_name: String,
    /// Parameters of the single task.
    pub parameters: Map<String, Value>,
    /// Universal scraping options applied by the spider.
    pub universal_parameters: Option<Map<String, Value>>,
    /// Keep error records in the output.
    pub include_errors: bool,
}

impl TaskSpec {
    pub fn new(
        file_name: impl Into<String>,
        spider_id: impl Into<String>,
        spider_name: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            spider_id: spider_id.into(),
            spider_name: spider_name.into(),
            parameters: Map::new(),
            universal_parameters: None,
            include_errors: true,
        }
    }

    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn universal_parameters(mut self, params: Map<String, Value>) -> Self {
        self.universal_parameters = Some(params);
        self
    }

    pub fn include_errors(mut self, include: bool) -> Self {
        self.include_errors = include;
        self
    }

    /// Encode into the builder form payload.
    ///
    /// `spider_parameters` is always a one-element array: the builder's bulk
    /// field expects a list even for one task.
    pub fn to_payload(&self) -> Result<FormPayload> {
        if self.spider_id.is_empty() {
            return Err(Error::config("spider_id is required to create a task"));
        }

        let parameters = Value::Array(vec![Value::Object(self.parameters.clone())]);

        let mut payload = FormPayload::new();
        payload.set("file_name", self.file_name.as_str());
        payload.set("spider_id", self.spider_id.as_str());
        payload.set("spider_name", self.spider_name.as_str());
        payload.set("spider_parameters", parameters.to_string());
        payload.set("spider_errors", if self.include_errors { "true" } else { "false" });
        if let Some(universal) = &self.universal_parameters {
            payload.set("spider_universal", Value::Object(universal.clone()).to_string());
        }
        Ok(payload)
    }
}

/// Polling budget of [`wait_for_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Sleep between status calls.
    pub poll_interval: Duration,
    /// Give up after this long.
    pub max_wait: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            max_wait: Duration::from_secs(600),
        }
    }
}

/// Polling schedule of a full task run; the interval grows between polls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOptions {
    pub initial_poll_interval: Duration,
    pub max_poll_interval: Duration,
    /// Multiplier applied to the interval after every poll.
    pub backoff: f64,
    pub max_wait: Duration,
    pub result_format: ResultFormat,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            initial_poll_interval: Duration::from_secs(2),
            max_poll_interval: Duration::from_secs(10),
            backoff: 1.5,
            max_wait: Duration::from_secs(600),
            result_format: ResultFormat::Json,
        }
    }
}

/// Schedule of sleeps between status polls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollSchedule {
    pub initial: Duration,
    pub max: Duration,
    pub growth: f64,
}

impl PollSchedule {
    /// Poll at a fixed interval.
    pub fn fixed(interval: Duration) -> Self {
        Self {
            initial: interval,
            max: interval,
            growth: 1.0,
        }
    }

    fn next(&self, current: Duration) -> Duration {
        let cap = self.max.max(self.initial);
        Duration::try_from_secs_f64(current.as_secs_f64() * self.growth.max(1.0))
            .map_or(cap, |next| next.min(cap))
    }
}

impl From<&RunOptions> for PollSchedule {
    fn from(options: &RunOptions) -> Self {
        Self {
            initial: options.initial_poll_interval,
            max: options.max_poll_interval,
            growth: options.backoff,
        }
    }
}

/// Poll `status` until it reports a terminal status.
///
/// Returns the terminal status as soon as it is seen. Fails with a task
/// timeout once `max_wait` has elapsed without one.
pub async fn wait_for_status<F, Fut>(
    task_id: &str,
    mut status: F,
    schedule: PollSchedule,
    max_wait: Duration,
) -> Result<TaskStatus>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<TaskStatus>>,
{
    let start = Instant::now();
    let mut interval = schedule.initial;
    let mut last = None;

    loop {
        let current = status().await?;
        if last != Some(current) {
            debug!("Task {} status: {}", task_id, current);
            last = Some(current);
        }
        if current.is_terminal() {
            info!("Task {} finished with status {} after {:?}", task_id, current, start.elapsed());
            return Ok(current);
        }

        let elapsed = start.elapsed();
        if elapsed >= max_wait {
            return Err(Error::task_timeout(format!(
                "task {task_id} did not complete within {} ms (last status {current})",
                max_wait.as_millis()
            )));
        }

        time::sleep(interval.min(max_wait - elapsed)).await;
        interval = schedule.next(interval);
    }
}

/// Status of `task_id` within a status response's `data` array.
pub fn find_status(data: &Value, task_id: &str) -> TaskStatus {
    data.get("data")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .find(|item| item.get("task_id").map(id_string).as_deref() == Some(task_id))
        .and_then(|item| item.get("status"))
        .and_then(Value::as_str)
        .map(TaskStatus::parse)
        .unwrap_or(TaskStatus::Unknown)
}

/// Render a task id that may arrive as a string or a number.
pub fn id_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
