//! Submit-then-poll orchestration for long-running provider tasks.
//!
//! State machine: `Submitting -> Polling -> {Completed, TimedOut, SubmissionFailed}`.
//!
//! The poll loop sleeps between attempts and stops on the first status other
//! than `processing`, or when the wait budget is spent. A hard deadline of
//! `max_wait + interval + request timeout` is raced against the whole loop
//! so a stalled poll cannot hold the caller past its budget. Submission failure and
//! timeout are returned as [`TaskOutcome`] values, not errors: the caller can
//! resume polling by task id. Transport and HTTP errors still propagate.

use std::fmt;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::ClientResult;
use crate::executor::{ApiRequest, OperationResult, RequestExecutor};

/// Status value meaning the task is still running.
pub const PENDING_STATUS: &str = "processing";

/// Hard bounds applied to caller-supplied poll settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollLimits {
    pub min_interval: Duration,
    pub max_interval: Duration,
    pub min_wait: Duration,
    pub max_wait: Duration,
}

impl Default for PollLimits {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(30),
            min_wait: Duration::from_secs(10),
            max_wait: Duration::from_secs(600),
        }
    }
}

/// Validated poll interval and wait budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    interval: Duration,
    max_wait: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_wait: Duration::from_secs(300),
        }
    }
}

impl PollOptions {
    /// Clamp both values into `limits`. Out-of-range input is logged, never trusted.
    pub fn clamped(interval: Duration, max_wait: Duration, limits: &PollLimits) -> Self {
        let clamped_interval = interval.clamp(limits.min_interval, limits.max_interval);
        let clamped_wait = max_wait.clamp(limits.min_wait, limits.max_wait);
        if clamped_interval != interval || clamped_wait != max_wait {
            warn!(
                requested_interval_ms = interval.as_millis() as u64,
                requested_max_wait_ms = max_wait.as_millis() as u64,
                interval_ms = clamped_interval.as_millis() as u64,
                max_wait_ms = clamped_wait.as_millis() as u64,
                "Poll options clamped to bounds"
            );
        }
        Self {
            interval: clamped_interval,
            max_wait: clamped_wait,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }
}

/// Observational progress notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub progress: u8,
    pub total: u8,
    pub message: String,
}

impl ProgressEvent {
    pub fn new(progress: u8, message: impl Into<String>) -> Self {
        Self {
            progress: progress.min(100),
            total: 100,
            message: message.into(),
        }
    }
}

/// Receiver of progress events.
///
/// Called inline from the poll loop: implementations must not block and must
/// not panic. Release builds abort on panic, so a panicking sink takes the
/// process down with it.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn emit(&self, _event: ProgressEvent) {}
}

/// Forwards events into an unbounded channel; a closed channel is ignored.
#[derive(Debug, Clone)]
pub struct ChannelProgress {
    tx: UnboundedSender<ProgressEvent>,
}

impl ChannelProgress {
    pub fn new(tx: UnboundedSender<ProgressEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgress {
    fn emit(&self, event: ProgressEvent) {
        let _ = self.tx.send(event);
    }
}

/// Keeps emitted progress monotonically non-decreasing.
struct ProgressReporter<'a> {
    sink: &'a dyn ProgressSink,
    last: u8,
}

impl<'a> ProgressReporter<'a> {
    fn new(sink: &'a dyn ProgressSink) -> Self {
        Self { sink, last: 0 }
    }

    fn report(&mut self, progress: u8, message: impl Into<String>) {
        self.last = self.last.max(progress.min(100));
        self.sink.emit(ProgressEvent::new(self.last, message));
    }
}

/// Orchestrator phases, used in logs and outcome rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskPhase {
    Submitting,
    Polling,
    Completed,
    TimedOut,
    SubmissionFailed,
}

impl fmt::Display for TaskPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submitting => write!(f, "submitting"),
            Self::Polling => write!(f, "polling"),
            Self::Completed => write!(f, "completed"),
            Self::TimedOut => write!(f, "timeout"),
            Self::SubmissionFailed => write!(f, "submission_failed"),
        }
    }
}

/// Terminal result of an orchestrated task.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    Completed {
        task_id: String,
        attempts: u32,
        elapsed: Duration,
        payload: OperationResult,
    },
    TimedOut {
        task_id: String,
        attempts: u32,
        elapsed: Duration,
        last_status: Option<String>,
    },
    SubmissionFailed {
        reason: String,
        response: OperationResult,
    },
}

impl TaskOutcome {
    pub fn phase(&self) -> TaskPhase {
        match self {
            Self::Completed { .. } => TaskPhase::Completed,
            Self::TimedOut { .. } => TaskPhase::TimedOut,
            Self::SubmissionFailed { .. } => TaskPhase::SubmissionFailed,
        }
    }

    pub fn task_id(&self) -> Option<&str> {
        match self {
            Self::Completed { task_id, .. } | Self::TimedOut { task_id, .. } => Some(task_id),
            Self::SubmissionFailed { .. } => None,
        }
    }

    /// Render as the single text payload returned to callers.
    pub fn into_result(self) -> OperationResult {
        let phase = self.phase().to_string();
        let value = match self {
            Self::Completed {
                task_id,
                attempts,
                elapsed,
                payload,
            } => json!({
                "status": phase,
                "task_id": task_id,
                "attempts": attempts,
                "elapsed_ms": elapsed.as_millis() as u64,
                "result": payload.json().unwrap_or(Value::String(payload.text)),
            }),
            Self::TimedOut {
                task_id,
                attempts,
                elapsed,
                last_status,
            } => json!({
                "status": phase,
                "task_id": task_id,
                "attempts": attempts,
                "elapsed_ms": elapsed.as_millis() as u64,
                "last_status": last_status,
                "message": format!(
                    "Task {} did not finish within {}s. Fetch its results later using the task id.",
                    task_id,
                    elapsed.as_secs()
                ),
            }),
            Self::SubmissionFailed { reason, response } => json!({
                "status": phase,
                "message": reason,
                "response": response.json().unwrap_or(Value::String(response.text)),
            }),
        };
        OperationResult::from_json(&value)
    }
}

#[derive(Debug, Default)]
struct PollState {
    attempts: u32,
    last_status: Option<String>,
}

/// Runs submit-and-wait tasks on top of a [`RequestExecutor`].
#[derive(Debug, Clone)]
pub struct TaskOrchestrator {
    executor: RequestExecutor,
}

impl TaskOrchestrator {
    pub fn new(executor: RequestExecutor) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    /// Submit `submit`, then poll `poll(task_id)` until the task leaves
    /// `processing` or `options.max_wait()` elapses.
    pub async fn run<P>(
        &self,
        submit: ApiRequest,
        poll: P,
        options: PollOptions,
        progress: &dyn ProgressSink,
    ) -> ClientResult<TaskOutcome>
    where
        P: Fn(&str) -> ApiRequest + Send + Sync,
    {
        let mut reporter = ProgressReporter::new(progress);
        let started = Instant::now();

        debug!(phase = %TaskPhase::Submitting, path = %submit.path, "Submitting task");
        reporter.report(0, "Creating task");
        let submitted = self.executor.execute_request(submit).await?;

        let Some(task_id) = submitted.json().as_ref().and_then(extract_task_id) else {
            warn!(phase = %TaskPhase::SubmissionFailed, "Submission response has no task id");
            return Ok(TaskOutcome::SubmissionFailed {
                reason: "Task submission returned no task id".to_string(),
                response: submitted,
            });
        };

        info!(phase = %TaskPhase::Polling, task_id = %task_id, "Task created");
        reporter.report(10, format!("Task {} created, waiting for results", task_id));

        let mut state = PollState::default();
        // The last poll may start just before the budget ends, after one more interval.
        let hard_deadline = started
            + options.max_wait()
            + options.interval()
            + self.executor.config().timeout();
        let polled = tokio::time::timeout_at(
            hard_deadline,
            self.poll_until_done(&task_id, &poll, options, started, &mut reporter, &mut state),
        )
        .await;

        let elapsed = started.elapsed();
        match polled {
            Ok(Ok(Some(payload))) => {
                info!(
                    phase = %TaskPhase::Completed,
                    task_id = %task_id,
                    attempts = state.attempts,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Task completed"
                );
                reporter.report(100, "Done");
                Ok(TaskOutcome::Completed {
                    task_id,
                    attempts: state.attempts,
                    elapsed,
                    payload,
                })
            }
            Ok(Err(e)) => Err(e),
            Ok(Ok(None)) | Err(_) => {
                warn!(
                    phase = %TaskPhase::TimedOut,
                    task_id = %task_id,
                    attempts = state.attempts,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Task still processing when wait budget ran out"
                );
                reporter.report(100, "Timed out waiting for task");
                Ok(TaskOutcome::TimedOut {
                    task_id,
                    attempts: state.attempts,
                    elapsed,
                    last_status: state.last_status,
                })
            }
        }
    }

    /// Returns `Some(payload)` on completion, `None` when the budget is spent.
    async fn poll_until_done<P>(
        &self,
        task_id: &str,
        poll: &P,
        options: PollOptions,
        started: Instant,
        reporter: &mut ProgressReporter<'_>,
        state: &mut PollState,
    ) -> ClientResult<Option<OperationResult>>
    where
        P: Fn(&str) -> ApiRequest + Send + Sync,
    {
        let budget_ms = options.max_wait().as_millis().max(1);

        while started.elapsed() < options.max_wait() {
            tokio::time::sleep(options.interval()).await;
            state.attempts += 1;

            let result = self.executor.execute_request(poll(task_id)).await?;
            let status = result.json().as_ref().and_then(task_status);
            debug!(task_id = %task_id, attempt = state.attempts, status = ?status, "Polled task");

            let elapsed_ms = started.elapsed().as_millis();
            let scaled = 10 + (80 * elapsed_ms / budget_ms).min(80) as u8;
            reporter.report(
                scaled,
                format!(
                    "Attempt {}: task {} is {}",
                    state.attempts,
                    task_id,
                    status.as_deref().unwrap_or("ready")
                ),
            );

            let pending = status
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case(PENDING_STATUS));
            state.last_status = status;
            if !pending {
                return Ok(Some(result));
            }
        }

        Ok(None)
    }
}

/// Task id from the first element of the submission's task list.
///
/// Accepts a bare array or an object with a `tasks` array; the id may be
/// under `id` or `task_id`, as a string or a number.
pub fn extract_task_id(response: &Value) -> Option<String> {
    let first = match response {
        Value::Array(items) => items.first(),
        Value::Object(map) => map.get("tasks").and_then(Value::as_array)?.first(),
        _ => None,
    }?;

    ["id", "task_id"]
        .iter()
        .find_map(|key| match first.get(*key) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
}

/// Status field of a poll response (object, or first element of an array).
pub fn task_status(response: &Value) -> Option<String> {
    let target = match response {
        Value::Array(items) => items.first()?,
        other => other,
    };
    target
        .get("status")
        .and_then(Value::as_str)
        .map(str::to_string)
}
