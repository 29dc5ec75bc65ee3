//! Release dispatcher: runs every task once per event, isolated from each other

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use herald_core::config::DispatchConfig;
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, instrument};

use crate::reporter::{TaskEvent, TaskReporter};
use crate::task::{ReleaseTask, TaskContext, TaskKind, TaskResult};

/// Options for the dispatcher
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// Maximum concurrent tasks
    pub concurrency: usize,
    /// Per-task time limit
    pub timeout: Duration,
    /// Restrict the run to these kinds; empty runs all
    pub only: Vec<TaskKind>,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self::from_config(&DispatchConfig::default())
    }
}

impl DispatchOptions {
    pub fn from_config(config: &DispatchConfig) -> Self {
        Self {
            concurrency: config.concurrency.max(1),
            timeout: Duration::from_secs(config.timeout_secs),
            only: Vec::new(),
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_only(mut self, only: Vec<TaskKind>) -> Self {
        self.only = only;
        self
    }

    fn selects(&self, kind: TaskKind) -> bool {
        self.only.is_empty() || self.only.contains(&kind)
    }
}

/// Outcome of one dispatch
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    /// Tag that was dispatched
    pub tag: String,
    /// Whether the tag matched the trigger pattern
    pub triggered: bool,
    /// One result per task, in canonical order
    pub results: Vec<TaskResult>,
}

impl DispatchReport {
    /// Report for a tag that does not start the pipeline
    pub fn not_triggered(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            triggered: false,
            results: Vec::new(),
        }
    }

    /// Whether every attempted task succeeded
    pub fn all_succeeded(&self) -> bool {
        self.results.iter().all(|r| !r.status.is_failed())
    }

    /// Tasks that failed
    pub fn failed(&self) -> Vec<&TaskResult> {
        self.results.iter().filter(|r| r.status.is_failed()).collect()
    }

    /// Result for one kind
    pub fn get(&self, kind: TaskKind) -> Option<&TaskResult> {
        self.results.iter().find(|r| r.kind == kind)
    }
}

/// Runs the registered tasks for a release event
pub struct Dispatcher {
    tasks: Vec<Arc<dyn ReleaseTask>>,
    options: DispatchOptions,
    reporter: Arc<dyn TaskReporter>,
}

impl Dispatcher {
    /// Create a dispatcher with no tasks
    pub fn new(options: DispatchOptions, reporter: Arc<dyn TaskReporter>) -> Self {
        Self {
            tasks: Vec::new(),
            options,
            reporter,
        }
    }

    /// Register a task. A later task of the same kind replaces an earlier one.
    pub fn with_task(mut self, task: Arc<dyn ReleaseTask>) -> Self {
        self.tasks.retain(|t| t.kind() != task.kind());
        self.tasks.push(task);
        self
    }

    /// Run every registered task once.
    ///
    /// A tag outside the trigger pattern starts nothing. Otherwise tasks
    /// run concurrently up to the configured limit. A failing, panicking
    /// or timed-out task is recorded as failed and never affects the others.
    #[instrument(skip(self, ctx), fields(tag = %ctx.event.tag()))]
    pub async fn dispatch(&self, ctx: TaskContext) -> DispatchReport {
        let start = Instant::now();
        let tag = ctx.event.tag().to_string();

        if !ctx.event.is_triggered_by(&ctx.pattern) {
            debug!(pattern = %ctx.pattern, "tag does not match, pipeline not triggered");
            return DispatchReport::not_triggered(tag);
        }

        let ctx = Arc::new(ctx);
        let semaphore = Arc::new(Semaphore::new(self.options.concurrency));
        let mut results: BTreeMap<TaskKind, TaskResult> = BTreeMap::new();

        let mut tasks = self.tasks.clone();
        tasks.sort_by_key(|t| t.kind());

        self.reporter.report(&TaskEvent::DispatchStarted {
            tag: tag.clone(),
            task_count: tasks.len(),
        });

        let mut handles = Vec::new();

        for task in tasks {
            let kind = task.kind();

            let skip_reason = if !kind.is_enabled(&ctx.config) {
                Some("disabled in configuration")
            } else if !self.options.selects(kind) {
                Some("not selected")
            } else {
                None
            };
            if let Some(reason) = skip_reason {
                self.reporter.report(&TaskEvent::Skipped {
                    kind,
                    reason: reason.to_string(),
                });
                results.insert(kind, TaskResult::skipped(kind, reason));
                continue;
            }

            let semaphore = semaphore.clone();
            let ctx = ctx.clone();
            let reporter = self.reporter.clone();
            let timeout = self.options.timeout;

            let handle = tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => return TaskResult::failed(kind, Duration::ZERO, e.to_string()),
                };
                execute_task(task.as_ref(), &ctx, timeout, reporter.as_ref()).await
            });

            handles.push((kind, Instant::now(), handle));
        }

        // Collect results
        for (kind, spawned, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    let duration = spawned.elapsed();
                    let error = format!("task panicked: {}", e);
                    self.reporter.report(&TaskEvent::Failed {
                        kind,
                        duration,
                        error: error.clone(),
                    });
                    TaskResult::failed(kind, duration, error)
                }
            };
            results.insert(kind, result);
        }

        let results: Vec<TaskResult> = results.into_values().collect();

        self.reporter.report(&TaskEvent::AllCompleted {
            total: results.len(),
            succeeded: results.iter().filter(|r| r.status.is_success()).count(),
            failed: results.iter().filter(|r| r.status.is_failed()).count(),
            skipped: results.iter().filter(|r| r.status.is_skipped()).count(),
            duration: start.elapsed(),
        });

        DispatchReport {
            tag,
            triggered: true,
            results,
        }
    }
}

/// Execute a single task under the time limit
async fn execute_task(
    task: &dyn ReleaseTask,
    ctx: &TaskContext,
    timeout: Duration,
    reporter: &dyn TaskReporter,
) -> TaskResult {
    let kind = task.kind();
    let start = Instant::now();

    reporter.report(&TaskEvent::Started { kind });

    let outcome = tokio::time::timeout(timeout, task.run(ctx)).await;
    let duration = start.elapsed();

    match outcome {
        Ok(Ok(detail)) => {
            reporter.report(&TaskEvent::Completed {
                kind,
                duration,
                detail: detail.clone(),
            });
            TaskResult::success(kind, duration, detail)
        }
        Ok(Err(e)) => {
            debug!(task = %kind, exit_code = e.exit_code(), "task error");
            let error = e.to_string();
            reporter.report(&TaskEvent::Failed {
                kind,
                duration,
                error: error.clone(),
            });
            TaskResult::failed(kind, duration, error)
        }
        Err(_) => {
            let error = format!("timed out after {}s", timeout.as_secs());
            reporter.report(&TaskEvent::Failed {
                kind,
                duration,
                error: error.clone(),
            });
            TaskResult::failed(kind, duration, error)
        }
    }
}
