//! Task execution reporting

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::task::TaskKind;

/// Events emitted during a dispatch
#[derive(Debug, Clone)]
pub enum TaskEvent {
    /// Dispatch of a tag is starting
    DispatchStarted { tag: String, task_count: usize },
    /// A task is starting execution
    Started { kind: TaskKind },
    /// A task completed successfully
    Completed {
        kind: TaskKind,
        duration: Duration,
        detail: String,
    },
    /// A task failed
    Failed {
        kind: TaskKind,
        duration: Duration,
        error: String,
    },
    /// A task was not started
    Skipped { kind: TaskKind, reason: String },
    /// All tasks completed
    AllCompleted {
        total: usize,
        succeeded: usize,
        failed: usize,
        skipped: usize,
        duration: Duration,
    },
}

/// Trait for reporting task execution progress
pub trait TaskReporter: Send + Sync {
    /// Handle a task event
    fn report(&self, event: &TaskEvent);
}

/// Simple reporter that logs to tracing
#[derive(Debug, Default)]
pub struct TracingReporter;

impl TaskReporter for TracingReporter {
    fn report(&self, event: &TaskEvent) {
        match event {
            TaskEvent::DispatchStarted { tag, task_count } => {
                tracing::info!(tag = %tag, task_count, "dispatching release");
            }
            TaskEvent::Started { kind } => {
                tracing::info!(task = %kind, "starting");
            }
            TaskEvent::Completed {
                kind,
                duration,
                detail,
            } => {
                tracing::info!(task = %kind, secs = duration.as_secs_f64(), "{}", detail);
            }
            TaskEvent::Failed {
                kind,
                duration,
                error,
            } => {
                tracing::error!(task = %kind, secs = duration.as_secs_f64(), "failed: {}", error);
            }
            TaskEvent::Skipped { kind, reason } => {
                tracing::info!(task = %kind, "skipped: {}", reason);
            }
            TaskEvent::AllCompleted {
                total,
                succeeded,
                failed,
                skipped,
                duration,
            } => {
                tracing::info!(
                    "All tasks complete: {}/{} succeeded, {} failed, {} skipped ({:.1}s)",
                    succeeded,
                    total,
                    failed,
                    skipped,
                    duration.as_secs_f64()
                );
            }
        }
    }
}

/// Reporter that collects events for later inspection
#[derive(Debug, Default)]
pub struct CollectingReporter {
    events: Mutex<Vec<TaskEvent>>,
}

impl CollectingReporter {
    /// Get all collected events
    pub fn events(&self) -> Vec<TaskEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl TaskReporter for CollectingReporter {
    fn report(&self, event: &TaskEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Fans events out to several reporters
pub struct TaskReporterRegistry {
    reporters: Vec<Arc<dyn TaskReporter>>,
}

impl TaskReporterRegistry {
    pub fn new() -> Self {
        Self {
            reporters: vec![Arc::new(TracingReporter)],
        }
    }

    /// Add a reporter alongside the tracing one
    pub fn register(&mut self, reporter: Arc<dyn TaskReporter>) {
        self.reporters.push(reporter);
    }
}

impl Default for TaskReporterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskReporter for TaskReporterRegistry {
    fn report(&self, event: &TaskEvent) {
        for reporter in &self.reporters {
            reporter.report(event);
        }
    }
}
