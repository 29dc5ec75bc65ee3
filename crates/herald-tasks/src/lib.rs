//! Herald Tasks - release side effects and the dispatcher that runs them
//!
//! Each task performs one side effect for a release tag. The
//! dispatcher runs every task once, concurrently, and records each
//! outcome independently.

pub mod builtin;
pub mod dispatcher;
pub mod reporter;
pub mod task;

pub use builtin::{builtin_tasks, AnnounceTask, ImageTask, WebsiteTask};
pub use dispatcher::{DispatchOptions, DispatchReport, Dispatcher};
pub use reporter::{CollectingReporter, TaskEvent, TaskReporter, TaskReporterRegistry, TracingReporter};
pub use task::{ReleaseTask, TaskContext, TaskKind, TaskResult, TaskStatus};
