//! Built-in release tasks

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use herald_adapters::CredentialProvider;
use herald_core::{HeraldError, Result};

use crate::task::ReleaseTask;

pub mod announce;
pub mod image;
pub mod website;

pub use announce::{compose_announcement, AnnounceTask};
pub use image::ImageTask;
pub use website::{splice_release_block, WebsiteTask};

/// The three tasks, each with its own view of the process environment
pub fn builtin_tasks(working_dir: &Path) -> Vec<Arc<dyn ReleaseTask>> {
    vec![
        Arc::new(WebsiteTask::new(CredentialProvider::new())),
        Arc::new(ImageTask::new(CredentialProvider::new()).with_working_dir(working_dir)),
        Arc::new(AnnounceTask::new(CredentialProvider::new())),
    ]
}

fn lock(credentials: &Mutex<CredentialProvider>) -> Result<MutexGuard<'_, CredentialProvider>> {
    credentials
        .lock()
        .map_err(|_| HeraldError::other("credential provider lock poisoned"))
}
