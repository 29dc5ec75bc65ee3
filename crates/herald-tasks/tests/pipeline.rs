//! End-to-end dispatch of a release tag through the built-in tasks

#![cfg(unix)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use herald_adapters::CredentialProvider;
use herald_core::{Config, ReleaseEvent};
use herald_stores::error::Result as StoreResult;
use herald_stores::{CommitInfo, ContentStore, Page, PageLocation, PostedMessage, SocialPoster, StoreError};
use herald_tasks::{
    AnnounceTask, CollectingReporter, DispatchOptions, Dispatcher, ImageTask, TaskContext,
    TaskKind, WebsiteTask,
};

const PAGE: &str = "<h2>Latest</h2>\n<!-- herald:release:start -->v1.9.0<!-- herald:release:end -->\n";

#[derive(Default)]
struct RecordingStore {
    written: Mutex<Vec<String>>,
}

#[async_trait]
impl ContentStore for RecordingStore {
    fn name(&self) -> &str {
        "recording"
    }

    async fn fetch_page(&self, _location: &PageLocation) -> StoreResult<Page> {
        Ok(Page {
            content: PAGE.to_string(),
            sha: "b1ob".to_string(),
        })
    }

    async fn update_page(
        &self,
        _location: &PageLocation,
        content: &str,
        _sha: &str,
        _message: &str,
    ) -> StoreResult<CommitInfo> {
        self.written.lock().unwrap().push(content.to_string());
        Ok(CommitInfo {
            sha: "c0ffee".to_string(),
            url: None,
        })
    }
}

#[derive(Default)]
struct RecordingPoster {
    reject: bool,
    posts: Mutex<Vec<String>>,
}

#[async_trait]
impl SocialPoster for RecordingPoster {
    fn name(&self) -> &str {
        "recording"
    }

    fn max_length(&self) -> usize {
        280
    }

    async fn post(&self, text: &str) -> StoreResult<PostedMessage> {
        if self.reject {
            return Err(StoreError::from_status(401, "Could not authenticate you"));
        }
        self.posts.lock().unwrap().push(text.to_string());
        Ok(PostedMessage {
            id: "1".to_string(),
            text: text.to_string(),
        })
    }
}

fn environment() -> CredentialProvider {
    let vars = [
        ("GITHUB_TOKEN", "ghp_test"),
        ("DOCKER_USERNAME", "inaimathi"),
        ("DOCKER_PASSWORD", "hunter2"),
        ("TWITTER_CONSUMER_KEY", "ck"),
        ("TWITTER_CONSUMER_SECRET", "cs"),
        ("TWITTER_ACCESS_TOKEN", "at"),
        ("TWITTER_ACCESS_TOKEN_SECRET", "ats"),
    ];
    CredentialProvider::from_vars(
        vars.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>(),
    )
}

fn dispatcher(store: Arc<RecordingStore>, poster: Arc<RecordingPoster>) -> Dispatcher {
    Dispatcher::new(
        DispatchOptions::default(),
        Arc::new(CollectingReporter::default()),
    )
    .with_task(Arc::new(WebsiteTask::new(environment()).with_store(store)))
    .with_task(Arc::new(ImageTask::new(environment()).with_docker_binary("true")))
    .with_task(Arc::new(AnnounceTask::new(environment()).with_poster(poster)))
}

fn context() -> TaskContext {
    let event = ReleaseEvent::from_ref("refs/tags/v2.0.0", Some("inaimathi/cl-notebook".into()))
        .unwrap();
    TaskContext::new(event, Config::default()).unwrap()
}

#[tokio::test]
async fn test_v2_release_reaches_all_three_services() {
    let store = Arc::new(RecordingStore::default());
    let poster = Arc::new(RecordingPoster::default());

    let report = dispatcher(store.clone(), poster.clone())
        .dispatch(context())
        .await;

    assert!(report.triggered);
    assert!(report.all_succeeded(), "{:?}", report.failed());
    assert_eq!(report.tag, "v2.0.0");

    let written = store.written.lock().unwrap();
    assert_eq!(written.len(), 1);
    assert!(written[0].contains("releases/tag/v2.0.0"));
    assert!(!written[0].contains("v1.9.0"));

    let image = report.get(TaskKind::Image).unwrap();
    assert_eq!(
        image.detail.as_deref(),
        Some("pushed cl-notebook:v2.0.0, cache cl-notebook:v2.0.0")
    );

    let posts = poster.posts.lock().unwrap();
    assert_eq!(posts.len(), 1);
    assert!(posts[0].contains("v2.0.0"));
}

#[tokio::test]
async fn test_announcer_failure_is_isolated() {
    let store = Arc::new(RecordingStore::default());
    let poster = Arc::new(RecordingPoster {
        reject: true,
        ..Default::default()
    });

    let report = dispatcher(store.clone(), poster).dispatch(context()).await;

    assert!(!report.all_succeeded());
    let failed: Vec<_> = report.failed().iter().map(|r| r.kind).collect();
    assert_eq!(failed, vec![TaskKind::Announce]);
    assert!(report.get(TaskKind::Website).unwrap().status.is_success());
    assert!(report.get(TaskKind::Image).unwrap().status.is_success());
    assert_eq!(store.written.lock().unwrap().len(), 1);
}
