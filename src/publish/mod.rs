//! External collaborator seams: content acquisition and publishing.
//!
//! The scheduler only sees these traits. Real integrations (a scraper, a
//! platform API client) plug in behind them; the crate ships a static
//! content source, a dry-run publisher, and scriptable mocks for tests.
//!
//! Publishers map expected API-level failures to an [`Outcome`] value.
//! Only transport faults (connection loss and the like) return `Err`,
//! and those are absorbed at the cycle boundary.

use crate::domain::{Account, Outcome};
use crate::error::{FlockrError, Result};
use async_trait::async_trait;
use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

/// One candidate post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Post body
    pub body: String,

    /// Optional link appended to the rendered post
    #[serde(default)]
    pub link: Option<String>,
}

impl ContentItem {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            link: None,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Final post text.
    pub fn rendered(&self) -> String {
        match &self.link {
            Some(link) => format!("{}\nRead more: {}", self.body, link),
            None => self.body.clone(),
        }
    }
}

/// Supplies one candidate post per cycle.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch a candidate, or fail with `ContentUnavailable`.
    async fn fetch_candidate(&self) -> Result<ContentItem>;
}

/// Publishes a content item from one account.
#[async_trait]
pub trait Publisher: Send + Sync + std::fmt::Debug {
    /// Attempt a post. Expected API failures become `Outcome` values;
    /// only transport faults return `Err`.
    async fn publish(&self, account: &Account, content: &ContentItem) -> Result<Outcome>;
}

/// Content source drawing uniformly from a fixed candidate list.
pub struct StaticContentSource {
    candidates: Vec<ContentItem>,
}

impl StaticContentSource {
    pub fn new(candidates: Vec<ContentItem>) -> Self {
        Self { candidates }
    }

    /// Load candidates from a JSON array file.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let candidates: Vec<ContentItem> = serde_json::from_str(&content)?;
        Ok(Self::new(candidates))
    }
}

#[async_trait]
impl ContentSource for StaticContentSource {
    async fn fetch_candidate(&self) -> Result<ContentItem> {
        if self.candidates.is_empty() {
            return Err(FlockrError::ContentUnavailable(
                "candidate list is empty".to_string(),
            ));
        }
        let index = rand::rng().random_range(0..self.candidates.len());
        Ok(self.candidates[index].clone())
    }
}

/// Publisher that logs instead of posting. Every attempt succeeds.
#[derive(Debug)]
pub struct DryRunPublisher;

#[async_trait]
impl Publisher for DryRunPublisher {
    async fn publish(&self, account: &Account, content: &ContentItem) -> Result<Outcome> {
        info!("[dry-run] {} would post: {}", account.username, content.rendered());
        Ok(Outcome::Success)
    }
}

/// Scriptable publisher for tests: per-account outcomes with a call log.
#[derive(Debug, Default)]
pub struct MockPublisher {
    outcomes: HashMap<String, Outcome>,
    fail_transport_for: Option<String>,
    calls: Mutex<Vec<String>>,
}

impl MockPublisher {
    /// All accounts succeed unless scripted otherwise.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a fixed outcome for one account.
    pub fn with_outcome(mut self, username: impl Into<String>, outcome: Outcome) -> Self {
        self.outcomes.insert(username.into(), outcome);
        self
    }

    /// Script a transport-level failure for one account.
    pub fn with_transport_failure(mut self, username: impl Into<String>) -> Self {
        self.fail_transport_for = Some(username.into());
        self
    }

    /// Usernames in publish order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    async fn publish(&self, account: &Account, _content: &ContentItem) -> Result<Outcome> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(account.username.clone());
        }
        if self.fail_transport_for.as_deref() == Some(account.username.as_str()) {
            return Err(FlockrError::Transport("scripted failure".to_string()));
        }
        Ok(self
            .outcomes
            .get(&account.username)
            .copied()
            .unwrap_or(Outcome::Success))
    }
}

/// Scriptable content source for tests.
pub struct MockContentSource {
    item: Option<ContentItem>,
}

impl MockContentSource {
    /// Always returns the given item.
    pub fn with_item(item: ContentItem) -> Self {
        Self { item: Some(item) }
    }

    /// Always fails with `ContentUnavailable`.
    pub fn unavailable() -> Self {
        Self { item: None }
    }
}

#[async_trait]
impl ContentSource for MockContentSource {
    async fn fetch_candidate(&self) -> Result<ContentItem> {
        self.item
            .clone()
            .ok_or_else(|| FlockrError::ContentUnavailable("scripted".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendered_without_link() {
        let item = ContentItem::new("hello fleet");
        assert_eq!(item.rendered(), "hello fleet");
    }

    #[test]
    fn test_rendered_with_link() {
        let item = ContentItem::new("hello").with_link("https://example.com/p/1");
        assert_eq!(item.rendered(), "hello\nRead more: https://example.com/p/1");
    }

    #[tokio::test]
    async fn test_static_source_draws_from_candidates() {
        let source = StaticContentSource::new(vec![
            ContentItem::new("one"),
            ContentItem::new("two"),
        ]);
        let item = source.fetch_candidate().await.unwrap();
        assert!(item.body == "one" || item.body == "two");
    }

    #[tokio::test]
    async fn test_static_source_empty_is_content_unavailable() {
        let source = StaticContentSource::new(vec![]);
        let err = source.fetch_candidate().await.unwrap_err();
        assert!(matches!(err, FlockrError::ContentUnavailable(_)));
    }

    #[tokio::test]
    async fn test_dry_run_publisher_always_succeeds() {
        let publisher = DryRunPublisher;
        let outcome = publisher
            .publish(&Account::new("bot_a"), &ContentItem::new("x"))
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Success);
    }

    #[tokio::test]
    async fn test_mock_publisher_scripted_outcome() {
        let publisher = MockPublisher::new().with_outcome("bot_b", Outcome::ServerError);
        let content = ContentItem::new("x");

        let a = publisher.publish(&Account::new("bot_a"), &content).await.unwrap();
        let b = publisher.publish(&Account::new("bot_b"), &content).await.unwrap();

        assert_eq!(a, Outcome::Success);
        assert_eq!(b, Outcome::ServerError);
        assert_eq!(publisher.calls(), vec!["bot_a", "bot_b"]);
    }

    #[tokio::test]
    async fn test_mock_publisher_transport_failure() {
        let publisher = MockPublisher::new().with_transport_failure("bot_a");
        let err = publisher
            .publish(&Account::new("bot_a"), &ContentItem::new("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, FlockrError::Transport(_)));
    }

    #[tokio::test]
    async fn test_mock_content_source() {
        let source = MockContentSource::with_item(ContentItem::new("fixed"));
        assert_eq!(source.fetch_candidate().await.unwrap().body, "fixed");

        let unavailable = MockContentSource::unavailable();
        assert!(unavailable.fetch_candidate().await.is_err());
    }
}
