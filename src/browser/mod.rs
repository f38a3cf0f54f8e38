//! Browser automation capability.
//!
//! The scraping logic only talks to the page through these traits. The
//! [`webdriver`] implementation drives a real browser over WebDriver; the
//! [`snapshot`] implementation serves saved HTML and backs offline replay and
//! the tests.

pub mod snapshot;
pub mod webdriver;

use crate::config::BrowserOptions;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub use snapshot::{SnapshotCard, SnapshotLauncher, SnapshotPage};
pub use webdriver::{WebDriverLauncher, WebDriverPage};

/// Failures reported by the automation layer
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BrowserError {
    #[error("failed to start browser session: {0}")]
    Launch(String),

    #[error("failed to load {0}")]
    Navigation(String),

    #[error("timed out waiting for {0}")]
    Timeout(String),

    #[error("no element matches {0}")]
    NotFound(String),

    #[error("element is no longer attached to the page")]
    Detached,

    #[error("browser command failed: {0}")]
    Command(String),
}

/// Result of one optional interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Done,
    NotFound,
    TimedOut,
}

impl StepOutcome {
    /// Classifies a step result; errors other than absence or timeout are
    /// returned unchanged.
    pub fn from_result(result: Result<(), BrowserError>) -> Result<Self, BrowserError> {
        match result {
            Ok(()) => Ok(StepOutcome::Done),
            Err(BrowserError::NotFound(_)) => Ok(StepOutcome::NotFound),
            Err(BrowserError::Timeout(_)) => Ok(StepOutcome::TimedOut),
            Err(e) => Err(e),
        }
    }
}

/// Starts browser sessions
#[async_trait]
pub trait Launcher: Send + Sync {
    type Page: Page + 'static;

    /// Open a fresh session configured with the given options
    async fn launch(&self, options: &BrowserOptions) -> Result<Self::Page, BrowserError>;
}

/// One open page in a browser session
#[async_trait]
pub trait Page: Send {
    type Card: Card;

    /// Load `url` and wait for the network to go quiet
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError>;

    /// Wait until at least one element matches `selector`
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<(), BrowserError>;

    /// Whether an element matching `selector` becomes visible within `timeout`
    async fn is_visible(&mut self, selector: &str, timeout: Duration) -> Result<bool, BrowserError>;

    /// Enabled state of the first match, `None` if nothing matches
    async fn is_enabled(&mut self, selector: &str) -> Result<Option<bool>, BrowserError>;

    /// Click the first element matching `selector`
    async fn click(&mut self, selector: &str) -> Result<(), BrowserError>;

    async fn scroll_to_bottom(&mut self) -> Result<(), BrowserError>;

    /// Wait until no further network activity is observed
    async fn wait_for_network_idle(&mut self, timeout: Duration) -> Result<(), BrowserError>;

    /// Fixed delay
    async fn pause(&mut self, duration: Duration);

    /// All elements currently matching `selector`
    async fn cards(&mut self, selector: &str) -> Result<Vec<Self::Card>, BrowserError>;

    /// End the session
    async fn close(&mut self) -> Result<(), BrowserError>;
}

/// Read access to one review card
#[async_trait]
pub trait Card: Send + Sync {
    /// Rendered text of the first descendant matching `selector`, `None` if
    /// there is no such element
    async fn text(&self, selector: &str) -> Result<Option<String>, BrowserError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_outcome_classification() {
        assert_eq!(StepOutcome::from_result(Ok(())), Ok(StepOutcome::Done));
        assert_eq!(
            StepOutcome::from_result(Err(BrowserError::NotFound("#x".into()))),
            Ok(StepOutcome::NotFound)
        );
        assert_eq!(
            StepOutcome::from_result(Err(BrowserError::Timeout("#x".into()))),
            Ok(StepOutcome::TimedOut)
        );
        assert_eq!(
            StepOutcome::from_result(Err(BrowserError::Detached)),
            Err(BrowserError::Detached)
        );
    }
}
