use crate::schema::PageSchema;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("url_template must contain the {{slug}} placeholder: {0}")]
    MissingSlug(String),

    #[error("max_pages must be at least 1")]
    NoPages,

    #[error("invalid rating label pattern: {0}")]
    RatingLabel(#[from] regex::Error),
}

/// Configuration for the review scraper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Hotel page address; `{slug}` is replaced by the derived hotel slug
    #[serde(default = "default_url_template")]
    pub url_template: String,

    /// Page limit used when a request does not name one
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Number of scrapes allowed to hold a browser session at once
    #[serde(default = "default_max_concurrent_scrapes")]
    pub max_concurrent_scrapes: usize,

    #[serde(default)]
    pub browser: BrowserOptions,

    #[serde(default)]
    pub timeouts: Timeouts,

    #[serde(default)]
    pub schema: PageSchema,
}

/// Options applied when a browser session is launched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserOptions {
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub user_agent: String,
    /// Preferred content language sent to the site
    pub locale: String,
    /// Additional command-line switches passed to the browser
    pub args: Vec<String>,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1920,
            viewport_height: 1080,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0 Safari/537.36"
                .to_string(),
            locale: "es-ES".to_string(),
            args: vec![
                "--disable-gpu".to_string(),
                "--disable-dev-shm-usage".to_string(),
                "--no-sandbox".to_string(),
            ],
        }
    }
}

/// Per-step time limits, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub navigation_ms: u64,
    pub optional_control_ms: u64,
    pub network_idle_ms: u64,
    pub review_cards_ms: u64,
    pub after_cookie_ms: u64,
    pub after_dropdown_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            navigation_ms: 90_000,
            optional_control_ms: 5_000,
            network_idle_ms: 15_000,
            review_cards_ms: 15_000,
            after_cookie_ms: 1_000,
            after_dropdown_ms: 500,
        }
    }
}

impl Timeouts {
    pub fn navigation(&self) -> Duration {
        Duration::from_millis(self.navigation_ms)
    }

    pub fn optional_control(&self) -> Duration {
        Duration::from_millis(self.optional_control_ms)
    }

    pub fn network_idle(&self) -> Duration {
        Duration::from_millis(self.network_idle_ms)
    }

    pub fn review_cards(&self) -> Duration {
        Duration::from_millis(self.review_cards_ms)
    }

    pub fn after_cookie(&self) -> Duration {
        Duration::from_millis(self.after_cookie_ms)
    }

    pub fn after_dropdown(&self) -> Duration {
        Duration::from_millis(self.after_dropdown_ms)
    }
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

/// Default value for url_template
fn default_url_template() -> String {
    "https://www.booking.com/hotel/pe/{slug}.es.html".to_string()
}

/// Default value for max_pages
fn default_max_pages() -> usize {
    2
}

/// Default value for max_concurrent_scrapes
fn default_max_concurrent_scrapes() -> usize {
    1
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            url_template: default_url_template(),
            max_pages: default_max_pages(),
            max_concurrent_scrapes: default_max_concurrent_scrapes(),
            browser: BrowserOptions::default(),
            timeouts: Timeouts::default(),
            schema: PageSchema::default(),
        }
    }
}

impl ScraperConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the settings that would otherwise only fail mid-scrape
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.url_template.contains("{slug}") {
            return Err(ConfigError::MissingSlug(self.url_template.clone()));
        }
        if self.max_pages == 0 {
            return Err(ConfigError::NoPages);
        }
        regex::Regex::new(&self.schema.rating_label)?;
        Ok(())
    }

    /// Override the WebDriver URL with the given value when it is non-empty
    pub fn with_webdriver_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.is_empty()) {
            self.webdriver_url = url;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let config = ScraperConfig::from_json("{}").unwrap();
        assert_eq!(config.max_pages, 2);
        assert_eq!(config.webdriver_url, "http://localhost:4444");
        assert_eq!(config.browser.locale, "es-ES");
        assert_eq!(config.timeouts.navigation(), Duration::from_secs(90));
    }

    #[test]
    fn test_template_without_slug_is_rejected() {
        let err = ScraperConfig::from_json(r#"{"url_template": "https://example.org/"}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingSlug(_)));
    }

    #[test]
    fn test_zero_pages_is_rejected() {
        let err = ScraperConfig::from_json(r#"{"max_pages": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::NoPages));
    }

    #[test]
    fn test_bad_rating_label_is_rejected() {
        let err = ScraperConfig::from_json(r#"{"schema": {"rating_label": "("}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::RatingLabel(_)));
    }

    #[test]
    fn test_empty_webdriver_override_is_ignored() {
        let config = ScraperConfig::default().with_webdriver_url(Some(String::new()));
        assert_eq!(config.webdriver_url, "http://localhost:4444");

        let config = ScraperConfig::default().with_webdriver_url(Some("http://h:9515".into()));
        assert_eq!(config.webdriver_url, "http://h:9515");
    }
}
