use crate::browser::{BrowserError, Card, Launcher, Page};
use crate::config::BrowserOptions;
use crate::parsers::html;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Serves saved HTML pages in place of a live browser.
///
/// Each site is a list of pages; clicking the configured next-page control
/// moves to the following page. Every interaction is recorded so callers can
/// inspect what the scraper did, and any recorded interaction can be made to
/// fail with [`SnapshotLauncher::failing`].
#[derive(Debug, Clone)]
pub struct SnapshotLauncher {
    sites: Arc<HashMap<String, Vec<String>>>,
    any_url: Option<Arc<Vec<String>>>,
    next_page: String,
    available: bool,
    failures: Arc<HashSet<String>>,
    interactions: Arc<Mutex<Vec<String>>>,
}

impl SnapshotLauncher {
    /// Create a launcher with no sites; `next_page` is the selector that
    /// advances to the next saved page
    pub fn new(next_page: impl Into<String>) -> Self {
        Self {
            sites: Arc::new(HashMap::new()),
            any_url: None,
            next_page: next_page.into(),
            available: true,
            failures: Arc::new(HashSet::new()),
            interactions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Serve `pages` when `url` is loaded
    pub fn with_site(mut self, url: impl Into<String>, pages: Vec<String>) -> Self {
        Arc::make_mut(&mut self.sites).insert(url.into(), pages);
        self
    }

    /// Serve `pages` for any URL without a dedicated site
    pub fn with_any_url(mut self, pages: Vec<String>) -> Self {
        self.any_url = Some(Arc::new(pages));
        self
    }

    /// Make every launch fail, as if no browser could be started
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Make `interaction` fail every time it happens. Takes the recorded form:
    /// `click <selector>` or `network idle`.
    pub fn failing(mut self, interaction: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.failures).insert(interaction.into());
        self
    }

    /// Interactions recorded across every session from this launcher
    pub fn interactions(&self) -> Vec<String> {
        self.interactions
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Launcher for SnapshotLauncher {
    type Page = SnapshotPage;

    async fn launch(&self, options: &BrowserOptions) -> Result<SnapshotPage, BrowserError> {
        if !self.available {
            return Err(BrowserError::Launch("snapshot browser unavailable".to_string()));
        }
        ::log::debug!(
            "Opening snapshot session ({}x{}, {})",
            options.viewport_width,
            options.viewport_height,
            options.locale
        );
        Ok(SnapshotPage {
            launcher: self.clone(),
            pages: Vec::new(),
            current: 0,
        })
    }
}

/// A session over saved HTML pages
#[derive(Debug)]
pub struct SnapshotPage {
    launcher: SnapshotLauncher,
    pages: Vec<String>,
    current: usize,
}

impl SnapshotPage {
    /// Records `interaction`; `false` if it was set up to fail
    fn record(&self, interaction: String) -> bool {
        let fails = self.launcher.failures.contains(&interaction);
        if let Ok(mut log) = self.launcher.interactions.lock() {
            log.push(interaction);
        }
        !fails
    }

    /// Index of the page currently shown, starting at 0
    pub fn current_page(&self) -> usize {
        self.current
    }

    fn html(&self) -> &str {
        self.pages.get(self.current).map(String::as_str).unwrap_or("")
    }

    /// Applies `f` to the first element matching `selector`
    fn with_first<R>(
        &self,
        selector: &str,
        f: impl FnOnce(ElementRef) -> R,
    ) -> Result<Option<R>, BrowserError> {
        let selector = parse_selector(selector)?;
        let doc = Html::parse_document(self.html());
        Ok(doc.select(&selector).next().map(f))
    }
}

fn parse_selector(selector: &str) -> Result<Selector, BrowserError> {
    Selector::parse(selector)
        .map_err(|e| BrowserError::Command(format!("invalid selector {selector}: {e:?}")))
}

#[async_trait]
impl Page for SnapshotPage {
    type Card = SnapshotCard;

    async fn goto(&mut self, url: &str, _timeout: Duration) -> Result<(), BrowserError> {
        self.record(format!("goto {url}"));
        let pages = match self.launcher.sites.get(url) {
            Some(pages) => pages.clone(),
            None => match &self.launcher.any_url {
                Some(pages) => pages.as_ref().clone(),
                None => return Err(BrowserError::Navigation(url.to_string())),
            },
        };
        self.pages = pages;
        self.current = 0;
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str, _timeout: Duration) -> Result<(), BrowserError> {
        match self.with_first(selector, |_| ())? {
            Some(()) => Ok(()),
            None => Err(BrowserError::Timeout(selector.to_string())),
        }
    }

    async fn is_visible(&mut self, selector: &str, _timeout: Duration) -> Result<bool, BrowserError> {
        Ok(self
            .with_first(selector, |el| !html::is_hidden(el))?
            .unwrap_or(false))
    }

    async fn is_enabled(&mut self, selector: &str) -> Result<Option<bool>, BrowserError> {
        self.with_first(selector, |el| !html::is_disabled(el))
    }

    async fn click(&mut self, selector: &str) -> Result<(), BrowserError> {
        if self.with_first(selector, |_| ())?.is_none() {
            return Err(BrowserError::NotFound(selector.to_string()));
        }
        if !self.record(format!("click {selector}")) {
            return Err(BrowserError::Command(format!("click on {selector} failed")));
        }
        if selector == self.launcher.next_page && self.current + 1 < self.pages.len() {
            self.current += 1;
        }
        Ok(())
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), BrowserError> {
        self.record("scroll".to_string());
        Ok(())
    }

    async fn wait_for_network_idle(&mut self, _timeout: Duration) -> Result<(), BrowserError> {
        if !self.record("network idle".to_string()) {
            return Err(BrowserError::Timeout("network idle".to_string()));
        }
        Ok(())
    }

    async fn pause(&mut self, _duration: Duration) {}

    async fn cards(&mut self, selector: &str) -> Result<Vec<SnapshotCard>, BrowserError> {
        let selector = parse_selector(selector)?;
        let doc = Html::parse_document(self.html());
        Ok(doc
            .select(&selector)
            .map(|el| SnapshotCard { html: el.html() })
            .collect())
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.record("close".to_string());
        self.pages.clear();
        Ok(())
    }
}

/// A review card cut out of a saved page
#[derive(Debug, Clone)]
pub struct SnapshotCard {
    html: String,
}

impl SnapshotCard {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }
}

#[async_trait]
impl Card for SnapshotCard {
    async fn text(&self, selector: &str) -> Result<Option<String>, BrowserError> {
        let selector = parse_selector(selector)?;
        let doc = Html::parse_fragment(&self.html);
        Ok(doc
            .select(&selector)
            .next()
            .map(|el| html::inner_text(el).trim().to_string()))
    }
}
