use crate::browser::{BrowserError, Launcher, Page, StepOutcome};
use crate::config::{ScraperConfig, Timeouts};
use crate::filter::SortOrder;
use crate::results::{ReviewRecord, ScrapeSession};
use crate::schema::PageSchema;
use crate::scrapers::{Extractor, HarvestError, harvest_page};
use thiserror::Error;

/// Failures that abort a scrape before any page is visited
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Launch(BrowserError),

    #[error("invalid rating label pattern: {0}")]
    Schema(#[from] regex::Error),
}

/// What to scrape
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    /// Hotel page address
    pub url: String,
    pub sort: SortOrder,
    /// Upper bound on the number of review pages visited
    pub max_pages: usize,
}

impl ScrapeRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            sort: SortOrder::Default,
            max_pages: 2,
        }
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }
}

/// Stages of a scrape once the browser is up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Navigating,
    CookieConsent,
    ReviewsEntry,
    SortFilter,
    HarvestPage(usize),
    NextPage(usize),
    Done,
}

/// Holds the browser session of one scrape.
///
/// If the scrape future is dropped before [`SessionGuard::close`] runs, the
/// session is closed on a background task instead.
struct SessionGuard<P: Page + 'static> {
    page: Option<P>,
}

impl<P: Page + 'static> SessionGuard<P> {
    fn new(page: P) -> Self {
        Self { page: Some(page) }
    }

    fn page(&mut self) -> Option<&mut P> {
        self.page.as_mut()
    }

    async fn close(mut self) {
        if let Some(page) = self.page.as_mut() {
            if let Err(e) = page.close().await {
                ::log::warn!("Failed to close browser session: {}", e);
            }
        }
        self.page = None;
    }
}

impl<P: Page + 'static> Drop for SessionGuard<P> {
    fn drop(&mut self) {
        let Some(mut page) = self.page.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                ::log::warn!("Scrape abandoned, closing browser session in the background");
                handle.spawn(async move {
                    if let Err(e) = page.close().await {
                        ::log::warn!("Failed to close browser session: {}", e);
                    }
                });
            }
            Err(_) => ::log::error!("Browser session dropped outside a runtime; it stays open"),
        }
    }
}

/// Scrapes the reviews of one hotel page.
///
/// Only a failure to start the browser is an error. Anything that goes
/// wrong afterwards ends the scrape early with whatever was collected. The
/// browser session is closed on every path, including when this future is
/// dropped mid-scrape.
pub async fn run_scrape<L: Launcher>(
    launcher: &L,
    config: &ScraperConfig,
    request: &ScrapeRequest,
) -> Result<Vec<ReviewRecord>, ScrapeError> {
    let extractor = Extractor::new(config.schema.clone())?;

    ::log::info!("Starting browser");
    let page = launcher
        .launch(&config.browser)
        .await
        .map_err(ScrapeError::Launch)?;
    let mut guard = SessionGuard::new(page);

    let mut session = ScrapeSession::new();
    if let Some(page) = guard.page() {
        if let Err(e) = drive(page, &extractor, &config.timeouts, request, &mut session).await {
            ::log::error!("Scrape of {} stopped: {}", request.url, e);
        }
    }
    guard.close().await;

    ::log::info!("Scrape complete. Unique reviews: {}", session.len());
    Ok(session.into_records())
}

async fn drive<P: Page>(
    page: &mut P,
    extractor: &Extractor,
    timeouts: &Timeouts,
    request: &ScrapeRequest,
    session: &mut ScrapeSession,
) -> Result<(), BrowserError> {
    let schema = extractor.schema();
    let max_pages = request.max_pages.max(1);
    let mut state = State::Navigating;

    loop {
        ::log::debug!("Scrape state: {:?}", state);
        state = match state {
            State::Navigating => {
                ::log::info!("Navigating to {}", request.url);
                page.goto(&request.url, timeouts.navigation()).await?;
                State::CookieConsent
            }
            State::CookieConsent => {
                accept_cookies(page, schema, timeouts).await;
                State::ReviewsEntry
            }
            State::ReviewsEntry => {
                enter_reviews(page, schema, timeouts).await;
                if request.sort.is_default() {
                    State::HarvestPage(1)
                } else {
                    State::SortFilter
                }
            }
            State::SortFilter => {
                if let Err(e) = apply_sort(page, schema, timeouts, &request.sort).await {
                    ::log::warn!("Could not apply sort {}: {}", request.sort, e);
                }
                State::HarvestPage(1)
            }
            State::HarvestPage(n) => {
                ::log::info!("Extracting page {} of {}", n, max_pages);
                match harvest_page(page, extractor, timeouts.review_cards(), session).await {
                    Ok(_) if n < max_pages => State::NextPage(n),
                    Ok(_) => State::Done,
                    Err(HarvestError::NoCards) => {
                        ::log::warn!("No review cards found on page {}", n);
                        State::Done
                    }
                    Err(HarvestError::Browser(e)) => return Err(e),
                }
            }
            State::NextPage(n) => {
                if advance_page(page, schema, timeouts).await {
                    State::HarvestPage(n + 1)
                } else {
                    State::Done
                }
            }
            State::Done => return Ok(()),
        };
    }
}

/// Clicks the consent banner if it shows up
async fn accept_cookies<P: Page>(page: &mut P, schema: &PageSchema, timeouts: &Timeouts) {
    match page
        .is_visible(&schema.cookie_accept, timeouts.optional_control())
        .await
    {
        Ok(true) => {
            ::log::info!("Accepting cookies");
            match StepOutcome::from_result(page.click(&schema.cookie_accept).await) {
                Ok(StepOutcome::Done) => page.pause(timeouts.after_cookie()).await,
                Ok(outcome) => ::log::info!("Cookie banner went away: {:?}", outcome),
                Err(e) => ::log::warn!("Could not accept cookies: {}", e),
            }
        }
        Ok(false) => ::log::info!("No cookie banner found"),
        Err(e) => ::log::warn!("Could not look for cookie banner: {}", e),
    }
}

/// Opens the full review list when the page offers a control for it
async fn enter_reviews<P: Page>(page: &mut P, schema: &PageSchema, timeouts: &Timeouts) {
    if let Err(e) = page.scroll_to_bottom().await {
        ::log::warn!("Could not scroll to the bottom of the page: {}", e);
    }

    match page
        .is_visible(&schema.read_all_reviews, timeouts.optional_control())
        .await
    {
        Ok(true) => {
            ::log::info!("Opening all reviews");
            let opened = match page.click(&schema.read_all_reviews).await {
                Ok(()) => page.wait_for_network_idle(timeouts.network_idle()).await,
                Err(e) => Err(e),
            };
            if let Err(e) = opened {
                ::log::warn!("Could not open all reviews: {}", e);
            }
        }
        Ok(false) => ::log::info!("Assuming the page already shows reviews"),
        Err(e) => ::log::warn!("Could not look for the reviews control: {}", e),
    }
}

/// Selects the requested ordering from the sort dropdown
async fn apply_sort<P: Page>(
    page: &mut P,
    schema: &PageSchema,
    timeouts: &Timeouts,
    sort: &SortOrder,
) -> Result<(), BrowserError> {
    let Some(key) = sort.option_key() else {
        return Ok(());
    };

    ::log::info!("Applying sort: {}", sort);
    page.click(&schema.sort_trigger).await?;
    page.pause(timeouts.after_dropdown()).await;
    page.click(&schema.sort_option_for(key)).await?;
    page.wait_for_network_idle(timeouts.network_idle()).await?;
    ::log::info!("Sort applied");
    Ok(())
}

/// Moves to the next review page. Returns `false` when there is none or the
/// move failed.
async fn advance_page<P: Page>(page: &mut P, schema: &PageSchema, timeouts: &Timeouts) -> bool {
    match page.is_enabled(&schema.next_page).await {
        Ok(Some(true)) => {}
        Ok(_) => {
            ::log::info!("No more pages");
            return false;
        }
        Err(e) => {
            ::log::warn!("Could not check for a next page: {}", e);
            return false;
        }
    }

    ::log::info!("Going to the next page");
    let moved = match page.click(&schema.next_page).await {
        Ok(()) => page.wait_for_network_idle(timeouts.network_idle()).await,
        Err(e) => Err(e),
    };
    match moved {
        Ok(()) => true,
        Err(e) => {
            ::log::warn!("Failed to change page: {}", e);
            false
        }
    }
}
