// Re-export modules
pub mod browser;
pub mod config;
pub mod filter;
pub mod parsers;
pub mod results;
pub mod schema;
pub mod scrapers;
pub mod server;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::ScraperConfig;
pub use filter::SortOrder;
pub use results::ReviewRecord;

use browser::WebDriverLauncher;
use scrapers::ScrapeRequest;

/// Builder for scraping the reviews of one hotel
pub struct HotelReviews {
    hotel_name: String,
    sort: SortOrder,
    max_pages: Option<usize>,
    config: ScraperConfig,
}

impl HotelReviews {
    /// Create a new builder for the named hotel with default settings
    pub fn new(hotel_name: impl Into<String>) -> Self {
        Self {
            hotel_name: hotel_name.into(),
            sort: SortOrder::Default,
            max_pages: None,
            config: ScraperConfig::default(),
        }
    }

    /// Set the review ordering to request from the site
    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// Set the maximum number of review pages to visit
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: ScraperConfig) -> Self {
        self.config = config;
        self
    }

    /// The request this builder describes
    pub fn request(&self) -> Result<ScrapeRequest, url::ParseError> {
        let url = utils::hotel_url(&self.config.url_template, &self.hotel_name)?;
        Ok(ScrapeRequest::new(url.as_str())
            .with_sort(self.sort.clone())
            .with_max_pages(self.max_pages.unwrap_or(self.config.max_pages)))
    }

    /// Run the scrape against the configured WebDriver server
    pub async fn collect(self) -> Result<Vec<ReviewRecord>, Box<dyn std::error::Error>> {
        let request = self.request()?;
        let launcher = WebDriverLauncher::new(&self.config.webdriver_url);
        Ok(scrapers::run_scrape(&launcher, &self.config, &request).await?)
    }
}
