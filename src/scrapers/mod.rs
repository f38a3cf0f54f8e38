//! Review scraping: field extraction, per-page harvesting and the
//! pagination driver that ties them to a browser session.

pub mod driver;
pub mod extract;
pub mod harvest;

pub use driver::{ScrapeError, ScrapeRequest, run_scrape};
pub use extract::Extractor;
pub use harvest::{HarvestError, harvest_page};

#[cfg(test)]
pub(crate) mod fixtures;
