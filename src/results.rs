use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Format of the capture timestamp attached to every record
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One guest review as read from a review card
///
/// Every field is optional on the page; an absent field is an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    #[serde(rename = "Rating")]
    pub rating: String,

    #[serde(rename = "Review Title")]
    pub title: String,

    /// Positive comment
    #[serde(rename = "Liked Text")]
    pub liked_text: String,

    /// Negative comment
    #[serde(rename = "Disliked Text")]
    pub disliked_text: String,

    #[serde(rename = "Review Date")]
    pub review_date: String,

    #[serde(rename = "Traveler Type")]
    pub traveler_type: String,

    #[serde(rename = "User Name")]
    pub user_name: String,

    #[serde(rename = "User Country")]
    pub user_country: String,

    /// Local time the card was read, see [`TIMESTAMP_FORMAT`]
    #[serde(rename = "Scraped Timestamp")]
    pub scraped_at: String,
}

impl ReviewRecord {
    /// Identity used to drop repeated reviews
    pub fn dedup_key(&self) -> DedupKey {
        if self.title.is_empty() {
            DedupKey::Composite {
                author: self.user_name.clone(),
                date: self.review_date.clone(),
                rating: self.rating.clone(),
            }
        } else {
            DedupKey::Title(self.title.clone())
        }
    }
}

/// Identity of a review within one scrape
///
/// Titles identify most reviews. Title-less reviews fall back to author,
/// date and rating so they do not all collapse into a single entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    Title(String),
    Composite {
        author: String,
        date: String,
        rating: String,
    },
}

/// Records accumulated by a single scrape invocation
#[derive(Debug, Default)]
pub struct ScrapeSession {
    records: Vec<ReviewRecord>,
    seen: HashSet<DedupKey>,
}

impl ScrapeSession {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a non-empty title has already been recorded
    pub fn has_title(&self, title: &str) -> bool {
        !title.is_empty() && self.seen.contains(&DedupKey::Title(title.to_string()))
    }

    /// Appends the record unless its key was already seen.
    ///
    /// Returns `true` when the record was added.
    pub fn insert(&mut self, record: ReviewRecord) -> bool {
        if !self.seen.insert(record.dedup_key()) {
            ::log::debug!("Skipping repeated review: {:?}", record.dedup_key());
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn records(&self) -> &[ReviewRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Finish the session and hand over its records
    pub fn into_records(self) -> Vec<ReviewRecord> {
        self.records
    }
}
