use serde::{Deserialize, Serialize};

/// Every structural selector the scraper relies on.
///
/// When the target site changes its markup this table is the only place that
/// needs editing. It can be overridden wholesale from the `schema` section of
/// a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSchema {
    /// One rendered review block
    pub review_card: String,

    // Fields read inside a card
    pub title: String,
    pub rating: String,
    /// Regex removed from the raw rating text before trimming
    pub rating_label: String,
    pub liked_text: String,
    pub disliked_text: String,
    pub review_date: String,
    pub traveler_type: String,
    pub user_name: String,
    pub user_country: String,

    // Page level controls
    pub cookie_accept: String,
    pub read_all_reviews: String,
    pub sort_trigger: String,
    /// Selector for a sort option; `{key}` is replaced by the option key
    pub sort_option: String,
    pub next_page: String,
}

impl Default for PageSchema {
    fn default() -> Self {
        Self {
            review_card: r#"div[data-testid="review-card"]"#.to_string(),
            title: r#"h4[data-testid="review-title"]"#.to_string(),
            rating: r#"div[data-testid="review-score"] div.bc946a29db"#.to_string(),
            rating_label: r"Puntuación:\s*".to_string(),
            liked_text: r#"div[data-testid="review-positive-text"]"#.to_string(),
            disliked_text: r#"div[data-testid="review-negative-text"]"#.to_string(),
            review_date: r#"span[data-testid="review-date"]"#.to_string(),
            traveler_type: r#"span[data-testid="review-traveler-type"]"#.to_string(),
            user_name: "div.b08850ce41".to_string(),
            user_country: "span.d838fb5f41".to_string(),
            cookie_accept: "#onetrust-accept-btn-handler".to_string(),
            read_all_reviews: r#"button[data-testid="fr-read-all-reviews"]"#.to_string(),
            sort_trigger: r#"button[data-testid="sorters-dropdown-trigger"]"#.to_string(),
            sort_option: r#"button[data-testid="sorters-dropdown-option-{key}"]"#.to_string(),
            next_page: r#"button[aria-label="Página siguiente"]"#.to_string(),
        }
    }
}

impl PageSchema {
    /// Selector for the sort dropdown entry with the given option key
    pub fn sort_option_for(&self, key: &str) -> String {
        self.sort_option.replace("{key}", key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_option_for() {
        let schema = PageSchema::default();
        assert_eq!(
            schema.sort_option_for("NEWEST_FIRST"),
            r#"button[data-testid="sorters-dropdown-option-NEWEST_FIRST"]"#
        );
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let schema: PageSchema =
            serde_json::from_str(r#"{"next_page": "a.next"}"#).unwrap();
        assert_eq!(schema.next_page, "a.next");
        assert_eq!(schema.review_card, PageSchema::default().review_card);
    }
}
