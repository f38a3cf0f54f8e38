use crate::browser::{BrowserError, Card};
use crate::parsers::{comment_text, rating_text};
use crate::results::{ReviewRecord, TIMESTAMP_FORMAT};
use crate::schema::PageSchema;
use regex::Regex;

/// Outcome of reading one field from a card
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRead {
    Found(String),
    Missing,
    Failed(BrowserError),
}

/// Reads the trimmed text of the first element matching `selector`
pub async fn read_text<C: Card>(card: &C, selector: &str) -> FieldRead {
    match card.text(selector).await {
        Ok(Some(text)) => FieldRead::Found(text.trim().to_string()),
        Ok(None) => FieldRead::Missing,
        Err(e) => FieldRead::Failed(e),
    }
}

/// Best-effort read: any outcome other than a match yields an empty string
pub async fn safe_text<C: Card>(card: &C, selector: &str) -> String {
    match read_text(card, selector).await {
        FieldRead::Found(text) => text,
        FieldRead::Missing => String::new(),
        FieldRead::Failed(e) => {
            ::log::debug!("Could not read {}: {}", selector, e);
            String::new()
        }
    }
}

/// Reads review fields from cards according to a page schema
#[derive(Debug, Clone)]
pub struct Extractor {
    schema: PageSchema,
    rating_label: Regex,
}

impl Extractor {
    pub fn new(schema: PageSchema) -> Result<Self, regex::Error> {
        let rating_label = Regex::new(&schema.rating_label)?;
        Ok(Self {
            schema,
            rating_label,
        })
    }

    pub fn schema(&self) -> &PageSchema {
        &self.schema
    }

    /// Reads the card title.
    ///
    /// A missing or unreadable title is an empty string. Only a detached card
    /// is an error, since none of its other fields can be read either.
    pub async fn title<C: Card>(&self, card: &C) -> Result<String, BrowserError> {
        match read_text(card, &self.schema.title).await {
            FieldRead::Found(title) => Ok(title),
            FieldRead::Missing => Ok(String::new()),
            FieldRead::Failed(BrowserError::Detached) => Err(BrowserError::Detached),
            FieldRead::Failed(e) => {
                ::log::debug!("Could not read title: {}", e);
                Ok(String::new())
            }
        }
    }

    /// Reads the remaining fields of a card whose title is already known
    pub async fn extract_review<C: Card>(&self, card: &C, title: String) -> ReviewRecord {
        let schema = &self.schema;

        let user_name = safe_text(card, &schema.user_name).await;
        let user_country = safe_text(card, &schema.user_country).await;
        let traveler_type = safe_text(card, &schema.traveler_type).await;
        let review_date = safe_text(card, &schema.review_date).await;

        let rating_raw = safe_text(card, &schema.rating).await;
        let rating = rating_text(&rating_raw, &self.rating_label);

        let liked_text = comment_text(&safe_text(card, &schema.liked_text).await);
        let disliked_text = comment_text(&safe_text(card, &schema.disliked_text).await);

        ReviewRecord {
            rating,
            title,
            liked_text,
            disliked_text,
            review_date,
            traveler_type,
            user_name,
            user_country,
            scraped_at: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::SnapshotCard;
    use crate::scrapers::fixtures;

    fn extractor() -> Extractor {
        Extractor::new(PageSchema::default()).unwrap()
    }

    #[tokio::test]
    async fn test_full_card() {
        let card = SnapshotCard::new(fixtures::card(&fixtures::Review {
            title: "Excelente ubicación",
            rating: "Puntuación: 9.2",
            liked: Some("Traducido del inglés|Great pool"),
            disliked: Some("Breakfast was cold"),
            date: "Comentó: 3 de mayo de 2024",
            traveler: "Pareja",
            author: "Ana",
            country: "Perú",
        }));
        let extractor = extractor();

        let title = extractor.title(&card).await.unwrap();
        assert_eq!(title, "Excelente ubicación");

        let record = extractor.extract_review(&card, title).await;
        assert_eq!(record.rating, "9.2");
        assert_eq!(record.liked_text, "Great pool");
        assert_eq!(record.disliked_text, "Breakfast was cold");
        assert_eq!(record.review_date, "Comentó: 3 de mayo de 2024");
        assert_eq!(record.traveler_type, "Pareja");
        assert_eq!(record.user_name, "Ana");
        assert_eq!(record.user_country, "Perú");
        assert!(
            chrono::NaiveDateTime::parse_from_str(&record.scraped_at, TIMESTAMP_FORMAT).is_ok()
        );
    }

    #[tokio::test]
    async fn test_missing_fields_default_to_empty() {
        let card = SnapshotCard::new(r#"<div data-testid="review-card"></div>"#);
        let extractor = extractor();

        assert_eq!(extractor.title(&card).await.unwrap(), "");
        let record = extractor.extract_review(&card, String::new()).await;
        assert_eq!(record.rating, "");
        assert_eq!(record.liked_text, "");
        assert_eq!(record.disliked_text, "");
        assert_eq!(record.user_name, "");
    }

    #[tokio::test]
    async fn test_invalid_selector_reads_as_empty() {
        let card = SnapshotCard::new("<div><p>text</p></div>");
        assert!(matches!(read_text(&card, "p[").await, FieldRead::Failed(_)));
        assert_eq!(safe_text(&card, "p[").await, "");
        assert_eq!(safe_text(&card, "p").await, "text");
    }
}
