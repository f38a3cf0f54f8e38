use crate::browser::{BrowserError, Card, Page};
use crate::results::ScrapeSession;
use crate::scrapers::Extractor;
use std::time::Duration;
use thiserror::Error;

/// Reasons a page yields no reviews at all
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("no review cards appeared on the page")]
    NoCards,

    #[error(transparent)]
    Browser(#[from] BrowserError),
}

/// Harvests every review card on the currently loaded page into `session`.
///
/// Waits up to `timeout` for the first card to appear. Returns the number of
/// records added.
pub async fn harvest_page<P: Page>(
    page: &mut P,
    extractor: &Extractor,
    timeout: Duration,
    session: &mut ScrapeSession,
) -> Result<usize, HarvestError> {
    let card_selector = &extractor.schema().review_card;

    ::log::info!("Looking for review cards on the current page");
    match page.wait_for(card_selector, timeout).await {
        Ok(()) => {}
        Err(BrowserError::Timeout(_)) | Err(BrowserError::NotFound(_)) => {
            return Err(HarvestError::NoCards);
        }
        Err(e) => return Err(e.into()),
    }

    let cards = page.cards(card_selector).await?;
    ::log::info!("Found {} review cards", cards.len());

    let added = harvest_cards(&cards, extractor, session).await;
    ::log::info!("{} new reviews added, total: {}", added, session.len());
    Ok(added)
}

/// Extracts each card in order, skipping repeats and unreadable cards
pub async fn harvest_cards<C: Card>(
    cards: &[C],
    extractor: &Extractor,
    session: &mut ScrapeSession,
) -> usize {
    let mut added = 0;

    for (index, card) in cards.iter().enumerate() {
        let title = match extractor.title(card).await {
            Ok(title) => title,
            Err(e) => {
                ::log::warn!("Skipping review card {}: {}", index, e);
                continue;
            }
        };

        // A known title means the rest of the card is never read
        if session.has_title(&title) {
            ::log::trace!("Already have review: {}", title);
            continue;
        }

        let record = extractor.extract_review(card, title).await;
        if session.insert(record) {
            added += 1;
        }
    }

    added
}
