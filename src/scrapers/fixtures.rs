//! Saved-page markup shaped like the live review pages, for tests.

use crate::browser::SnapshotLauncher;
use crate::schema::PageSchema;

pub const HOTEL_URL: &str = "https://www.booking.com/hotel/pe/casa-andina.es.html";

/// Field values of one rendered review card
#[derive(Debug, Clone, Copy)]
pub struct Review {
    pub title: &'static str,
    pub rating: &'static str,
    /// Lines separated by `|`
    pub liked: Option<&'static str>,
    pub disliked: Option<&'static str>,
    pub date: &'static str,
    pub traveler: &'static str,
    pub author: &'static str,
    pub country: &'static str,
}

pub fn review(title: &'static str, author: &'static str) -> Review {
    Review {
        title,
        rating: "Puntuación: 8.0",
        liked: Some("Todo muy bien"),
        disliked: None,
        date: "Comentó: 1 de mayo de 2024",
        traveler: "Familia",
        author,
        country: "Chile",
    }
}

fn comment_block(testid: &str, text: Option<&str>) -> String {
    match text {
        Some(text) => {
            let lines: String = text.split('|').map(|l| format!("<div>{l}</div>")).collect();
            format!(r#"<div data-testid="{testid}">{lines}</div>"#)
        }
        None => String::new(),
    }
}

/// Markup of one review card
pub fn card(review: &Review) -> String {
    let title = if review.title.is_empty() {
        String::new()
    } else {
        format!(r#"<h4 data-testid="review-title">{}</h4>"#, review.title)
    };
    format!(
        r#"<div data-testid="review-card">
            <div class="b08850ce41">{author}</div>
            <span class="d838fb5f41">{country}</span>
            <span data-testid="review-traveler-type">{traveler}</span>
            <span data-testid="review-date">{date}</span>
            {title}
            <div data-testid="review-score"><div class="bc946a29db">{rating}</div></div>
            {liked}
            {disliked}
        </div>"#,
        author = review.author,
        country = review.country,
        traveler = review.traveler,
        date = review.date,
        rating = review.rating,
        liked = comment_block("review-positive-text", review.liked),
        disliked = comment_block("review-negative-text", review.disliked),
    )
}

/// A full reviews page with the usual controls.
///
/// `next` is `Some(enabled)` to render the next-page button, `None` to leave
/// it out.
pub fn listing(reviews: &[Review], next: Option<bool>) -> String {
    let cards: String = reviews.iter().map(card).collect();
    let next = match next {
        Some(true) => r#"<button aria-label="Página siguiente">›</button>"#,
        Some(false) => r#"<button aria-label="Página siguiente" disabled>›</button>"#,
        None => "",
    };
    format!(
        r#"<html><body>
        <div id="onetrust-banner"><button id="onetrust-accept-btn-handler">Aceptar</button></div>
        <button data-testid="fr-read-all-reviews">Leer todos los comentarios</button>
        <button data-testid="sorters-dropdown-trigger">Ordenar</button>
        <button data-testid="sorters-dropdown-option-NEWEST_FIRST">Más recientes</button>
        {cards}
        {next}
        </body></html>"#
    )
}

/// Launcher serving `pages` at [`HOTEL_URL`]
pub fn launcher(pages: Vec<String>) -> SnapshotLauncher {
    SnapshotLauncher::new(PageSchema::default().next_page).with_site(HOTEL_URL, pages)
}
