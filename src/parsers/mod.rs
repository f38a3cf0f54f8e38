//! Text shaping applied to values read from the page.
//!
//! `text` holds the per-field rules, `html` turns static markup into the
//! same rendered text a browser would report for an element.

pub mod html;
pub mod text;

#[cfg(test)]
mod tests;

pub use text::{comment_text, rating_text};
