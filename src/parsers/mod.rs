pub mod price;

pub use price::*;

use html_escape::decode_html_entities;
use scraper::{ElementRef, Selector};
use tracing::debug;

use crate::errors::ExtractError;

/// Clean and normalize text by removing extra whitespace and decoding HTML entities
pub fn clean_text(text: &str) -> String {
    let decoded = decode_html_entities(text);
    decoded
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn element_to_text(element: ElementRef) -> String {
    clean_text(&element.text().collect::<String>())
}

/// First descendant of `element` matching `query`.
pub fn select_first<'a>(element: ElementRef<'a>, query: &str) -> Result<ElementRef<'a>, ExtractError> {
    let selector =
        Selector::parse(query).map_err(|_| ExtractError::InvalidSelector(query.to_string()))?;

    let Some(found) = element.select(&selector).next() else {
        debug!("No element matches '{}' in <{}>", query, element.value().name());
        return Err(ExtractError::MissingElement(query.to_string()));
    };

    Ok(found)
}
