use scraper::{ElementRef, Html};
use tracing::warn;

use crate::errors::ExtractError;
use crate::models::{Site, SENTINEL_PRICE};
use crate::parsers::{element_to_text, parse_money, select_first};

mod amazon;
mod dungeondice;
mod feltrinelli;

pub use amazon::AmazonExtractor;
pub use dungeondice::DungeonDiceExtractor;
pub use feltrinelli::FeltrinelliExtractor;

/// Where a site renders its price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorRule {
    /// First element matching the selector anywhere in the page.
    Single(&'static str),
    /// First `price` element inside the first `container` element.
    Nested {
        container: &'static str,
        price: &'static str,
    },
}

impl SelectorRule {
    pub fn locate<'a>(&self, document: &'a Html) -> Result<ElementRef<'a>, ExtractError> {
        let root = document.root_element();
        match self {
            SelectorRule::Single(selector) => select_first(root, selector),
            SelectorRule::Nested { container, price } => {
                let container = select_first(root, container)?;
                select_first(container, price)
            }
        }
    }
}

pub trait PriceExtractor: Send + Sync {
    fn site(&self) -> Site;
    fn rule(&self) -> SelectorRule;

    /// Price displayed in `html`, or why it could not be read.
    ///
    /// An empty page is not an error: it means the product is not tracked on
    /// this site and yields the sentinel price.
    fn try_extract(&self, html: &str) -> Result<f64, ExtractError> {
        if html.is_empty() {
            return Ok(SENTINEL_PRICE);
        }

        let document = Html::parse_document(html);
        let element = self.rule().locate(&document)?;
        let text = element_to_text(element);

        parse_money(&text).ok_or(ExtractError::InvalidPrice(text))
    }

    /// Like [`PriceExtractor::try_extract`], with every failure downgraded to
    /// the sentinel price.
    fn extract(&self, html: &str) -> f64 {
        match self.try_extract(html) {
            Ok(price) => price,
            Err(e) => {
                warn!("{}: {}, recording {}", self.site(), e, SENTINEL_PRICE);
                SENTINEL_PRICE
            }
        }
    }
}

pub fn extractor_for(site: Site) -> Box<dyn PriceExtractor> {
    match site {
        Site::Amazon => Box::new(AmazonExtractor),
        Site::DungeonDice => Box::new(DungeonDiceExtractor),
        Site::Feltrinelli => Box::new(FeltrinelliExtractor),
    }
}

/// One extractor per known site, in site order.
pub fn all_extractors() -> Vec<Box<dyn PriceExtractor>> {
    Site::ALL.iter().map(|site| extractor_for(*site)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_page_is_sentinel_for_every_site() {
        for extractor in all_extractors() {
            assert_eq!(extractor.try_extract(""), Ok(0.0));
            assert_eq!(extractor.extract(""), 0.0);
        }
    }

    #[test]
    fn redesigned_page_is_sentinel_for_every_site() {
        let html = "<html><body><div class=\"new-layout\">19,99 €</div></body></html>";
        for extractor in all_extractors() {
            assert!(matches!(
                extractor.try_extract(html),
                Err(ExtractError::MissingElement(_))
            ));
            assert_eq!(extractor.extract(html), 0.0);
        }
    }

    #[test]
    fn space_grouped_prices_keep_thousands() {
        let feltrinelli = r#"<div class="cc-buy-box"><span class="cc-price">1&nbsp;299,00&nbsp;€</span></div>"#;
        assert_eq!(FeltrinelliExtractor.extract(feltrinelli), 1299.0);

        let amazon = "<span class=\"a-offscreen\">1\u{202f}299,00\u{a0}€</span>";
        assert_eq!(AmazonExtractor.extract(amazon), 1299.0);

        let dungeondice = r#"<span class="display-price">€ 2 450,50</span>"#;
        assert_eq!(DungeonDiceExtractor.extract(dungeondice), 2450.5);
    }

    #[test]
    fn extractors_follow_site_order() {
        let sites: Vec<Site> = all_extractors().iter().map(|e| e.site()).collect();
        assert_eq!(sites, Site::ALL.to_vec());
    }

    #[test]
    fn nested_rule_requires_container() {
        let rule = SelectorRule::Nested {
            container: ".box",
            price: ".price",
        };
        let doc = Html::parse_document(r#"<span class="price">9,00</span>"#);
        assert_eq!(
            rule.locate(&doc).unwrap_err(),
            ExtractError::MissingElement(".box".to_string())
        );
    }
}
