use crate::models::Site;
use crate::scrapers::{PriceExtractor, SelectorRule};

/// Feltrinelli pages repeat `.cc-price` in carousels and related items; only
/// the one inside the buy box belongs to the product.
pub struct FeltrinelliExtractor;

impl PriceExtractor for FeltrinelliExtractor {
    fn site(&self) -> Site {
        Site::Feltrinelli
    }

    fn rule(&self) -> SelectorRule {
        SelectorRule::Nested {
            container: ".cc-buy-box",
            price: ".cc-price",
        }
    }
}
