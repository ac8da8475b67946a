use crate::models::Site;
use crate::scrapers::{PriceExtractor, SelectorRule};

/// Amazon renders the buy-box price in a visually hidden `.a-offscreen` span.
pub struct AmazonExtractor;

impl PriceExtractor for AmazonExtractor {
    fn site(&self) -> Site {
        Site::Amazon
    }

    fn rule(&self) -> SelectorRule {
        SelectorRule::Single(".a-offscreen")
    }
}
