use crate::models::Site;
use crate::scrapers::{PriceExtractor, SelectorRule};

pub struct DungeonDiceExtractor;

impl PriceExtractor for DungeonDiceExtractor {
    fn site(&self) -> Site {
        Site::DungeonDice
    }

    fn rule(&self) -> SelectorRule {
        SelectorRule::Single(".display-price")
    }
}
