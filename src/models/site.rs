use serde::{Deserialize, Serialize};
use std::fmt;

/// Retail sites with a known price extraction rule.
///
/// Declaration order is the fixed column order used for snapshots,
/// history files and report tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Site {
    Amazon,
    DungeonDice,
    Feltrinelli,
}

impl Site {
    pub const ALL: [Site; 3] = [Site::Amazon, Site::DungeonDice, Site::Feltrinelli];

    /// Column name in the product registry.
    pub fn key(&self) -> &'static str {
        match self {
            Site::Amazon => "amazon",
            Site::DungeonDice => "dungeondice",
            Site::Feltrinelli => "feltrinelli",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "amazon" => Some(Site::Amazon),
            "dungeondice" => Some(Site::DungeonDice),
            "feltrinelli" => Some(Site::Feltrinelli),
            _ => None,
        }
    }

    /// Header used in rendered tables.
    pub fn display_name(&self) -> &'static str {
        match self {
            Site::Amazon => "Amazon",
            Site::DungeonDice => "DungeonDice",
            Site::Feltrinelli => "Feltrinelli",
        }
    }

    /// Column name in the price history file.
    pub fn price_column(&self) -> String {
        format!("{}_price", self.key())
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip() {
        for site in Site::ALL {
            assert_eq!(Site::from_key(site.key()), Some(site));
        }
        assert_eq!(Site::from_key("ebay"), None);
    }

    #[test]
    fn order_is_stable() {
        let mut sites = vec![Site::Feltrinelli, Site::Amazon, Site::DungeonDice];
        sites.sort();
        assert_eq!(sites, Site::ALL.to_vec());
    }

    #[test]
    fn price_columns() {
        assert_eq!(Site::DungeonDice.price_column(), "dungeondice_price");
    }
}
