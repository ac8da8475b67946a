pub mod product;
pub mod site;

pub use product::*;
pub use site::*;

/// Price recorded when no price could be determined for a site.
pub const SENTINEL_PRICE: f64 = 0.0;

pub const EMOJI_DICE: &str = "🎲";
