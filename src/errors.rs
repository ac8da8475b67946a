use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ExtractError {
    #[error("Invalid selector {0}")]
    InvalidSelector(String),
    #[error("Missing element {0} from HTML")]
    MissingElement(String),
    #[error("Failed to parse price from text: {0}")]
    InvalidPrice(String),
}
