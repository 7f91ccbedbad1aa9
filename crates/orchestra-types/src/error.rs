use thiserror::Error;

/// Errors in the region/product input supplied at the process boundary.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("region must not be empty")]
    MissingRegion,

    #[error("product must not be empty")]
    MissingProduct,

    #[error("failed to read input file '{path}': {reason}")]
    Unreadable { path: String, reason: String },

    #[error("input is not valid JSON: {0}")]
    Malformed(String),
}
