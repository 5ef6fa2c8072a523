use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("Rule already exists: \"{pattern}\" -> {category}")]
    DuplicateRule { pattern: String, category: String },
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),
    #[error("Unknown card: {0}")]
    UnknownCard(String),
}
