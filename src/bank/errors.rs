//! Errors raised while assembling an item bank.
use thiserror::Error;

use crate::{bank::item::ItemId, irt::ParamError};

/// Result alias for bank construction.
pub type BankResult<T> = Result<T, BankError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BankError {
    /// Two items share one identifier.
    #[error("Duplicate item id {id}")]
    DuplicateItem { id: ItemId },

    /// An item definition failed validation.
    #[error("Invalid {id}: {source}")]
    InvalidItem { id: ItemId, source: ParamError },

    /// The TOML document could not be parsed.
    #[error("Failed to parse item bank: {text}")]
    Parse { text: String },
}
