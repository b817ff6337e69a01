//! Error types for the engine, the game loop, and configuration loading.

use std::path::PathBuf;

use crate::types::{OrderId, Symbol};

/// All errors that can occur while building or running a game.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The order could not be constructed (zero size, negative price,
    /// misaligned or out-of-bounds price).
    #[error("invalid order: {0}")]
    InvalidOrder(String),

    /// An order id was submitted twice. Ids are single-use for the whole run.
    #[error("order id {0} has already been submitted")]
    DuplicateOrderId(OrderId),

    /// The ticker is not part of the product catalog.
    #[error("unknown ticker {0}")]
    UnknownTicker(Symbol),

    /// A conversion was requested for a product without a conversion schedule.
    #[error("product {0} has no conversion schedule")]
    NotConvertible(Symbol),

    /// The product or game configuration is invalid.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("export error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
