use thiserror::Error;

use crate::{ConfigError, StoreError};

/// Errors raised while setting up a handler.
///
/// Request handling itself never returns this type. Failures during a
/// request are recovered into a [`PageStatus`](crate::PageStatus).
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration was missing or malformed.
    #[error("configuration error")]
    Config(#[from] ConfigError),

    /// The store could not be prepared.
    #[error("store setup failed")]
    Store(#[from] StoreError),
}
