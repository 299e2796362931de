//! error types for meshscale-types

use thiserror::Error;

/// errors that can occur in meshscale-types
#[derive(Debug, Error)]
pub enum Error {
    /// network identifier is empty
    #[error("network id cannot be empty")]
    EmptyNetworkId,

    /// identifier could not be parsed
    #[error("invalid id: {0}")]
    InvalidId(String),
}
