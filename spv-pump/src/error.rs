//! Top-level error type for pump operations.
//!
//! Each failure class is its own variant so callers can branch on the
//! kind of failure. Note that an unconfirmed set command is not an error:
//! those operations return `Ok(false)`.

use reqwest::StatusCode;
use thiserror::Error;

use crate::client::TransportError;
use crate::params::ValidationError;
use crate::types::DecodeError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The pump could not be reached or the exchange broke down.
    #[error("Connectivity error: {0}")]
    Connectivity(#[from] TransportError),

    /// A value was rejected locally; nothing was sent.
    #[error("Invalid parameter: {0}")]
    Validation(#[from] ValidationError),

    /// The pump answered, but not in the expected shape.
    #[error("Unexpected payload: {0}")]
    Decode(#[from] DecodeError),

    /// A read was answered with something other than 200 OK.
    #[error("Pump returned HTTP {0}")]
    Status(StatusCode),
}
