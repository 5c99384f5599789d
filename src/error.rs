//! Errors surfaced to the platform layer.
//!
//! Internals use `anyhow`; everything crossing `tracker`, `storage` or
//! `api` is mapped to [`Error`] so callers can tell a refused save from a
//! broken database. Nothing here is fatal and nothing is retried.

use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// The user has not granted location access.
    PermissionDenied,
    /// Location hardware or service is unavailable.
    LocationUnavailable,
    /// `save` was called with no accepted fixes. Nothing was written.
    EmptyTrack,
    /// The backend failed to commit. Nothing was written.
    StoreWrite(anyhow::Error),
    StoreRead(anyhow::Error),
    NotInitialized,
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::PermissionDenied => write!(f, "Location permission denied"),
            Error::LocationUnavailable => write!(f, "Location service unavailable"),
            Error::EmptyTrack => write!(f, "Track has no points to save"),
            Error::StoreWrite(error) => write!(f, "Failed to write route store: {:#}", error),
            Error::StoreRead(error) => write!(f, "Failed to read route store: {:#}", error),
            Error::NotInitialized => write!(f, "Main state is not initialized"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// True for the faults the caller should answer by asking the user for
    /// location access and calling `start` again.
    pub fn is_capability_fault(&self) -> bool {
        matches!(self, Error::PermissionDenied | Error::LocationUnavailable)
    }
}
