use std::io;

use thiserror::Error;

/// An error to do with data collection.
#[derive(Debug, Error)]
pub enum CollectionError {
    /// A general error to propagate back up. A wrapper around [`anyhow::Error`].
    #[error(transparent)]
    General(#[from] anyhow::Error),

    /// The thing we asked about (usually a path) is gone.
    #[error("'{0}' was not found")]
    NotFound(String),
}

impl CollectionError {
    pub(crate) fn from_str(msg: &'static str) -> Self {
        Self::General(anyhow::anyhow!(msg))
    }

    /// Returns whether this is a missing-path condition rather than a real failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CollectionError::NotFound(_))
    }
}

impl From<io::Error> for CollectionError {
    fn from(err: io::Error) -> Self {
        CollectionError::General(err.into())
    }
}

/// A [`Result`] with the error type being a [`CollectionError`].
pub type CollectionResult<T> = Result<T, CollectionError>;
