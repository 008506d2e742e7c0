use std::time::Duration;

use ootd_core::UserId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model not configured: {0}")]
    NotConfigured(String),

    #[error("Model request failed: {0}")]
    Transport(String),

    #[error("Model returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Could not decode model response: {0}")]
    Decode(String),

    #[error("Model returned an empty reply")]
    EmptyReply,
}

/// Why a suggestion request produced no options.
///
/// `EmptyWardrobe` is the only "nothing to suggest" outcome; everything else
/// is a server-side failure and the caller gets no partial result.
#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("No garments in wardrobe for user {0}")]
    EmptyWardrobe(UserId),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Model call timed out after {0:?}")]
    Timeout(Duration),
}

impl SuggestError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SuggestError::EmptyWardrobe(_))
    }
}
