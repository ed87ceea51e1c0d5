use thiserror::Error;

use crate::core::store::{UserId, WordId};

/// Failures raised by the backing stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not enough words to sample from: need {needed}, have {available}")]
    InsufficientCatalogue { needed: usize, available: usize },

    #[error("random sampling gave up after {attempts} attempts")]
    SamplingExhausted { attempts: u32 },

    #[error("word {word_id} is already saved for user {user_id}")]
    DuplicateEntry { user_id: UserId, word_id: WordId },

    #[error("backing store unavailable")]
    Unavailable(#[source] sqlx::Error),
}

/// Failures raised while building the next quiz.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("catalogue too small for a quiz: only {available} words")]
    CatalogueTooSmall { available: usize },

    #[error("deck too small: {needed} more words required")]
    DeckTooSmall { needed: usize },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures surfaced to the transport for a single inbound event.
///
/// Everything here is recoverable at the session level; the session itself
/// is never torn down.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("no active quiz in this session")]
    NoActiveQuiz,

    #[error("event has no handler in the current session state")]
    UnhandledEvent,

    #[error(transparent)]
    Store(#[from] StoreError),
}
