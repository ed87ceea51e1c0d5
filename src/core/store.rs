use std::future::Future;

use crate::core::error::StoreError;

pub type WordId = i32;
pub type UserId = i64;

/// Retry budget for rejection sampling over a sparse id space, per
/// requested word.
pub const SAMPLE_ATTEMPTS_PER_WORD: u32 = 50;

/// One catalogue row as the quiz engine sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordRow {
    pub id: WordId,
    pub source_text: String,
    pub target_text: String,
}

/// The global vocabulary catalogue.
pub trait WordStore: Send + Sync {
    /// Draws `n` distinct word ids uniformly at random from the catalogue.
    fn sample(&self, n: usize) -> impl Future<Output = Result<Vec<WordId>, StoreError>> + Send;

    /// Resolves an id set to rows. Row order is unspecified; callers
    /// re-associate by id.
    fn lookup(&self, ids: &[WordId]) -> impl Future<Output = Result<Vec<WordRow>, StoreError>> + Send;

    fn count(&self) -> impl Future<Output = Result<usize, StoreError>> + Send;
}

/// A user's personal subset of saved word ids.
pub trait DeckStore: Send + Sync {
    /// Like [`WordStore::sample`], restricted to the user's deck.
    fn sample_from_deck(
        &self,
        user_id: UserId,
        n: usize,
    ) -> impl Future<Output = Result<Vec<WordId>, StoreError>> + Send;

    /// Saves a word. Signals [`StoreError::DuplicateEntry`] for an existing
    /// pair; callers treat that as non-fatal.
    fn add(
        &self,
        user_id: UserId,
        word_id: WordId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Removes a word. Removing an absent pair is not an error.
    fn remove(
        &self,
        user_id: UserId,
        word_id: WordId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn size(&self, user_id: UserId) -> impl Future<Output = Result<usize, StoreError>> + Send;
}

/// User accounts, created once on first contact.
pub trait IdentityStore: Send + Sync {
    fn is_known(&self, user_id: UserId) -> impl Future<Output = Result<bool, StoreError>> + Send;

    fn register(
        &self,
        user_id: UserId,
        display_name: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
