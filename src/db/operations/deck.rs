use std::sync::Arc;

use rand::seq::IndexedRandom;

use crate::core::error::StoreError;
use crate::core::store::{DeckStore, UserId, WordId};
use crate::db::DatabaseProxy;

/// Per-user saved-word store over the `user_words` relation.
#[derive(Clone)]
pub struct PgDeckStore {
    proxy: Arc<DatabaseProxy>,
}

impl PgDeckStore {
    pub fn new(proxy: Arc<DatabaseProxy>) -> Self {
        Self { proxy }
    }

    async fn deck_ids(&self, user_id: UserId) -> Result<Vec<WordId>, StoreError> {
        sqlx::query_scalar(r#"SELECT "word_id" FROM "user_words" WHERE "user_id" = $1"#)
            .bind(user_id)
            .fetch_all(self.proxy.pool())
            .await
            .map_err(StoreError::Unavailable)
    }
}

impl DeckStore for PgDeckStore {
    /// The deck id set is small enough to fetch whole; sampling happens in
    /// memory without replacement, so it always terminates.
    async fn sample_from_deck(&self, user_id: UserId, n: usize) -> Result<Vec<WordId>, StoreError> {
        let ids = self.deck_ids(user_id).await?;
        if ids.len() < n {
            return Err(StoreError::InsufficientCatalogue {
                needed: n,
                available: ids.len(),
            });
        }
        let mut rng = rand::rng();
        Ok(ids.choose_multiple(&mut rng, n).copied().collect())
    }

    async fn add(&self, user_id: UserId, word_id: WordId) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"INSERT INTO "user_words" ("user_id", "word_id") VALUES ($1, $2)"#,
        )
        .bind(user_id)
        .bind(word_id)
        .execute(self.proxy.pool())
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) => {
                let duplicate = err
                    .as_database_error()
                    .is_some_and(|db_err| db_err.is_unique_violation());
                if duplicate {
                    Err(StoreError::DuplicateEntry { user_id, word_id })
                } else {
                    Err(StoreError::Unavailable(err))
                }
            }
        }
    }

    async fn remove(&self, user_id: UserId, word_id: WordId) -> Result<(), StoreError> {
        sqlx::query(r#"DELETE FROM "user_words" WHERE "user_id" = $1 AND "word_id" = $2"#)
            .bind(user_id)
            .bind(word_id)
            .execute(self.proxy.pool())
            .await
            .map_err(StoreError::Unavailable)?;
        Ok(())
    }

    async fn size(&self, user_id: UserId) -> Result<usize, StoreError> {
        let count: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM "user_words" WHERE "user_id" = $1"#)
                .bind(user_id)
                .fetch_one(self.proxy.pool())
                .await
                .map_err(StoreError::Unavailable)?;
        Ok(count as usize)
    }
}
