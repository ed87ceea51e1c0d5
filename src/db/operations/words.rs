use std::collections::BTreeSet;
use std::sync::Arc;

use rand::Rng;
use sqlx::Row;

use crate::core::error::StoreError;
use crate::core::store::{WordId, WordRow, WordStore, SAMPLE_ATTEMPTS_PER_WORD};
use crate::db::DatabaseProxy;

/// Catalogue store over the `words` table.
#[derive(Clone)]
pub struct PgWordStore {
    proxy: Arc<DatabaseProxy>,
}

impl PgWordStore {
    pub fn new(proxy: Arc<DatabaseProxy>) -> Self {
        Self { proxy }
    }

    async fn max_word_id(&self) -> Result<Option<WordId>, StoreError> {
        sqlx::query_scalar(r#"SELECT MAX("id") FROM "words""#)
            .fetch_one(self.proxy.pool())
            .await
            .map_err(StoreError::Unavailable)
    }
}

impl WordStore for PgWordStore {
    /// Rejection sampling over `[1, max_id]`: the id space may be sparse
    /// after reseeding, so candidates are drawn at random and validated in
    /// batches until `n` distinct ids are collected or the attempt budget
    /// runs out.
    async fn sample(&self, n: usize) -> Result<Vec<WordId>, StoreError> {
        let available = self.count().await?;
        if available < n {
            return Err(StoreError::InsufficientCatalogue {
                needed: n,
                available,
            });
        }
        let max_id = match self.max_word_id().await? {
            Some(max_id) => max_id,
            None => {
                return Err(StoreError::InsufficientCatalogue {
                    needed: n,
                    available: 0,
                })
            }
        };

        let budget = SAMPLE_ATTEMPTS_PER_WORD * n as u32;
        let mut picked = BTreeSet::new();
        let mut attempts: u32 = 0;
        while picked.len() < n && attempts < budget {
            let batch: Vec<WordId> = {
                let mut rng = rand::rng();
                (0..n - picked.len())
                    .map(|_| rng.random_range(1..=max_id))
                    .collect()
            };
            attempts += batch.len() as u32;

            let rows = sqlx::query(r#"SELECT "id" FROM "words" WHERE "id" = ANY($1)"#)
                .bind(&batch)
                .fetch_all(self.proxy.pool())
                .await
                .map_err(StoreError::Unavailable)?;
            for row in rows {
                let id: WordId = row.try_get("id").map_err(StoreError::Unavailable)?;
                picked.insert(id);
            }
        }

        if picked.len() < n {
            return Err(StoreError::SamplingExhausted { attempts });
        }
        Ok(picked.into_iter().collect())
    }

    async fn lookup(&self, ids: &[WordId]) -> Result<Vec<WordRow>, StoreError> {
        let rows = sqlx::query(
            r#"SELECT "id", "source_text", "target_text" FROM "words" WHERE "id" = ANY($1)"#,
        )
        .bind(ids)
        .fetch_all(self.proxy.pool())
        .await
        .map_err(StoreError::Unavailable)?;

        let mut words = Vec::with_capacity(rows.len());
        for row in rows {
            words.push(WordRow {
                id: row.try_get("id").map_err(StoreError::Unavailable)?,
                source_text: row.try_get("source_text").map_err(StoreError::Unavailable)?,
                target_text: row.try_get("target_text").map_err(StoreError::Unavailable)?,
            });
        }
        Ok(words)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "words""#)
            .fetch_one(self.proxy.pool())
            .await
            .map_err(StoreError::Unavailable)?;
        Ok(count as usize)
    }
}
