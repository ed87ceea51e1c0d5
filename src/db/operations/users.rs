use std::sync::Arc;

use crate::core::error::StoreError;
use crate::core::store::{IdentityStore, UserId};
use crate::db::DatabaseProxy;

/// Account store over the `users` table.
#[derive(Clone)]
pub struct PgIdentityStore {
    proxy: Arc<DatabaseProxy>,
}

impl PgIdentityStore {
    pub fn new(proxy: Arc<DatabaseProxy>) -> Self {
        Self { proxy }
    }
}

impl IdentityStore for PgIdentityStore {
    async fn is_known(&self, user_id: UserId) -> Result<bool, StoreError> {
        sqlx::query_scalar(r#"SELECT EXISTS(SELECT 1 FROM "users" WHERE "user_id" = $1)"#)
            .bind(user_id)
            .fetch_one(self.proxy.pool())
            .await
            .map_err(StoreError::Unavailable)
    }

    /// Racing first events for the same user may both try to register;
    /// the conflict clause keeps that idempotent.
    async fn register(&self, user_id: UserId, display_name: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO "users" ("user_id", "display_name")
            VALUES ($1, $2)
            ON CONFLICT ("user_id") DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(display_name)
        .execute(self.proxy.pool())
        .await
        .map_err(StoreError::Unavailable)?;
        Ok(())
    }
}
