use std::sync::Arc;
use std::time::Instant;

use crate::core::controller::SessionController;
use crate::db::operations::{PgDeckStore, PgIdentityStore, PgWordStore};
use crate::db::DatabaseProxy;

pub type PgSessionController = SessionController<PgWordStore, PgDeckStore, PgIdentityStore>;

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    db_proxy: Option<Arc<DatabaseProxy>>,
    controller: Option<Arc<PgSessionController>>,
}

impl AppState {
    /// Without a database the service still starts; event handling answers
    /// 503 until connectivity is restored by a restart.
    pub fn new(db_proxy: Option<Arc<DatabaseProxy>>) -> Self {
        let controller = db_proxy.as_ref().map(|proxy| {
            Arc::new(SessionController::new(
                PgWordStore::new(Arc::clone(proxy)),
                PgDeckStore::new(Arc::clone(proxy)),
                PgIdentityStore::new(Arc::clone(proxy)),
            ))
        });

        Self {
            started_at: Instant::now(),
            db_proxy,
            controller,
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn db_proxy(&self) -> Option<Arc<DatabaseProxy>> {
        self.db_proxy.clone()
    }

    pub fn controller(&self) -> Option<Arc<PgSessionController>> {
        self.controller.clone()
    }
}
