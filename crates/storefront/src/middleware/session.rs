//! Session middleware configuration.
//!
//! Sessions live in process memory and only hold the cart ID, so losing them
//! on restart just starts a new cart. The store is a bounded `moka` cache
//! that drops sessions once they go idle for the cookie lifetime.

use std::time::Duration;

use async_trait::async_trait;
use moka::sync::Cache;
use tower_sessions::cookie::time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, SessionStore};
use tower_sessions::{Expiry, SessionManagerLayer};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "iradah_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Upper bound on live sessions.
const MAX_SESSIONS: u64 = 100_000;

/// In-memory session store with a capacity bound and idle expiry.
#[derive(Debug, Clone)]
pub struct SessionCache {
    records: Cache<Id, Record>,
}

impl SessionCache {
    #[must_use]
    pub fn new(max_sessions: u64, idle_timeout: Duration) -> Self {
        Self {
            records: Cache::builder()
                .max_capacity(max_sessions)
                .time_to_idle(idle_timeout)
                .build(),
        }
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new(
            MAX_SESSIONS,
            Duration::from_secs(SESSION_EXPIRY_SECONDS.unsigned_abs()),
        )
    }
}

#[async_trait]
impl SessionStore for SessionCache {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        while self.records.contains_key(&record.id) {
            record.id = Id::default();
        }
        self.records.insert(record.id, record.clone());
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.records.insert(record.id, record.clone());
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        Ok(self
            .records
            .get(session_id)
            .filter(|record| record.expiry_date > OffsetDateTime::now_utc()))
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.records.invalidate(session_id);
        Ok(())
    }
}

/// Create the session layer backed by a [`SessionCache`].
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<SessionCache> {
    SessionManagerLayer::new(SessionCache::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.secure_cookies())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn record(expires_in: i64) -> Record {
        Record {
            id: Id::default(),
            data: HashMap::new(),
            expiry_date: OffsetDateTime::now_utc()
                + tower_sessions::cookie::time::Duration::seconds(expires_in),
        }
    }

    #[tokio::test]
    async fn test_save_load_delete() {
        let store = SessionCache::default();
        let mut rec = record(60);
        rec.data
            .insert("cart_id".to_string(), serde_json::json!("abc"));

        store.create(&mut rec).await.unwrap();
        let loaded = store.load(&rec.id).await.unwrap().unwrap();
        assert_eq!(loaded.data["cart_id"], "abc");

        store.delete(&rec.id).await.unwrap();
        assert!(store.load(&rec.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_avoids_id_collision() {
        let store = SessionCache::default();
        let mut first = record(60);
        store.create(&mut first).await.unwrap();

        let mut second = record(60);
        second.id = first.id;
        store.create(&mut second).await.unwrap();

        assert_ne!(first.id, second.id);
        assert!(store.load(&first.id).await.unwrap().is_some());
        assert!(store.load(&second.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_expired_record_is_not_loaded() {
        let store = SessionCache::default();
        let rec = record(-1);
        store.save(&rec).await.unwrap();

        assert!(store.load(&rec.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_capacity_is_bounded() {
        let store = SessionCache::new(10, Duration::from_secs(60));
        for _ in 0..200 {
            store.save(&record(60)).await.unwrap();
        }
        store.records.run_pending_tasks();

        assert!(store.records.entry_count() <= 10);
    }

    #[tokio::test]
    async fn test_idle_sessions_expire() {
        let store = SessionCache::new(10, Duration::from_millis(50));
        let rec = record(60);
        store.save(&rec).await.unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(store.load(&rec.id).await.unwrap().is_none());
    }
}
