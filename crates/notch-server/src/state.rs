use notch_core::auth::{AdminCredentials, SessionSigner};
use notch_core::config::Config;
use notch_core::seed::seed_demo_order;
use notch_core::session::{MemorySessionStore, RedbSessionStore, SessionStore};
use notch_core::store::{open_store, OrderStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn OrderStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub credentials: Arc<AdminCredentials>,
    pub signer: Arc<SessionSigner>,
    pub session_ttl: Duration,
    pub public_dir: PathBuf,
}

impl AppState {
    /// Open the configured stores and seed the demonstration order.
    pub fn from_config(config: &Config) -> notch_core::Result<Self> {
        let store = open_store(config);
        let sessions: Arc<dyn SessionStore> = match &config.session_db {
            Some(path) => {
                tracing::info!(path = %path.display(), "persisting admin sessions");
                Arc::new(RedbSessionStore::open(path)?)
            }
            None => Arc::new(MemorySessionStore::new()),
        };
        seed_demo_order(store.as_ref())?;
        Ok(Self::with_stores(store, sessions, config))
    }

    /// Wire already-open stores. Does not seed.
    pub fn with_stores(
        store: Arc<dyn OrderStore>,
        sessions: Arc<dyn SessionStore>,
        config: &Config,
    ) -> Self {
        let state = Self {
            store,
            sessions,
            credentials: Arc::new(AdminCredentials::new(
                &config.admin_password,
                &config.session_secret,
            )),
            signer: Arc::new(SessionSigner::new(&config.session_secret)),
            session_ttl: config.session_ttl,
            public_dir: config.public_dir.clone(),
        };

        // Sweep expired sessions periodically; lookups already ignore them.
        // Guard: only spawn if inside a Tokio runtime (skipped in sync unit tests).
        if tokio::runtime::Handle::try_current().is_ok() {
            let sessions = state.sessions.clone();
            tokio::spawn(async move {
                loop {
                    tokio::time::sleep(SESSION_PURGE_INTERVAL).await;
                    let sessions = sessions.clone();
                    match tokio::task::spawn_blocking(move || sessions.purge_expired()).await {
                        Ok(Ok(0)) => {}
                        Ok(Ok(n)) => tracing::debug!(removed = n, "purged expired sessions"),
                        Ok(Err(e)) => tracing::warn!(error = %e, "session purge failed"),
                        Err(e) => tracing::warn!(error = %e, "session purge task failed"),
                    }
                }
            });
        }

        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notch_core::store::MemoryStore;

    #[test]
    fn with_stores_copies_settings() {
        let config = Config {
            public_dir: PathBuf::from("/srv/public"),
            session_ttl: Duration::from_secs(60),
            ..Config::default()
        };
        let state = AppState::with_stores(
            Arc::new(MemoryStore::new()),
            Arc::new(MemorySessionStore::new()),
            &config,
        );
        assert_eq!(state.public_dir, PathBuf::from("/srv/public"));
        assert_eq!(state.session_ttl, Duration::from_secs(60));
        assert!(state.credentials.verify(&config.admin_password));
    }

    #[test]
    fn from_config_seeds_demo_order() {
        let config = Config {
            memory_only: true,
            ..Config::default()
        };
        let state = AppState::from_config(&config).unwrap();
        let order = state.store.get(notch_core::seed::DEMO_ORDER_NO).unwrap();
        assert_eq!(order.total, 10);
    }
}
