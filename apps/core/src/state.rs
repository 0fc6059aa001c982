use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assess::AssessmentService;
use crate::auth::{AuthProvider, StubAuthProvider};
use crate::config::Config;
use crate::history::HistoryLog;
use crate::prediction::PredictionClient;
use crate::prefs::Preferences;
use crate::results::ResultCache;
use crate::session::SessionManager;
use crate::store::{FileStore, KeyValueStore, MemoryStore};

/// Explicitly constructed application context, passed by reference into the
/// view layer. Replaces the original's global singleton store: same
/// single-instance-per-process semantics, no hidden state.
pub struct AppContext {
    pub config: Config,
    pub session: Arc<SessionManager>,
    pub history: HistoryLog,
    pub results: Arc<ResultCache>,
    pub assessments: AssessmentService,
    pub prefs: Preferences,
}

impl AppContext {
    /// Wires all components over one store and one auth provider, then
    /// restores the persisted session (the once-at-startup read).
    pub fn new(
        config: Config,
        store: Arc<dyn KeyValueStore>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        let session = Arc::new(SessionManager::new(
            Arc::clone(&store),
            auth,
            config.min_password_len,
        ));
        let restored = session.restore_session();
        info!(
            "Session restored: authenticated={}",
            restored.is_authenticated
        );

        let history = HistoryLog::new(Arc::clone(&store));
        let results = Arc::new(ResultCache::new());
        let client = PredictionClient::new(config.api_base_url.clone(), config.request_timeout);
        let assessments =
            AssessmentService::new(client, Arc::clone(&results), history.clone());
        let prefs = Preferences::new(store);

        Self {
            config,
            session,
            history,
            results,
            assessments,
            prefs,
        }
    }

    /// Context from environment configuration: file-backed store when
    /// `MEDAI_STORAGE_PATH` is set, in-memory otherwise, and the local stub
    /// auth provider.
    pub fn from_env() -> Result<Self> {
        let config = Config::from_env()?;
        let store: Arc<dyn KeyValueStore> = match &config.storage_path {
            Some(path) => Arc::new(FileStore::open(path)),
            None => Arc::new(MemoryStore::new()),
        };
        Ok(Self::new(config, store, Arc::new(StubAuthProvider::new())))
    }
}

/// Initializes structured logging. `RUST_LOG` wins when set; otherwise the
/// crate logs at `default_level`.
pub fn init_logging(default_level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), default_level))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_context_restores_session_at_construction() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let first = AppContext::new(
            Config::default(),
            Arc::clone(&store),
            Arc::new(StubAuthProvider::new()),
        );
        first
            .session
            .login(&crate::session::Credentials {
                email: "alice@example.com".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap();

        let second = AppContext::new(
            Config::default(),
            store,
            Arc::new(StubAuthProvider::new()),
        );
        assert!(second.session.is_authenticated());
    }
}
