//! Client-side core of the MedAI risk-prediction application: session and
//! authentication state, per-user persisted prediction history, last-result
//! cache, input validation, and the HTTP client for the remote prediction
//! service. The view layer consumes all of it through [`AppContext`].

pub mod assess;
pub mod auth;
pub mod config;
pub mod errors;
pub mod history;
pub mod prediction;
pub mod prefs;
pub mod results;
pub mod session;
pub mod state;
pub mod store;

pub use assess::AssessmentService;
pub use auth::{AuthProvider, AuthUser, StubAuthProvider};
pub use config::Config;
pub use errors::{AuthError, RequestError};
pub use history::{Disease, HistoryLog, HistoryStats, PredictionRecord, RiskLevel, SortOrder};
pub use prediction::{AssessmentInput, PredictionClient, PredictionResponse};
pub use prefs::Preferences;
pub use results::ResultCache;
pub use session::{
    AuthStage, Credentials, Provider, RegistrationData, SessionManager, SessionState, UserIdentity,
};
pub use state::{init_logging, AppContext};
pub use store::{FileStore, KeyValueStore, MemoryStore};
