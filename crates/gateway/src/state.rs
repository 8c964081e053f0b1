use std::sync::Arc;

use ne_domain::config::Config;
use ne_providers::registry::ProviderRegistry;
use ne_sessions::SessionStore;

use crate::runtime::session_lock::SessionLockMap;

/// Shared application state passed to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub llm: Arc<ProviderRegistry>,
    pub sessions: Arc<SessionStore>,
    pub session_locks: Arc<SessionLockMap>,
}
