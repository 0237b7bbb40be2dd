//! Client configuration structures and loaders.
use std::env;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use battle_core::ActorId;
use battle_runtime::SessionConfig;
use client_transport::{HttpConfig, RetryPolicy};

/// Everything needed to reach the server and run one battle session.
#[derive(Clone, Debug, Default)]
pub struct ClientConfig {
    pub http: HttpConfig,
    pub retry: RetryPolicy,
    pub session: SessionConfig,
    pub session_id: Option<String>,
    pub log_dir: Option<PathBuf>,
}

impl ClientConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BATTLE_SERVER_URL` - Server root (default: `http://localhost:8000`)
    /// - `BATTLE_LOCAL_ACTOR` - Actor controlled by this client (default: `P1`)
    /// - `BATTLE_BASIC_ABILITY` - Ability sent to the attack endpoint (default: `Physical`)
    /// - `BATTLE_MAX_RETRIES` - Retries after a connection failure (default: 5)
    /// - `BATTLE_RETRY_DELAY_MS` - Delay between retries (default: 1000)
    /// - `BATTLE_REQUEST_TIMEOUT_MS` - Per-attempt timeout (default: 10000)
    /// - `BATTLE_POLL_INTERVAL_MS` - Poll period during the opponent's turn (default: 1000)
    /// - `BATTLE_REPLAY_PAUSE_MS` - Pause around replayed actions (default: 500)
    /// - `BATTLE_MOVE_TIMEOUT_MS` - Wait bound for a replayed move (default: 2000)
    /// - `BATTLE_MIN_ACTION_POINTS` - Auto end-turn threshold (default: 1)
    /// - `BATTLE_SESSION_ID` - Session identifier for logs (default: timestamp)
    /// - `BATTLE_LOG_DIR` - Log directory (default: platform cache dir)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let text = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let millis = |key: &str| {
            text(key)
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_millis)
        };

        let mut config = Self::default();

        if let Some(url) = text("BATTLE_SERVER_URL") {
            config.http.base_url = url;
        }
        if let Some(timeout) = millis("BATTLE_REQUEST_TIMEOUT_MS") {
            config.http.timeout = timeout;
        }

        if let Some(retries) = text("BATTLE_MAX_RETRIES").and_then(|v| v.parse().ok()) {
            config.retry.max_retries = retries;
        }
        if let Some(delay) = millis("BATTLE_RETRY_DELAY_MS") {
            config.retry.delay = delay;
        }

        let session = &mut config.session;
        if let Some(actor) = text("BATTLE_LOCAL_ACTOR") {
            session.local_actor = ActorId::from(actor);
        }
        if let Some(ability) = text("BATTLE_BASIC_ABILITY") {
            session.basic_ability_id = ability;
        }
        if let Some(poll) = millis("BATTLE_POLL_INTERVAL_MS") {
            session.poll_interval = poll.max(Duration::from_millis(1));
        }
        if let Some(pause) = millis("BATTLE_REPLAY_PAUSE_MS") {
            session.replay_pause = pause;
        }
        if let Some(timeout) = millis("BATTLE_MOVE_TIMEOUT_MS") {
            session.move_timeout = timeout;
        }
        if let Some(min_ap) = text("BATTLE_MIN_ACTION_POINTS").and_then(|v| v.parse().ok()) {
            session.min_action_points = min_ap;
        }

        config.session_id = text("BATTLE_SESSION_ID");
        config.log_dir = text("BATTLE_LOG_DIR").map(PathBuf::from);

        config
    }

    /// Configured session id, or `session_<unix seconds>`.
    pub fn session_id(&self) -> String {
        self.session_id.clone().unwrap_or_else(|| {
            let timestamp = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_secs())
                .unwrap_or_default();
            format!("session_{timestamp}")
        })
    }

    /// Root log directory.
    ///
    /// Follows platform conventions unless `BATTLE_LOG_DIR` is set:
    /// - macOS: `~/Library/Caches/battle-client/logs`
    /// - Linux: `~/.cache/battle-client/logs`
    /// - Windows: `%LOCALAPPDATA%\battle-client\logs`
    /// - Fallback: `<tmp>/battle-client/logs`
    pub fn log_dir(&self) -> PathBuf {
        if let Some(dir) = &self.log_dir {
            return dir.clone();
        }
        directories::ProjectDirs::from("", "", "battle-client")
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .unwrap_or_else(|| env::temp_dir().join("battle-client"))
            .join("logs")
    }
}
