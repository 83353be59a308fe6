use piston_client::ExecutionResult;
use serde::{Deserialize, Serialize};

use crate::storage::{KeyValueStore, FONT_SIZE_KEY, LANGUAGE_KEY, THEME_KEY};

pub const DEFAULT_LANGUAGE: &str = "javascript";
pub const DEFAULT_THEME: &str = "vs-dark";
pub const DEFAULT_FONT_SIZE: u16 = 16;
pub const MIN_FONT_SIZE: u16 = 8;
pub const MAX_FONT_SIZE: u16 = 36;

/// Clamp a requested font size into `[MIN_FONT_SIZE, MAX_FONT_SIZE]`
pub fn clamp_font_size(px: i64) -> u16 {
    px.clamp(i64::from(MIN_FONT_SIZE), i64::from(MAX_FONT_SIZE)) as u16
}

/// Editor configuration that survives restarts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub language: String,
    pub theme: String,
    pub font_size_px: u16,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            theme: DEFAULT_THEME.to_string(),
            font_size_px: DEFAULT_FONT_SIZE,
        }
    }
}

impl SessionConfig {
    /// Read the persisted configuration, using defaults for absent or
    /// unparsable values. Without a store the defaults are returned as is.
    pub fn load(store: Option<&dyn KeyValueStore>) -> Self {
        let Some(store) = store else {
            return Self::default();
        };

        let non_empty = |key: &str| store.get(key).filter(|value| !value.trim().is_empty());

        Self {
            language: non_empty(LANGUAGE_KEY).unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            theme: non_empty(THEME_KEY).unwrap_or_else(|| DEFAULT_THEME.to_string()),
            font_size_px: non_empty(FONT_SIZE_KEY)
                .and_then(|value| value.trim().parse::<i64>().ok())
                .map(clamp_font_size)
                .unwrap_or(DEFAULT_FONT_SIZE),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    #[default]
    Idle,
    Running,
}

/// The most recently completed remote execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastExecution {
    /// Source text that was submitted
    pub code: String,
    pub result: ExecutionResult,
}

impl LastExecution {
    /// Program output; empty unless the run succeeded
    pub fn output(&self) -> &str {
        self.result.stdout()
    }

    pub fn error(&self) -> Option<&str> {
        self.result.error_message()
    }
}

/// Observable session state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub config: SessionConfig,
    pub output: String,
    pub error: Option<String>,
    pub status: RunStatus,
    pub last_execution: Option<LastExecution>,
}

impl SessionState {
    pub fn is_running(&self) -> bool {
        self.status == RunStatus::Running
    }
}
