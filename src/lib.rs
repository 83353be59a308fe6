//! # Editor Session
//!
//! Client-side session manager for a multi-language online code editor.
//! A [`SessionStore`] owns the editor configuration (language, theme, font
//! size), remembers the code written for each language, and runs the
//! editor's code on a remote execution backend one request at a time.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use editor_session::{SessionStore, TextBuffer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = SessionStore::open_default()?;
//!     session.set_language("python")?;
//!     session.attach_editor(Arc::new(TextBuffer::new("print(6 * 7)")));
//!
//!     session.run().await?;
//!
//!     match session.error() {
//!         Some(error) => eprintln!("{}", error),
//!         None => println!("{}", session.output()),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Persistence
//!
//! Settings and per-language code go through the [`KeyValueStore`] port
//! under the keys `editor-language`, `editor-theme`, `editor-font-size` and
//! `editor-code-{language}`. [`FileStore`] keeps them in a JSON file;
//! [`MemoryStore`] keeps them for the lifetime of the process.
//!
//! ## Runs
//!
//! [`SessionStore::run`] reports every failure (empty editor, unknown
//! language, backend rejection, compile or runtime error) through
//! [`SessionStore::error`] and always returns the session to
//! [`RunStatus::Idle`]. A call made while a run is in flight is rejected
//! with [`Error::AlreadyRunning`].

mod editor;
mod error;
mod languages;
mod session;
mod storage;
mod types;

pub use editor::{EditorSurface, TextBuffer};
pub use error::Error;
pub use languages::{LanguageConfig, LanguageRegistry, RuntimeDescriptor};
pub use session::{SessionStore, EMPTY_CODE_MESSAGE};
pub use storage::{
    code_key, FileStore, KeyValueStore, MemoryStore, FONT_SIZE_KEY, LANGUAGE_KEY, THEME_KEY,
};
pub use types::{
    clamp_font_size, LastExecution, RunStatus, SessionConfig, SessionState, DEFAULT_FONT_SIZE,
    DEFAULT_LANGUAGE, DEFAULT_THEME, MAX_FONT_SIZE, MIN_FONT_SIZE,
};

pub use piston_client::{
    ClientConfig, ExecutionRequest, ExecutionResult, Executor, PistonClient,
};

/// Result type for session operations
pub type Result<T> = std::result::Result<T, Error>;
