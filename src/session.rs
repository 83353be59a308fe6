use parking_lot::Mutex;
use piston_client::{ClientConfig, ExecutionRequest, ExecutionResult, Executor, PistonClient};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::{
    editor::EditorSurface,
    error::Error,
    languages::LanguageRegistry,
    storage::{code_key, FileStore, KeyValueStore, FONT_SIZE_KEY, LANGUAGE_KEY, THEME_KEY},
    types::{clamp_font_size, LastExecution, RunStatus, SessionConfig, SessionState},
};

pub const EMPTY_CODE_MESSAGE: &str = "Please enter some code";

/// Per-tab editing session.
///
/// Owns the editor configuration, the last output and error, and the run
/// status. At most one execution is in flight at a time.
pub struct SessionStore {
    registry: LanguageRegistry,
    executor: Arc<dyn Executor>,
    storage: Option<Arc<dyn KeyValueStore>>,
    editor: Mutex<Option<Arc<dyn EditorSurface>>>,
    state: watch::Sender<SessionState>,
}

/// Resets the run status to idle when dropped, so every exit from `run`
/// (including panics and cancellation) leaves the session usable.
struct RunGuard<'a> {
    state: &'a watch::Sender<SessionState>,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.state.send_if_modified(|state| {
            if state.status == RunStatus::Idle {
                return false;
            }
            state.status = RunStatus::Idle;
            true
        });
        debug!("Run settled");
    }
}

enum Admission {
    Started { language: String },
    EmptyCode,
}

impl SessionStore {
    /// Create a session. The configuration is restored from `storage`; with
    /// no storage the session starts from defaults and persists nothing.
    pub fn new(
        registry: LanguageRegistry,
        executor: Arc<dyn Executor>,
        storage: Option<Arc<dyn KeyValueStore>>,
    ) -> Self {
        let config = SessionConfig::load(storage.as_deref());
        debug!(
            language = %config.language,
            theme = %config.theme,
            font_size = config.font_size_px,
            "Restored session configuration"
        );

        let (state, _) = watch::channel(SessionState {
            config,
            ..SessionState::default()
        });

        Self {
            registry,
            executor,
            storage,
            editor: Mutex::new(None),
            state,
        }
    }

    /// Session with the built-in languages, the Piston endpoint from the
    /// environment and file storage in the user data directory.
    pub fn open_default() -> Result<Self, Error> {
        let client = PistonClient::new(ClientConfig::from_env())?;
        let storage = FileStore::open_default()?;
        info!("Using session storage at {}", storage.path().display());

        Ok(Self::new(
            LanguageRegistry::builtin(),
            Arc::new(client),
            Some(Arc::new(storage)),
        ))
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver notified after every state change
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn config(&self) -> SessionConfig {
        self.state.borrow().config.clone()
    }

    pub fn language(&self) -> String {
        self.state.borrow().config.language.clone()
    }

    pub fn theme(&self) -> String {
        self.state.borrow().config.theme.clone()
    }

    pub fn font_size(&self) -> u16 {
        self.state.borrow().config.font_size_px
    }

    pub fn output(&self) -> String {
        self.state.borrow().output.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn status(&self) -> RunStatus {
        self.state.borrow().status
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().is_running()
    }

    pub fn last_execution(&self) -> Option<LastExecution> {
        self.state.borrow().last_execution.clone()
    }

    /// Text currently in the editor, or an empty string when none is attached
    pub fn active_code(&self) -> String {
        // The surface may call back into the session; never read it under the lock
        let editor = self.editor.lock().clone();
        editor.map(|editor| editor.value()).unwrap_or_default()
    }

    /// Register the live editor and load the saved code for the current
    /// language into it, if there is any.
    pub fn attach_editor(&self, editor: Arc<dyn EditorSurface>) {
        let language = self.language();
        if let Some(saved) = self.load(&code_key(&language)) {
            debug!(%language, "Restoring saved code into editor");
            editor.set_value(&saved);
        }
        *self.editor.lock() = Some(editor);
    }

    /// Drop the reference to the editor, e.g. when the widget unmounts
    pub fn detach_editor(&self) -> Option<Arc<dyn EditorSurface>> {
        self.editor.lock().take()
    }

    /// Set the editor theme. Blank names are ignored, since storage maps them
    /// back to the default theme.
    pub fn set_theme(&self, theme: &str) {
        let theme = theme.trim();
        if theme.is_empty() {
            warn!("Ignoring blank theme name");
            return;
        }

        self.persist(THEME_KEY, theme);
        self.state.send_if_modified(|state| {
            if state.config.theme == theme {
                return false;
            }
            state.config.theme = theme.to_string();
            true
        });
    }

    /// Set the font size, clamped to the supported range. Returns the size
    /// that was applied.
    pub fn set_font_size(&self, px: i64) -> u16 {
        let size = clamp_font_size(px);
        if i64::from(size) != px {
            warn!("Font size {} out of range, using {}", px, size);
        }

        self.persist(FONT_SIZE_KEY, &size.to_string());
        self.state.send_if_modified(|state| {
            if state.config.font_size_px == size {
                return false;
            }
            state.config.font_size_px = size;
            true
        });
        size
    }

    /// Switch language.
    ///
    /// The editor's text is saved under the previous language. The editor
    /// itself is left alone; saved code is only loaded on `attach_editor`.
    pub fn set_language(&self, language: &str) -> Result<(), Error> {
        if !self.registry.contains(language) {
            warn!("Refusing to switch to unknown language {}", language);
            return Err(Error::UnsupportedLanguage(language.to_string()));
        }

        let previous = self.language();
        let code = self.active_code();
        if !code.is_empty() {
            self.persist(&code_key(&previous), &code);
        }

        self.persist(LANGUAGE_KEY, language);
        self.state.send_modify(|state| {
            state.config.language = language.to_string();
            state.output.clear();
            state.error = None;
        });

        info!("Switched language from {} to {}", previous, language);
        Ok(())
    }

    /// Run the editor's code on the execution backend and record the outcome
    /// in the session state.
    ///
    /// Failures are reported through [`SessionStore::error`], not through
    /// the returned `Result`, which only rejects a call made while another
    /// run is still in flight.
    pub async fn run(&self) -> Result<(), Error> {
        let code = self.active_code();

        let language = match self.admit(&code)? {
            Admission::EmptyCode => return Ok(()),
            Admission::Started { language } => language,
        };
        let _guard = RunGuard { state: &self.state };

        let Some(runtime) = self.registry.runtime(&language) else {
            warn!("No runtime for language {}", language);
            self.state.send_modify(|state| {
                state.error = Some(Error::UnsupportedLanguage(language.clone()).to_string());
            });
            return Ok(());
        };

        let request = ExecutionRequest::new(&runtime.name, &runtime.version, code.as_str());
        info!(
            %language,
            runtime = %runtime.name,
            version = %runtime.version,
            "Running code"
        );

        let result = self.executor.execute(&request).await;
        self.record(code, result);
        Ok(())
    }

    /// Check the preconditions of a run and, if they hold, mark the session
    /// as running. Both happen under one lock of the state.
    fn admit(&self, code: &str) -> Result<Admission, Error> {
        let mut admission = Err(Error::AlreadyRunning);

        self.state.send_if_modified(|state| {
            if state.is_running() {
                return false;
            }

            if code.trim().is_empty() {
                state.error = Some(EMPTY_CODE_MESSAGE.to_string());
                admission = Ok(Admission::EmptyCode);
                return true;
            }

            state.status = RunStatus::Running;
            state.error = None;
            state.output.clear();
            admission = Ok(Admission::Started {
                language: state.config.language.clone(),
            });
            true
        });

        if admission.is_err() {
            warn!("Rejected run while another execution is in flight");
        }
        admission
    }

    fn record(&self, code: String, result: ExecutionResult) {
        match result.error_message() {
            None => info!(
                output_len = result.stdout().len(),
                "Code execution completed successfully"
            ),
            Some(message) => error!("Code execution failed: {}", message),
        }

        self.state.send_modify(|state| {
            state.output = result.stdout().to_string();
            state.error = result.error_message().map(str::to_string);
            state.last_execution = Some(LastExecution { code, result });
        });
    }

    fn load(&self, key: &str) -> Option<String> {
        self.storage
            .as_ref()
            .and_then(|storage| storage.get(key))
            .filter(|value| !value.is_empty())
    }

    fn persist(&self, key: &str, value: &str) {
        let Some(storage) = &self.storage else {
            return;
        };
        if let Err(e) = storage.set(key, value) {
            warn!("Failed to persist {}: {}", key, e);
        }
    }
}
