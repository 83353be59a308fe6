use serde::{Deserialize, Serialize};

/// A single program submission, built fresh for every run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// Runtime name as the backend knows it (e.g. `python`)
    pub language: String,
    /// Runtime version (e.g. `3.10.0`)
    pub version: String,
    /// Program text submitted as the only file
    pub source: String,
}

impl ExecutionRequest {
    pub fn new(
        language: impl Into<String>,
        version: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            language: language.into(),
            version: version.into(),
            source: source.into(),
        }
    }

    pub(crate) fn to_payload(&self) -> ExecutePayload<'_> {
        ExecutePayload {
            language: &self.language,
            version: &self.version,
            files: vec![SourceFile {
                content: &self.source,
            }],
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ExecutePayload<'a> {
    pub language: &'a str,
    pub version: &'a str,
    pub files: Vec<SourceFile<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SourceFile<'a> {
    pub content: &'a str,
}

/// Report for one stage (`compile` or `run`) of a submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    /// Exit code. `None` when the process was terminated by a signal.
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub signal: Option<String>,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    /// Interleaved stdout and stderr
    #[serde(default)]
    pub output: String,
}

impl StageReport {
    pub fn failed(&self) -> bool {
        self.code != Some(0)
    }

    /// Best human-readable failure text: stderr, then stdout, then the
    /// combined output, then `fallback`.
    fn failure_message(&self, fallback: &str) -> String {
        [&self.stderr, &self.stdout, &self.output]
            .into_iter()
            .find(|text| !text.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| match &self.signal {
                Some(signal) => format!("{} (terminated by {})", fallback, signal),
                None => fallback.to_string(),
            })
    }
}

/// Raw response body of the execute endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PistonResponse {
    /// Present when the backend rejected the submission itself
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub compile: Option<StageReport>,
    #[serde(default)]
    pub run: Option<StageReport>,
}

impl PistonResponse {
    /// Classify the response. Rules are applied in order and the first
    /// match wins: backend message, failed compile, failed run, success.
    pub fn into_result(self) -> ExecutionResult {
        if let Some(message) = self.message.filter(|m| !m.trim().is_empty()) {
            return ExecutionResult::BackendError { message };
        }

        if let Some(compile) = self.compile.as_ref().filter(|stage| stage.failed()) {
            return ExecutionResult::CompileFailure {
                message: compile.failure_message("Compilation error"),
            };
        }

        match self.run {
            Some(run) if run.failed() => ExecutionResult::RuntimeFailure {
                message: run.failure_message("Runtime error"),
            },
            Some(run) => ExecutionResult::Success {
                stdout: run.output.trim_end().to_string(),
            },
            None => ExecutionResult::BackendError {
                message: "Execution backend returned no run result".to_string(),
            },
        }
    }
}

/// Uniform outcome of one submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionResult {
    /// Program ran to completion; stdout has trailing whitespace removed
    Success { stdout: String },
    CompileFailure { message: String },
    RuntimeFailure { message: String },
    /// Transport failure, non-2xx status or a rejected submission
    BackendError { message: String },
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success { .. })
    }

    /// Program output for a successful run, empty otherwise
    pub fn stdout(&self) -> &str {
        match self {
            ExecutionResult::Success { stdout } => stdout,
            _ => "",
        }
    }

    /// Failure message, `None` for a successful run
    pub fn error_message(&self) -> Option<&str> {
        match self {
            ExecutionResult::Success { .. } => None,
            ExecutionResult::CompileFailure { message }
            | ExecutionResult::RuntimeFailure { message }
            | ExecutionResult::BackendError { message } => Some(message),
        }
    }
}

impl From<crate::Error> for ExecutionResult {
    fn from(error: crate::Error) -> Self {
        ExecutionResult::BackendError {
            message: error.to_string(),
        }
    }
}
