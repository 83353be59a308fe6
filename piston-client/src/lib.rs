//! # Piston Client
//!
//! A small client for the [Piston](https://github.com/engineer-man/piston)
//! code execution API. It submits a single-file program for a given runtime
//! and classifies the heterogeneous response into an [`ExecutionResult`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use piston_client::{ClientConfig, ExecutionRequest, Executor, PistonClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PistonClient::new(ClientConfig::from_env())?;
//!
//!     let request = ExecutionRequest::new("python", "3.10.0", "print('hello')");
//!     let result = client.execute(&request).await;
//!
//!     println!("{:?}", result);
//!     Ok(())
//! }
//! ```
//!
//! ## Classification
//!
//! Responses are classified in a fixed order and the first match wins:
//!
//! 1. Transport failure or non-2xx status: `BackendError`
//! 2. Top-level `message` field: `BackendError`
//! 3. `compile` stage with a non-zero exit code: `CompileFailure`
//! 4. `run` stage with a non-zero exit code: `RuntimeFailure`
//! 5. Otherwise `Success` with the run output, trailing whitespace removed
//!
//! Each submission is attempted exactly once; there are no retries.

mod client;
mod config;
mod error;
mod types;

pub use client::{Executor, PistonClient};
pub use config::{ClientConfig, API_URL_ENV, DEFAULT_API_URL};
pub use error::Error;
pub use types::*;

/// Result type for execution client operations
pub type Result<T> = std::result::Result<T, Error>;
