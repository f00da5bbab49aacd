// Copyright (c) 2025 ADBC Drivers Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types for the Databricks connector.
//!
//! Each variant corresponds to a failure class callers are expected to
//! tell apart: configuration problems are raised before any I/O, warehouse
//! health failures carry enough detail to render a diagnostic, and SQL
//! errors are passed through from the executor without reinterpretation.

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing, conflicting or malformed configuration.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Export bucket type outside of `s3`, `gcs`, `azure`.
    #[error("Unsupported export bucket type: {0}")]
    UnsupportedProvider(String),

    /// OAuth client-credentials exchange failed.
    #[error("Failed to get access token: {0}")]
    AuthExchange(String),

    /// The warehouse status endpoint answered with a non-success status.
    #[error("Databricks API error: {0}")]
    Unreachable(String),

    /// The warehouse is being deleted or is already gone.
    #[error("Warehouse is being deleted (current state: {0})")]
    TerminalState(String),

    /// The warehouse reports a FAILED health status.
    #[error("Warehouse is unhealthy: {summary}. Details: {details}")]
    Unhealthy { summary: String, details: String },

    /// Statement failed on the warehouse or in the executor.
    #[error("SQL execution failed: {0}")]
    SqlExecution(String),

    /// Listing or signing unloaded files failed.
    #[error("Failed to extract unloaded files: {0}")]
    Extraction(String),

    /// Transport-level failure (HTTP, serialization).
    #[error("I/O error: {0}")]
    Io(String),

    /// Both the export statement and the temp table drop failed.
    #[error("{primary} (cleanup also failed: {cleanup})")]
    CleanupFailed {
        primary: Box<Error>,
        cleanup: Box<Error>,
    },
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }

    pub(crate) fn io(message: impl Into<String>) -> Self {
        Error::Io(message.into())
    }

    pub(crate) fn sql(message: impl Into<String>) -> Self {
        Error::SqlExecution(message.into())
    }

    /// Returns `true` for errors raised before any network or SQL call.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::Configuration(_) | Error::UnsupportedProvider(_)
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Io(e.to_string())
    }
}

impl From<object_store::Error> for Error {
    fn from(e: object_store::Error) -> Self {
        Error::Extraction(e.to_string())
    }
}
