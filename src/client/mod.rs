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

//! SQL execution against Databricks SQL warehouses.
//!
//! This module provides:
//! - `SqlExecutor` trait: the statement-in, rows-out interface the rest of
//!   the connector is written against
//! - `DatabricksHttpClient`: low-level HTTP client with retry logic
//! - `SeaExecutor`: implementation using the Statement Execution API (REST)

pub mod http;
pub mod sea;

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub use http::{build_reqwest_client, DatabricksHttpClient, HttpClientConfig};
pub use sea::{SeaExecutor, SeaExecutorConfig};

/// Positional statement parameter.
pub type QueryParam = serde_json::Value;

/// One result row. Values are the warehouse's string rendering; SQL NULL is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Option<String>>,
}

impl Row {
    pub fn new(columns: Arc<[String]>, values: Vec<Option<String>>) -> Self {
        Self { columns, values }
    }

    /// Build a row from `(column, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        let (columns, values): (Vec<String>, Vec<Option<String>>) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.map(Into::into)))
            .unzip();
        Self {
            columns: columns.into(),
            values,
        }
    }

    /// Value of the named column; `None` when absent or NULL.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
            .and_then(|v| v.as_deref())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// Executes SQL statements on behalf of the connector.
///
/// Errors surface as [`crate::Error::SqlExecution`] (or `Io` for transport
/// failures) and are passed through by callers unchanged.
#[async_trait]
pub trait SqlExecutor: Send + Sync + std::fmt::Debug {
    async fn query(&self, sql: &str, params: &[QueryParam]) -> Result<Vec<Row>>;
}

/// Base URL for a workspace host; `https://` is assumed when no scheme is given.
pub fn base_url(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("https://") || host.starts_with("http://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_get() {
        let row = Row::from_pairs([("col_name", Some("id")), ("comment", None::<&str>)]);
        assert_eq!(row.get("col_name"), Some("id"));
        assert_eq!(row.get("comment"), None);
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.columns(), &["col_name".to_string(), "comment".to_string()]);
    }

    #[test]
    fn test_base_url() {
        assert_eq!(base_url("example.databricks.com"), "https://example.databricks.com");
        assert_eq!(base_url("https://example.databricks.com/"), "https://example.databricks.com");
        assert_eq!(base_url("http://localhost:8080"), "http://localhost:8080");
    }
}
