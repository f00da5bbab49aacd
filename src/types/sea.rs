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

//! Wire types of the Statement Execution API.
//!
//! Only the fields the connector reads are modelled; serde skips the rest.
//! Results are always requested `INLINE` as `JSON_ARRAY`.

use serde::{Deserialize, Serialize};

/// Body of both the execute and the status endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct StatementExecutionResponse {
    pub statement_id: String,
    pub status: StatementStatus,
    #[serde(default)]
    pub manifest: Option<ResultManifest>,
    #[serde(default)]
    pub result: Option<ResultData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatementStatus {
    pub state: StatementState,
    #[serde(default)]
    pub error: Option<ServiceError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatementState {
    Pending,
    Running,
    Succeeded,
    Failed,
    Canceled,
    Closed,
}

impl StatementState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, StatementState::Pending | StatementState::Running)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceError {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultManifest {
    pub schema: ResultSchema,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultSchema {
    #[serde(default)]
    pub columns: Vec<ColumnInfo>,
}

/// Result column; `position` is its index in every row array.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub position: i32,
}

/// One inline chunk of rows, from the first response or a chunk link.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultData {
    #[serde(default)]
    pub next_chunk_internal_link: Option<String>,
    /// Values rendered as strings; SQL NULL is JSON null.
    #[serde(default)]
    pub data_array: Option<Vec<Vec<Option<String>>>>,
}

/// Request body for statement execution.
#[derive(Debug, Clone, Serialize)]
pub struct ExecuteStatementRequest {
    pub warehouse_id: String,
    pub statement: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<StatementParameter>,
    pub disposition: String,
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_timeout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_wait_timeout: Option<String>,
}

/// Positional parameter bound to a `?` marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementParameter {
    /// `None` serializes as JSON null, i.e. SQL NULL.
    pub value: Option<String>,
    #[serde(rename = "type")]
    pub type_name: String,
}

impl StatementParameter {
    /// Convert a JSON value to its SEA string rendering and SQL type.
    pub fn from_json(value: &serde_json::Value) -> Self {
        use serde_json::Value;

        let (value, type_name) = match value {
            Value::Null => (None, "VOID"),
            Value::Bool(b) => (Some(b.to_string()), "BOOLEAN"),
            Value::Number(n) if n.is_i64() || n.is_u64() => (Some(n.to_string()), "BIGINT"),
            Value::Number(n) => (Some(n.to_string()), "DOUBLE"),
            Value::String(s) => (Some(s.clone()), "STRING"),
            other => (Some(other.to_string()), "STRING"),
        };
        Self {
            value,
            type_name: type_name.to_string(),
        }
    }
}
