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

//! SEA (Statement Execution API) executor.
//!
//! Implements [`SqlExecutor`] on top of the Databricks SQL Statement
//! Execution API. Results are requested inline as JSON arrays; the
//! connector only reads small metadata result sets (DESCRIBE, SHOW) this way,
//! bulk data leaves the warehouse through unloads.

use crate::client::{base_url, DatabricksHttpClient, QueryParam, Row, SqlExecutor};
use crate::error::{Error, Result};
use crate::types::sea::{
    ExecuteStatementRequest, ResultData, StatementExecutionResponse, StatementParameter,
    StatementState,
};
use async_trait::async_trait;
use reqwest::Method;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Statement execution settings.
#[derive(Debug, Clone)]
pub struct SeaExecutorConfig {
    pub catalog: Option<String>,
    pub schema: Option<String>,
    /// Server-side wait before the API returns a pending statement.
    pub wait_timeout: String,
    /// Delay between status polls of a pending statement.
    pub poll_interval: Duration,
    /// Give up polling after this long. The statement keeps running server-side.
    pub poll_timeout: Duration,
}

impl Default for SeaExecutorConfig {
    fn default() -> Self {
        Self {
            catalog: None,
            schema: None,
            wait_timeout: "30s".to_string(),
            poll_interval: Duration::from_secs(5),
            poll_timeout: Duration::from_secs(60 * 60),
        }
    }
}

/// [`SqlExecutor`] backed by the Statement Execution API.
#[derive(Debug)]
pub struct SeaExecutor {
    http_client: Arc<DatabricksHttpClient>,
    host: String,
    warehouse_id: String,
    config: SeaExecutorConfig,
}

impl SeaExecutor {
    pub fn new(
        http_client: Arc<DatabricksHttpClient>,
        host: impl Into<String>,
        warehouse_id: impl Into<String>,
        config: SeaExecutorConfig,
    ) -> Self {
        Self {
            http_client,
            host: host.into(),
            warehouse_id: warehouse_id.into(),
            config,
        }
    }

    /// Build the base URL for API requests.
    fn base_url(&self) -> String {
        format!("{}/api/2.0/sql", base_url(&self.host))
    }

    fn build_request(&self, sql: &str, params: &[QueryParam]) -> ExecuteStatementRequest {
        ExecuteStatementRequest {
            warehouse_id: self.warehouse_id.clone(),
            statement: sql.to_string(),
            catalog: self.config.catalog.clone(),
            schema: self.config.schema.clone(),
            parameters: params.iter().map(StatementParameter::from_json).collect(),
            disposition: "INLINE".to_string(),
            format: "JSON_ARRAY".to_string(),
            wait_timeout: Some(self.config.wait_timeout.clone()),
            on_wait_timeout: Some("CONTINUE".to_string()),
        }
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<T> {
        let response = self.http_client.execute(builder).await?;
        let body = response
            .text()
            .await
            .map_err(|e| Error::io(format!("Failed to read response: {}", e)))?;

        serde_json::from_str(&body).map_err(|e| {
            Error::io(format!(
                "Failed to parse {} response: {} - body: {}",
                what, e, body
            ))
        })
    }

    async fn call_execute_api(
        &self,
        sql: &str,
        params: &[QueryParam],
    ) -> Result<StatementExecutionResponse> {
        let url = format!("{}/statements", self.base_url());
        debug!("Executing statement at {}: {}", url, sql);

        let builder = self
            .http_client
            .request(Method::POST, &url)
            .json(&self.build_request(sql, params));

        let response: StatementExecutionResponse = self.send(builder, "execute").await?;
        debug!(
            "Execute response: statement_id={}, status={:?}",
            response.statement_id, response.status.state
        );
        Ok(response)
    }

    async fn get_statement_status(&self, statement_id: &str) -> Result<StatementExecutionResponse> {
        let url = format!("{}/statements/{}", self.base_url(), statement_id);
        debug!("Getting statement status at {}", url);

        let builder = self.http_client.request(Method::GET, &url);
        self.send(builder, "status").await
    }

    /// Fetch a follow-up chunk through its `next_chunk_internal_link`.
    async fn get_chunk(&self, internal_link: &str) -> Result<ResultData> {
        let url = format!("{}{}", base_url(&self.host), internal_link);
        debug!("Getting result chunk at {}", url);

        let builder = self.http_client.request(Method::GET, &url);
        self.send(builder, "chunk").await
    }

    /// Wait for statement to complete, polling status.
    async fn wait_for_completion(
        &self,
        response: StatementExecutionResponse,
    ) -> Result<StatementExecutionResponse> {
        let start = Instant::now();
        let mut current = response;

        while !current.status.state.is_terminal() {
            if start.elapsed() > self.config.poll_timeout {
                return Err(Error::io(format!(
                    "Statement {} did not finish within {:?}",
                    current.statement_id, self.config.poll_timeout
                )));
            }
            tokio::time::sleep(self.config.poll_interval).await;
            debug!("Polling statement status: {}", current.statement_id);
            current = self.get_statement_status(&current.statement_id).await?;
        }

        match current.status.state {
            StatementState::Failed => Err(Error::sql(
                current
                    .status
                    .error
                    .and_then(|e| e.message)
                    .unwrap_or_else(|| "Unknown error".to_string()),
            )),
            StatementState::Canceled => Err(Error::sql("Statement was canceled")),
            // Inline results may arrive on an already closed statement
            StatementState::Closed if current.result.is_none() => {
                Err(Error::sql("Statement was closed"))
            }
            _ => Ok(current),
        }
    }

    async fn collect_rows(&self, response: StatementExecutionResponse) -> Result<Vec<Row>> {
        let columns: Arc<[String]> = response
            .manifest
            .as_ref()
            .map(|m| {
                let mut cols = m.schema.columns.clone();
                cols.sort_by_key(|c| c.position);
                cols.into_iter().map(|c| c.name).collect::<Vec<_>>()
            })
            .unwrap_or_default()
            .into();

        let mut rows = Vec::new();
        let mut chunk = response.result;
        while let Some(data) = chunk.take() {
            for values in data.data_array.unwrap_or_default() {
                rows.push(Row::new(columns.clone(), values));
            }
            if let Some(link) = data.next_chunk_internal_link {
                chunk = Some(self.get_chunk(&link).await?);
            }
        }

        debug!("Statement returned {} rows", rows.len());
        Ok(rows)
    }
}

#[async_trait]
impl SqlExecutor for SeaExecutor {
    async fn query(&self, sql: &str, params: &[QueryParam]) -> Result<Vec<Row>> {
        let response = self.call_execute_api(sql, params).await?;
        let response = self.wait_for_completion(response).await?;
        self.collect_rows(response).await
    }
}
