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

//! Shared in-memory collaborators for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use databricks_connector::client::QueryParam;
use databricks_connector::jdbc_url::ConnectionProperties;
use databricks_connector::metadata::TypeMapping;
use databricks_connector::unload::ExtractorSet;
use databricks_connector::{
    CredentialBroker, Driver, DriverConfig, DriverParts, Error, FileExtractor, HealthProbe,
    ProviderCredentials, Result, Row, SqlExecutor,
};
use std::sync::{Arc, Mutex};

/// Records statements; answers `DESCRIBE` with canned rows.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    pub describe_rows: Vec<Row>,
    pub fail_prefix: Option<String>,
    pub statements: Mutex<Vec<(String, Vec<QueryParam>)>>,
}

impl RecordingExecutor {
    pub fn with_columns(columns: &[(&str, &str)]) -> Self {
        Self {
            describe_rows: columns
                .iter()
                .map(|(name, ty)| Row::from_pairs([("col_name", Some(*name)), ("data_type", Some(*ty))]))
                .collect(),
            ..Default::default()
        }
    }

    pub fn failing_on(mut self, prefix: &str) -> Self {
        self.fail_prefix = Some(prefix.to_string());
        self
    }

    pub fn sql(&self) -> Vec<String> {
        self.statements
            .lock()
            .unwrap()
            .iter()
            .map(|(sql, _)| sql.clone())
            .collect()
    }
}

#[async_trait]
impl SqlExecutor for RecordingExecutor {
    async fn query(&self, sql: &str, params: &[QueryParam]) -> Result<Vec<Row>> {
        self.statements
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        if let Some(prefix) = &self.fail_prefix {
            if sql.starts_with(prefix.as_str()) {
                return Err(Error::SqlExecution(format!("{} failed", prefix)));
            }
        }
        if sql.starts_with("DESCRIBE") {
            return Ok(self.describe_rows.clone());
        }
        Ok(vec![])
    }
}

#[derive(Debug, Default)]
pub struct RecordingExtractor {
    pub calls: Mutex<Vec<(ProviderCredentials, String, String)>>,
}

#[async_trait]
impl FileExtractor for RecordingExtractor {
    async fn extract(
        &self,
        credentials: &ProviderCredentials,
        bucket_name: &str,
        prefix: &str,
    ) -> Result<Vec<String>> {
        self.calls.lock().unwrap().push((
            credentials.clone(),
            bucket_name.to_string(),
            prefix.to_string(),
        ));
        Ok(vec![
            format!("https://signed/{}/{}/part-00000.csv", bucket_name, prefix),
            format!("https://signed/{}/{}/part-00001.csv", bucket_name, prefix),
        ])
    }
}

/// Health probe returning a fixed outcome and recording the auth header.
#[derive(Debug)]
pub struct StaticHealth {
    pub outcome: fn() -> Result<()>,
    pub headers: Mutex<Vec<String>>,
}

impl StaticHealth {
    pub fn healthy() -> Self {
        Self {
            outcome: || Ok(()),
            headers: Mutex::new(vec![]),
        }
    }
}

#[async_trait]
impl HealthProbe for StaticHealth {
    async fn check(&self, _host: &str, _warehouse_id: &str, auth_header: &str) -> Result<()> {
        self.headers.lock().unwrap().push(auth_header.to_string());
        (self.outcome)()
    }
}

pub fn driver_with(
    config: DriverConfig,
    broker: CredentialBroker,
    health: Arc<StaticHealth>,
    executor: Arc<RecordingExecutor>,
    extractor: Arc<RecordingExtractor>,
) -> Driver {
    Driver::from_parts(
        config,
        DriverParts {
            connection: ConnectionProperties {
                host: "dbc-1.cloud.databricks.com".to_string(),
                warehouse_id: "abc123".to_string(),
            },
            broker: Arc::new(broker),
            health,
            executor,
            type_mapping: TypeMapping::default(),
            extractors: ExtractorSet::uniform(extractor),
        },
    )
}
