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

//! Bulk unload to an export bucket.
//!
//! An unload writes a table or query result to the configured bucket as
//! headerless CSV through a temporary external table, then lists the files
//! that were produced:
//!
//! 1. validate the bucket provider and URL (no SQL is issued on failure)
//! 2. qualify the table name with the catalog
//! 3. `DESCRIBE` the table or query
//! 4. `CREATE TABLE <name>_tmp USING CSV LOCATION ... AS (...)`
//! 5. `DROP TABLE IF EXISTS <name>_tmp`, whatever step 4 returned
//! 6. list the files through the provider's [`FileExtractor`]
//!
//! Binary (`hll_datasketches`) columns are exported as `base64(...)` since
//! CSV cannot carry raw bytes.

pub mod bucket;
pub mod cloud;
pub mod extract;

pub use bucket::ParsedBucketUrl;
pub use cloud::{ObjectStoreExtractor, SIGNED_URL_TTL};
pub use extract::{ExtractorSet, FileExtractor, ProviderCredentials};

use crate::client::{QueryParam, SqlExecutor};
use crate::config::{BucketConfig, BucketProvider};
use crate::error::{Error, Result};
use crate::metadata::{ColumnDescriptor, ColumnTypeResolver, SqlCommandBuilder};
use crate::namespace::NamespaceResolver;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

const TEMP_TABLE_SUFFIX: &str = "_tmp";

/// Query to unload instead of the table's contents.
#[derive(Debug, Clone, PartialEq)]
pub struct UnloadQuery {
    pub sql: String,
    pub params: Vec<QueryParam>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnloadOptions {
    pub query: Option<UnloadQuery>,
}

impl UnloadOptions {
    pub fn table() -> Self {
        Self::default()
    }

    pub fn query(sql: impl Into<String>, params: Vec<QueryParam>) -> Self {
        Self {
            query: Some(UnloadQuery {
                sql: sql.into(),
                params,
            }),
        }
    }
}

/// Result of an unload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnloadManifest {
    /// File URIs, ordered by object path.
    pub files: Vec<String>,
    pub columns: Vec<ColumnDescriptor>,
    pub csv_escape_symbol: Option<String>,
    /// Always `true`: exported CSV has no header row.
    pub headerless: bool,
}

/// Where the files of one unload land.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ExportTarget {
    provider: BucketProvider,
    /// External table location.
    location: String,
    /// Bucket name as the extractor expects it.
    bucket_name: String,
    prefix: String,
}

/// Runs unloads against one bucket configuration.
#[derive(Debug, Clone)]
pub struct UnloadOrchestrator {
    executor: Arc<dyn SqlExecutor>,
    namespace: NamespaceResolver,
    resolver: ColumnTypeResolver,
    bucket: BucketConfig,
    extractors: ExtractorSet,
}

impl UnloadOrchestrator {
    pub fn new(
        executor: Arc<dyn SqlExecutor>,
        namespace: NamespaceResolver,
        resolver: ColumnTypeResolver,
        bucket: BucketConfig,
        extractors: ExtractorSet,
    ) -> Self {
        Self {
            executor,
            namespace,
            resolver,
            bucket,
            extractors,
        }
    }

    pub fn bucket(&self) -> &BucketConfig {
        &self.bucket
    }

    /// Unload `table` (or `options.query`) to the export bucket.
    pub async fn unload(&self, table: &str, options: &UnloadOptions) -> Result<UnloadManifest> {
        let provider = self.bucket.provider()?;
        let full_name = self.namespace.with_catalog_prefix(table);
        let target = self.export_target(provider, &full_name)?;
        info!(
            "Unloading {} to {} ({})",
            full_name, target.location, target.provider
        );

        let (columns, create_sql, params) = match &options.query {
            Some(query) => {
                let columns = self.resolver.describe_query(&query.sql, &query.params).await?;
                let select = export_select(&columns, &format!("({})", query.sql))
                    .unwrap_or_else(|| query.sql.clone());
                (columns, select, query.params.as_slice())
            }
            None => {
                let columns = self.resolver.describe_table(&full_name).await?;
                let select = export_select(&columns, &full_name)
                    .unwrap_or_else(|| SqlCommandBuilder::select(&[], &full_name));
                (columns, select, &[][..])
            }
        };

        let temp_table = format!("{}{}", full_name, TEMP_TABLE_SUFFIX);
        let create = SqlCommandBuilder::create_external_csv_table(
            &temp_table,
            &target.location,
            &create_sql,
        );
        TempTable::new(self.executor.as_ref(), &temp_table)
            .run(&create, params)
            .await?;

        let credentials = ProviderCredentials::from_bucket_config(provider, &self.bucket);
        let files = self
            .extractors
            .for_provider(provider)
            .extract(&credentials, &target.bucket_name, &target.prefix)
            .await?;
        info!("Unloaded {} into {} files", full_name, files.len());

        Ok(UnloadManifest {
            files,
            columns,
            csv_escape_symbol: self.bucket.csv_escape_symbol.clone(),
            headerless: true,
        })
    }

    fn export_target(&self, provider: BucketProvider, full_name: &str) -> Result<ExportTarget> {
        let export_bucket = self
            .bucket
            .export_bucket
            .as_deref()
            .ok_or_else(|| Error::config("Export bucket is not configured"))?;
        let parsed = ParsedBucketUrl::parse(export_bucket)?;

        let bucket_name = match provider {
            BucketProvider::Azure => {
                let container = parsed.username.as_deref().ok_or_else(|| {
                    Error::config(format!(
                        "Azure export bucket must be container@account: {}",
                        export_bucket
                    ))
                })?;
                format!("{}/{}", parsed.bucket_name, container)
            }
            BucketProvider::S3 | BucketProvider::Gcs => parsed.bucket_name.clone(),
        };

        let root = self.bucket.location_root().unwrap_or(export_bucket);
        Ok(ExportTarget {
            provider,
            location: format!("{}/{}", root.trim_end_matches('/'), full_name),
            bucket_name,
            prefix: parsed.export_prefix(full_name),
        })
    }
}

/// Projection re-encoding binary columns, or `None` when there are none.
fn export_select(columns: &[ColumnDescriptor], source: &str) -> Option<String> {
    if !columns.iter().any(|c| c.generic_type.is_binary()) {
        return None;
    }
    let projection: Vec<String> = columns
        .iter()
        .map(|c| {
            let quoted = NamespaceResolver::quote_identifier(&c.name);
            if c.generic_type.is_binary() {
                format!("base64({}) AS {}", quoted, quoted)
            } else {
                quoted
            }
        })
        .collect();
    Some(SqlCommandBuilder::select(&projection, source))
}

/// A temporary table that is dropped once its create statement has run.
struct TempTable<'a> {
    executor: &'a dyn SqlExecutor,
    name: &'a str,
}

impl<'a> TempTable<'a> {
    fn new(executor: &'a dyn SqlExecutor, name: &'a str) -> Self {
        Self { executor, name }
    }

    /// Run `create`, then drop the table exactly once.
    ///
    /// A drop failure after a successful create is logged and ignored.
    async fn run(self, create: &str, params: &[QueryParam]) -> Result<()> {
        debug!("Creating temporary table {}", self.name);
        let created = self.executor.query(create, params).await;
        let dropped = self
            .executor
            .query(&SqlCommandBuilder::drop_table_if_exists(self.name), &[])
            .await;

        match (created, dropped) {
            (Ok(_), Ok(_)) => Ok(()),
            (Ok(_), Err(cleanup)) => {
                warn!("Failed to drop temporary table {}: {}", self.name, cleanup);
                Ok(())
            }
            (Err(primary), Ok(_)) => Err(primary),
            (Err(primary), Err(cleanup)) => Err(Error::CleanupFailed {
                primary: Box::new(primary),
                cleanup: Box::new(cleanup),
            }),
        }
    }
}
