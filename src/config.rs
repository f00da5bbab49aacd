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

//! Driver configuration.
//!
//! A [`DriverConfig`] is assembled either through `with_*` builder methods or
//! from `CUBEJS_*` environment variables. Values are stored as given; the
//! export bucket type in particular is only validated when an unload runs.
//!
//! ## Environment variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `CUBEJS_DB_DATABRICKS_URL` | JDBC URL (falls back to `CUBEJS_JDBC_URL`) |
//! | `CUBEJS_DB_DATABRICKS_TOKEN` | Personal access token |
//! | `CUBEJS_DB_DATABRICKS_OAUTH_CLIENT_ID` | OAuth M2M client id |
//! | `CUBEJS_DB_DATABRICKS_OAUTH_CLIENT_SECRET` | OAuth M2M client secret |
//! | `CUBEJS_DB_DATABRICKS_CATALOG` | Unity Catalog name |
//! | `CUBEJS_DB_NAME` | Schema to restrict schema browsing to |
//! | `CUBEJS_DB_EXPORT_BUCKET_TYPE` | `s3`, `gcs` or `azure` |
//! | `CUBEJS_DB_EXPORT_BUCKET` | Export bucket URL |
//! | `CUBEJS_DB_EXPORT_BUCKET_MOUNT_DIR` | DBFS mount directory of the bucket |
//! | `CUBEJS_DB_EXPORT_BUCKET_CSV_ESCAPE_SYMBOL` | Escape symbol reported with unloads |
//! | `CUBEJS_DB_EXPORT_BUCKET_AWS_KEY` / `_SECRET` / `_REGION` | S3 credentials |
//! | `CUBEJS_DB_EXPORT_BUCKET_AZURE_KEY` | Azure storage account key |
//! | `CUBEJS_DB_EXPORT_BUCKET_AZURE_TENANT_ID` / `_CLIENT_ID` / `_CLIENT_SECRET` | Azure service principal |
//! | `CUBEJS_DB_EXPORT_GCS_CREDENTIALS` | Base64-encoded GCS service account JSON |
//! | `CUBEJS_DB_POLL_MAX_INTERVAL` | Statement poll interval in seconds |
//!
//! For a named data source the `CUBEJS_` prefix becomes `CUBEJS_DS_<NAME>_`.

use crate::client::HttpClientConfig;
use crate::error::{Error, Result};
use crate::logging::LogConfig;
use base64::{engine::general_purpose::STANDARD, Engine};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Name of the data source that reads unscoped variables.
pub const DEFAULT_DATA_SOURCE: &str = "default";

const DEV_PRE_AGGREGATIONS_SCHEMA: &str = "dev_pre_aggregations";
const PROD_PRE_AGGREGATIONS_SCHEMA: &str = "prod_pre_aggregations";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Supported export bucket providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketProvider {
    S3,
    Gcs,
    Azure,
}

impl BucketProvider {
    pub const ALL: [BucketProvider; 3] = [BucketProvider::S3, BucketProvider::Gcs, BucketProvider::Azure];

    pub fn as_str(&self) -> &'static str {
        match self {
            BucketProvider::S3 => "s3",
            BucketProvider::Gcs => "gcs",
            BucketProvider::Azure => "azure",
        }
    }
}

impl fmt::Display for BucketProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BucketProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        BucketProvider::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| Error::UnsupportedProvider(s.to_string()))
    }
}

/// Export bucket settings. Immutable once the driver is built.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct BucketConfig {
    /// Raw provider kind; parsed into [`BucketProvider`] at unload time.
    pub bucket_type: Option<String>,
    /// Bucket URL, e.g. `s3://bucket/path` or
    /// `wasbs://container@account.blob.core.windows.net/path`.
    pub export_bucket: Option<String>,
    /// DBFS mount directory; takes precedence over `export_bucket` as the
    /// external table location.
    pub mount_dir: Option<String>,
    pub csv_escape_symbol: Option<String>,

    pub aws_key: Option<String>,
    pub aws_secret: Option<String>,
    pub aws_region: Option<String>,

    pub azure_key: Option<String>,
    pub azure_tenant_id: Option<String>,
    pub azure_client_id: Option<String>,
    pub azure_client_secret: Option<String>,

    /// Service account JSON (already base64-decoded).
    pub gcs_credentials: Option<String>,
}

impl BucketConfig {
    /// Parse the configured provider kind.
    pub fn provider(&self) -> Result<BucketProvider> {
        self.bucket_type
            .as_deref()
            .unwrap_or_default()
            .parse()
    }

    /// Location the external table writes to.
    pub fn location_root(&self) -> Option<&str> {
        self.mount_dir.as_deref().or(self.export_bucket.as_deref())
    }
}

impl fmt::Debug for BucketConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BucketConfig")
            .field("bucket_type", &self.bucket_type)
            .field("export_bucket", &self.export_bucket)
            .field("mount_dir", &self.mount_dir)
            .field("csv_escape_symbol", &self.csv_escape_symbol)
            .field("aws_region", &self.aws_region)
            .field("has_aws_key", &self.aws_key.is_some())
            .field("has_azure_key", &self.azure_key.is_some())
            .field("azure_tenant_id", &self.azure_tenant_id)
            .field("azure_client_id", &self.azure_client_id)
            .field("has_gcs_credentials", &self.gcs_credentials.is_some())
            .finish()
    }
}

/// Top-level configuration for [`crate::Driver`].
#[derive(Clone, Default)]
pub struct DriverConfig {
    pub url: Option<String>,
    pub token: Option<String>,
    pub oauth_client_id: Option<String>,
    pub oauth_client_secret: Option<String>,
    pub catalog: Option<String>,
    /// Restricts schema browsing to a single schema.
    pub database: Option<String>,
    /// Defaults to `true` when no export bucket is configured.
    pub read_only: Option<bool>,
    pub poll_interval: Option<Duration>,
    /// Schema holding pre-aggregation tables, rewritten under the catalog.
    pub pre_aggregations_schema: Option<String>,
    pub bucket: BucketConfig,
    pub http: HttpClientConfig,
    pub log: LogConfig,
}

impl fmt::Debug for DriverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverConfig")
            .field("url", &self.url.as_ref().map(|_| "<set>"))
            .field("has_token", &self.token.is_some())
            .field("oauth_client_id", &self.oauth_client_id)
            .field("catalog", &self.catalog)
            .field("database", &self.database)
            .field("read_only", &self.read_only)
            .field("poll_interval", &self.poll_interval)
            .field("pre_aggregations_schema", &self.pre_aggregations_schema)
            .field("bucket", &self.bucket)
            .finish()
    }
}

impl DriverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_oauth(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.oauth_client_id = Some(client_id.into());
        self.oauth_client_secret = Some(client_secret.into());
        self
    }

    pub fn with_catalog(mut self, catalog: impl Into<String>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = Some(read_only);
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    pub fn with_pre_aggregations_schema(mut self, schema: impl Into<String>) -> Self {
        self.pre_aggregations_schema = Some(schema.into());
        self
    }

    pub fn with_bucket(mut self, bucket: BucketConfig) -> Self {
        self.bucket = bucket;
        self
    }

    pub fn with_http_config(mut self, http: HttpClientConfig) -> Self {
        self.http = http;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log.level = Some(level.into());
        self
    }

    pub fn with_log_file(mut self, path: impl Into<String>) -> Self {
        self.log.file = Some(path.into());
        self
    }

    pub fn read_only(&self) -> bool {
        self.read_only
            .unwrap_or_else(|| self.bucket.export_bucket.is_none())
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL)
    }

    /// Pre-aggregation schema. Unset means dev mode, as with an unset `NODE_ENV`.
    pub fn pre_aggregations_schema(&self) -> &str {
        self.pre_aggregations_schema
            .as_deref()
            .unwrap_or(DEV_PRE_AGGREGATIONS_SCHEMA)
    }

    /// Load configuration from the process environment.
    pub fn from_env(data_source: Option<&str>) -> Result<Self> {
        Self::from_lookup(data_source, |key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(data_source: Option<&str>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_source = data_source.unwrap_or(DEFAULT_DATA_SOURCE);
        let get = |name: &str| {
            lookup(&scoped_key(name, data_source)).filter(|v| !v.trim().is_empty())
        };

        let gcs_credentials = get("CUBEJS_DB_EXPORT_GCS_CREDENTIALS")
            .map(|encoded| decode_gcs_credentials(&encoded))
            .transpose()?;

        let poll_interval = get("CUBEJS_DB_POLL_MAX_INTERVAL")
            .map(|v| {
                v.trim().parse::<u64>().map(Duration::from_secs).map_err(|_| {
                    Error::config(format!("CUBEJS_DB_POLL_MAX_INTERVAL is not a number: {}", v))
                })
            })
            .transpose()?;

        let pre_aggregations_schema = lookup("CUBEJS_PRE_AGGREGATIONS_SCHEMA")
            .filter(|v| !v.is_empty())
            .or_else(|| {
                let dev_mode = lookup("NODE_ENV").as_deref() != Some("production")
                    || lookup("CUBEJS_DEV_MODE")
                        .as_deref()
                        .and_then(parse_bool)
                        .unwrap_or(false);
                Some(if dev_mode {
                    DEV_PRE_AGGREGATIONS_SCHEMA.to_string()
                } else {
                    PROD_PRE_AGGREGATIONS_SCHEMA.to_string()
                })
            });

        Ok(Self {
            url: get("CUBEJS_DB_DATABRICKS_URL").or_else(|| get("CUBEJS_JDBC_URL")),
            token: get("CUBEJS_DB_DATABRICKS_TOKEN"),
            oauth_client_id: get("CUBEJS_DB_DATABRICKS_OAUTH_CLIENT_ID"),
            oauth_client_secret: get("CUBEJS_DB_DATABRICKS_OAUTH_CLIENT_SECRET"),
            catalog: get("CUBEJS_DB_DATABRICKS_CATALOG"),
            database: get("CUBEJS_DB_NAME"),
            read_only: None,
            poll_interval,
            pre_aggregations_schema,
            bucket: BucketConfig {
                bucket_type: get("CUBEJS_DB_EXPORT_BUCKET_TYPE"),
                export_bucket: get("CUBEJS_DB_EXPORT_BUCKET"),
                mount_dir: get("CUBEJS_DB_EXPORT_BUCKET_MOUNT_DIR"),
                csv_escape_symbol: get("CUBEJS_DB_EXPORT_BUCKET_CSV_ESCAPE_SYMBOL"),
                aws_key: get("CUBEJS_DB_EXPORT_BUCKET_AWS_KEY"),
                aws_secret: get("CUBEJS_DB_EXPORT_BUCKET_AWS_SECRET"),
                aws_region: get("CUBEJS_DB_EXPORT_BUCKET_AWS_REGION"),
                azure_key: get("CUBEJS_DB_EXPORT_BUCKET_AZURE_KEY"),
                azure_tenant_id: get("CUBEJS_DB_EXPORT_BUCKET_AZURE_TENANT_ID"),
                azure_client_id: get("CUBEJS_DB_EXPORT_BUCKET_AZURE_CLIENT_ID"),
                azure_client_secret: get("CUBEJS_DB_EXPORT_BUCKET_AZURE_CLIENT_SECRET"),
                gcs_credentials,
            },
            http: HttpClientConfig::default(),
            log: LogConfig::default(),
        })
    }
}

/// Map `CUBEJS_X` to `CUBEJS_DS_<SOURCE>_X` for non-default data sources.
fn scoped_key(name: &str, data_source: &str) -> String {
    if data_source == DEFAULT_DATA_SOURCE {
        return name.to_string();
    }
    match name.strip_prefix("CUBEJS_") {
        Some(rest) => format!("CUBEJS_DS_{}_{}", data_source.to_uppercase(), rest),
        None => name.to_string(),
    }
}

fn decode_gcs_credentials(encoded: &str) -> Result<String> {
    let bytes = STANDARD.decode(encoded.trim()).map_err(|e| {
        Error::config(format!("CUBEJS_DB_EXPORT_GCS_CREDENTIALS is not valid base64: {}", e))
    })?;
    let json = String::from_utf8(bytes).map_err(|_| {
        Error::config("CUBEJS_DB_EXPORT_GCS_CREDENTIALS does not decode to UTF-8")
    })?;
    serde_json::from_str::<serde_json::Value>(&json).map_err(|e| {
        Error::config(format!("CUBEJS_DB_EXPORT_GCS_CREDENTIALS is not JSON: {}", e))
    })?;
    Ok(json)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
