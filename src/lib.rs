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

//! Databricks connector for an analytics query engine.
//!
//! ## Overview
//!
//! The connector sits between a query engine and a Databricks SQL
//! warehouse:
//! - [`Driver`] - entry point; wires the components below from a
//!   [`DriverConfig`]
//! - [`CredentialBroker`] - caches and refreshes the OAuth bearer token
//! - [`health::WarehouseHealthProbe`] - warehouse liveness check
//! - [`NamespaceResolver`] - Unity Catalog name qualification
//! - [`metadata::ColumnTypeResolver`] - `DESCRIBE` → generic column types
//! - [`UnloadOrchestrator`] - bulk export to S3, Azure Blob Storage or GCS
//!
//! SQL goes through the [`SqlExecutor`] trait; [`client::SeaExecutor`]
//! implements it over the Statement Execution API.
//!
//! ## Example
//!
//! ```ignore
//! use databricks_connector::{Driver, DriverConfig, UnloadOptions};
//!
//! let driver = Driver::new(DriverConfig::from_env(None)?)?;
//! driver.test_connection().await?;
//! let manifest = driver.unload("prod_pre_aggregations.orders", &UnloadOptions::table()).await?;
//! for file in &manifest.files {
//!     println!("{}", file);
//! }
//! ```
//!
//! ## Configuration
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `CUBEJS_DB_DATABRICKS_URL` | JDBC URL with `httpPath` |
//! | `CUBEJS_DB_DATABRICKS_TOKEN` | Personal access token |
//! | `CUBEJS_DB_DATABRICKS_OAUTH_CLIENT_ID` | OAuth M2M client id |
//! | `CUBEJS_DB_DATABRICKS_OAUTH_CLIENT_SECRET` | OAuth M2M client secret |
//! | `CUBEJS_DB_DATABRICKS_CATALOG` | Unity Catalog name |
//! | `CUBEJS_DB_EXPORT_BUCKET_TYPE` | `s3`, `gcs` or `azure` |
//! | `CUBEJS_DB_EXPORT_BUCKET` | Export bucket URL |
//!
//! See [`config`] for the full list.

pub mod auth;
pub mod client;
pub mod config;
pub mod driver;
pub mod error;
pub mod health;
pub mod jdbc_url;
pub mod logging;
pub mod metadata;
pub mod namespace;
#[cfg(test)]
mod testing;
pub mod types;
pub mod unload;

// Re-export main types
pub use auth::{AuthConfig, AuthProvider, CredentialBroker, CredentialState, TokenExchange};
pub use client::{Row, SqlExecutor};
pub use config::{BucketConfig, BucketProvider, DriverConfig};
pub use driver::{Driver, DriverCapabilities, DriverParts};
pub use error::{Error, Result};
pub use health::HealthProbe;
pub use metadata::{ColumnDescriptor, GenericType, TypeMapping, TypeOverrides};
pub use namespace::NamespaceResolver;
pub use unload::{
    FileExtractor, ProviderCredentials, UnloadManifest, UnloadOptions, UnloadOrchestrator,
};
