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

//! Databricks driver.
//!
//! [`Driver`] is the composition root: it validates configuration, builds
//! the credential broker, health probe, SQL executor, namespace resolver and
//! unload orchestrator, and exposes the operations the query engine calls.

use crate::auth::{AuthConfig, CredentialBroker};
use crate::client::{
    build_reqwest_client, DatabricksHttpClient, QueryParam, Row, SeaExecutor, SeaExecutorConfig,
    SqlExecutor,
};
use crate::config::DriverConfig;
use crate::error::{Error, Result};
use crate::health::{HealthProbe, WarehouseHealthProbe};
use crate::jdbc_url::{ConnectionProperties, JdbcUrl};
use crate::logging::init_logging;
use crate::metadata::{
    ColumnDescriptor, ColumnTypeResolver, MetadataService, SqlCommandBuilder, TableColumn,
    TableRef, TablesSchema, TypeMapping,
};
use crate::namespace::NamespaceResolver;
use crate::unload::{
    ExtractorSet, ObjectStoreExtractor, UnloadManifest, UnloadOptions, UnloadOrchestrator,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

const DEFAULT_CONCURRENCY: usize = 10;

/// Features the driver supports beyond plain querying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DriverCapabilities {
    pub unload_without_temp_table: bool,
    pub incremental_schema_loading: bool,
}

/// Pluggable collaborators of a [`Driver`].
#[derive(Debug, Clone)]
pub struct DriverParts {
    pub connection: ConnectionProperties,
    pub broker: Arc<CredentialBroker>,
    pub health: Arc<dyn HealthProbe>,
    pub executor: Arc<dyn SqlExecutor>,
    pub type_mapping: TypeMapping,
    pub extractors: ExtractorSet,
}

/// Databricks connector for one data source.
#[derive(Debug)]
pub struct Driver {
    config: DriverConfig,
    connection: ConnectionProperties,
    broker: Arc<CredentialBroker>,
    health: Arc<dyn HealthProbe>,
    executor: Arc<dyn SqlExecutor>,
    namespace: NamespaceResolver,
    resolver: ColumnTypeResolver,
    metadata: MetadataService,
    unloader: UnloadOrchestrator,
}

impl Driver {
    /// Build a driver talking to the warehouse named in `config.url`.
    ///
    /// Fails when the URL is missing or malformed, or when the credentials
    /// are missing or ambiguous.
    pub fn new(config: DriverConfig) -> Result<Self> {
        init_logging(&config.log);

        let url = config
            .url
            .as_deref()
            .ok_or_else(|| Error::config("The JDBC URL is not configured"))?;
        let jdbc = JdbcUrl::parse(url)?;
        show_deprecations(&jdbc);

        let token = config.token.as_deref().or(jdbc.pwd.as_deref());
        let auth = AuthConfig::resolve(
            &jdbc.uid,
            token,
            config.oauth_client_id.as_deref(),
            config.oauth_client_secret.as_deref(),
        )?;
        debug!("Resolved credentials: {:?}", auth);

        let host = jdbc.properties.host.clone();
        let client = build_reqwest_client(&config.http)?;
        let broker = Arc::new(CredentialBroker::new(&auth, client.clone(), &host));
        let http_client = Arc::new(DatabricksHttpClient::with_client(
            client.clone(),
            config.http.clone(),
            broker.clone(),
        ));
        let executor = Arc::new(SeaExecutor::new(
            http_client,
            host,
            jdbc.properties.warehouse_id.clone(),
            SeaExecutorConfig {
                catalog: config.catalog.clone(),
                poll_interval: config.poll_interval(),
                ..Default::default()
            },
        ));

        let parts = DriverParts {
            connection: jdbc.properties,
            broker,
            health: Arc::new(WarehouseHealthProbe::new(client)),
            executor,
            type_mapping: TypeMapping::default(),
            extractors: ExtractorSet::uniform(Arc::new(ObjectStoreExtractor::new())),
        };
        Ok(Self::from_parts(config, parts))
    }

    /// Build a driver from already constructed collaborators.
    pub fn from_parts(config: DriverConfig, parts: DriverParts) -> Self {
        let namespace = NamespaceResolver::new(config.catalog.clone());
        let resolver = ColumnTypeResolver::new(
            parts.executor.clone(),
            namespace.clone(),
            parts.type_mapping,
        );
        let metadata =
            MetadataService::new(parts.executor.clone(), namespace.clone(), resolver.clone());
        let unloader = UnloadOrchestrator::new(
            parts.executor.clone(),
            namespace.clone(),
            resolver.clone(),
            config.bucket.clone(),
            parts.extractors,
        );

        Self {
            config,
            connection: parts.connection,
            broker: parts.broker,
            health: parts.health,
            executor: parts.executor,
            namespace,
            resolver,
            metadata,
            unloader,
        }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn namespace(&self) -> &NamespaceResolver {
        &self.namespace
    }

    /// Check credentials and warehouse health.
    pub async fn test_connection(&self) -> Result<()> {
        let auth_header = self.broker.authorization_header().await?;
        self.health
            .check(
                &self.connection.host,
                &self.connection.warehouse_id,
                &auth_header,
            )
            .await
    }

    /// Execute `sql`, qualifying pre-aggregation schema references with the catalog.
    pub async fn query(&self, sql: &str, params: &[QueryParam]) -> Result<Vec<Row>> {
        let sql = self
            .namespace
            .rewrite_schema_references(sql, self.config.pre_aggregations_schema());
        self.executor.query(&sql, params).await
    }

    /// Execute the load statement of a pre-aggregation table.
    ///
    /// References to the table's schema are qualified with the catalog.
    pub async fn load_pre_aggregation_into_table(
        &self,
        table: &str,
        load_sql: &str,
        params: &[QueryParam],
    ) -> Result<()> {
        let schema = table.split('.').next().unwrap_or(table);
        let sql = self.namespace.rewrite_schema_references(load_sql, schema);
        self.executor.query(&sql, params).await?;
        Ok(())
    }

    pub async fn drop_table(&self, table: &str) -> Result<()> {
        let sql = SqlCommandBuilder::drop_table(&self.namespace.with_catalog_prefix(table));
        self.executor.query(&sql, &[]).await?;
        Ok(())
    }

    pub async fn create_schema_if_not_exists(&self, schema: &str) -> Result<()> {
        self.metadata.create_schema_if_not_exists(schema).await
    }

    pub async fn get_schemas(&self) -> Result<Vec<String>> {
        self.metadata.get_schemas().await
    }

    pub async fn get_tables_for_specific_schemas(
        &self,
        schemas: &[String],
    ) -> Result<Vec<TableRef>> {
        self.metadata.get_tables_for_specific_schemas(schemas).await
    }

    pub async fn get_columns_for_specific_tables(
        &self,
        tables: &[TableRef],
    ) -> Result<Vec<TableColumn>> {
        self.metadata.get_columns_for_specific_tables(tables).await
    }

    /// Every table's columns, limited to the configured database if set.
    pub async fn tables_schema(&self) -> Result<TablesSchema> {
        self.metadata
            .tables_schema(self.config.database.as_deref())
            .await
    }

    pub async fn table_column_types(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        self.resolver.describe_table(table).await
    }

    pub async fn query_column_types(
        &self,
        sql: &str,
        params: &[QueryParam],
    ) -> Result<Vec<ColumnDescriptor>> {
        self.resolver.describe_query(sql, params).await
    }

    pub fn capabilities(&self) -> DriverCapabilities {
        DriverCapabilities {
            unload_without_temp_table: true,
            incremental_schema_loading: true,
        }
    }

    pub fn read_only(&self) -> bool {
        self.config.read_only()
    }

    pub fn is_unload_supported(&self) -> bool {
        self.config.bucket.export_bucket.is_some()
    }

    pub fn default_concurrency(&self) -> usize {
        DEFAULT_CONCURRENCY
    }

    /// Export `table`, or `options.query`, to the export bucket.
    pub async fn unload(&self, table: &str, options: &UnloadOptions) -> Result<UnloadManifest> {
        self.unloader.unload(table, options).await
    }
}

fn show_deprecations(jdbc: &JdbcUrl) {
    if jdbc.spark_protocol {
        warn!("jdbc:spark:// URLs are deprecated, use jdbc:databricks:// instead");
    }
    if jdbc.pwd.is_some() {
        warn!("PWD in the JDBC URL is deprecated, use CUBEJS_DB_DATABRICKS_TOKEN instead");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str =
        "jdbc:databricks://dbc-1.cloud.databricks.com:443/default;transportMode=http;ssl=1;AuthMech=3;httpPath=/sql/1.0/warehouses/abc123";

    #[test]
    fn test_new_requires_url() {
        let err = Driver::new(DriverConfig::new().with_token("dapi")).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_new_rejects_ambiguous_credentials() {
        let config = DriverConfig::new()
            .with_url(URL)
            .with_token("dapi")
            .with_oauth("id", "secret");
        assert!(Driver::new(config).unwrap_err().is_configuration());
    }

    #[test]
    fn test_new_rejects_missing_credentials() {
        let err = Driver::new(DriverConfig::new().with_url(URL)).unwrap_err();
        assert!(matches!(err, Error::Configuration(ref m) if m == "No credentials provided"));
    }

    #[test]
    fn test_pwd_in_url_counts_as_token() {
        let driver = Driver::new(DriverConfig::new().with_url(format!("{};PWD=dapi", URL))).unwrap();
        assert_eq!(driver.connection.warehouse_id, "abc123");
        assert_eq!(driver.connection.host, "dbc-1.cloud.databricks.com");
        assert!(!driver.broker.is_oauth());
    }

    #[test]
    fn test_oauth_driver() {
        let driver = Driver::new(
            DriverConfig::new()
                .with_url(URL)
                .with_oauth("id", "secret")
                .with_catalog("main"),
        )
        .unwrap();
        assert!(driver.broker.is_oauth());
        assert_eq!(driver.namespace().catalog(), Some("main"));
    }

    #[test]
    fn test_static_properties() {
        let driver = Driver::new(DriverConfig::new().with_url(URL).with_token("dapi")).unwrap();
        assert!(driver.read_only());
        assert!(!driver.is_unload_supported());
        assert_eq!(driver.default_concurrency(), 10);
        assert_eq!(
            driver.capabilities(),
            DriverCapabilities {
                unload_without_temp_table: true,
                incremental_schema_loading: true,
            }
        );
    }
}
