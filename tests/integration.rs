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

//! Integration tests for the Databricks connector driver surface.

mod common;

use async_trait::async_trait;
use common::{driver_with, RecordingExecutor, RecordingExtractor, StaticHealth};
use databricks_connector::auth::TokenResponse;
use databricks_connector::{
    CredentialBroker, DriverConfig, Error, NamespaceResolver, Result, TokenExchange,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Default)]
struct CountingExchange {
    calls: AtomicUsize,
}

#[async_trait]
impl TokenExchange for CountingExchange {
    async fn exchange(&self) -> Result<TokenResponse> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(TokenResponse {
            access_token: format!("oauth-{}", n),
            expires_in: 3600,
            token_type: Some("Bearer".to_string()),
        })
    }
}

#[tokio::test]
async fn test_connection_uses_static_token() {
    let health = Arc::new(StaticHealth::healthy());
    let driver = driver_with(
        DriverConfig::new(),
        CredentialBroker::with_static_token("dapi123"),
        health.clone(),
        Arc::default(),
        Arc::default(),
    );

    driver.test_connection().await.unwrap();
    assert_eq!(health.headers.lock().unwrap().as_slice(), ["Bearer dapi123"]);
}

#[tokio::test(start_paused = true)]
async fn test_connection_refreshes_oauth_token() {
    let exchange = Arc::new(CountingExchange::default());
    let health = Arc::new(StaticHealth::healthy());
    let driver = driver_with(
        DriverConfig::new(),
        CredentialBroker::with_exchange(exchange.clone()),
        health.clone(),
        Arc::default(),
        Arc::default(),
    );

    driver.test_connection().await.unwrap();
    tokio::time::advance(Duration::from_secs(3000)).await;
    driver.test_connection().await.unwrap();
    assert_eq!(exchange.calls.load(Ordering::SeqCst), 1);

    tokio::time::advance(Duration::from_secs(541)).await;
    driver.test_connection().await.unwrap();
    assert_eq!(exchange.calls.load(Ordering::SeqCst), 2);

    assert_eq!(
        health.headers.lock().unwrap().as_slice(),
        ["Bearer oauth-1", "Bearer oauth-1", "Bearer oauth-2"]
    );
}

#[tokio::test]
async fn test_connection_surfaces_health_errors() {
    let health = Arc::new(StaticHealth {
        outcome: || Err(Error::TerminalState("DELETED".to_string())),
        headers: Default::default(),
    });
    let driver = driver_with(
        DriverConfig::new(),
        CredentialBroker::with_static_token("dapi"),
        health,
        Arc::default(),
        Arc::default(),
    );
    let err = driver.test_connection().await.unwrap_err();
    assert!(matches!(err, Error::TerminalState(_)));
}

#[tokio::test]
async fn test_query_rewrites_pre_aggregation_schema() {
    let executor = Arc::new(RecordingExecutor::default());
    let driver = driver_with(
        DriverConfig::new()
            .with_catalog("main")
            .with_pre_aggregations_schema("dev_pre_aggregations"),
        CredentialBroker::with_static_token("dapi"),
        Arc::new(StaticHealth::healthy()),
        executor.clone(),
        Arc::default(),
    );

    driver
        .query(
            "SELECT * FROM dev_pre_aggregations.orders_abc WHERE id = ?",
            &[serde_json::json!(1)],
        )
        .await
        .unwrap();
    assert_eq!(
        executor.sql(),
        ["SELECT * FROM main.dev_pre_aggregations.orders_abc WHERE id = ?"]
    );
}

#[tokio::test]
async fn test_query_rewrites_default_dev_schema() {
    let executor = Arc::new(RecordingExecutor::default());
    let driver = driver_with(
        DriverConfig::new().with_catalog("main"),
        CredentialBroker::with_static_token("dapi"),
        Arc::new(StaticHealth::healthy()),
        executor.clone(),
        Arc::default(),
    );

    driver
        .query("SELECT * FROM dev_pre_aggregations.orders_abc", &[])
        .await
        .unwrap();
    assert_eq!(
        executor.sql(),
        ["SELECT * FROM main.dev_pre_aggregations.orders_abc"]
    );
}

#[tokio::test]
async fn test_query_without_catalog_is_untouched() {
    let executor = Arc::new(RecordingExecutor::default());
    let driver = driver_with(
        DriverConfig::new(),
        CredentialBroker::with_static_token("dapi"),
        Arc::new(StaticHealth::healthy()),
        executor.clone(),
        Arc::default(),
    );
    driver
        .query("SELECT * FROM prod_pre_aggregations.t", &[])
        .await
        .unwrap();
    assert_eq!(executor.sql(), ["SELECT * FROM prod_pre_aggregations.t"]);
}

#[tokio::test]
async fn test_load_pre_aggregation_and_drop_table() {
    let executor = Arc::new(RecordingExecutor::default());
    let driver = driver_with(
        DriverConfig::new().with_catalog("main"),
        CredentialBroker::with_static_token("dapi"),
        Arc::new(StaticHealth::healthy()),
        executor.clone(),
        Arc::default(),
    );

    driver
        .load_pre_aggregation_into_table(
            "pre.orders_v1",
            "INSERT INTO pre.orders_v1 SELECT * FROM pre.orders_src",
            &[],
        )
        .await
        .unwrap();
    driver.drop_table("pre.orders_v1").await.unwrap();

    assert_eq!(
        executor.sql(),
        [
            "INSERT INTO main.pre.orders_v1 SELECT * FROM main.pre.orders_src",
            "DROP TABLE main.pre.orders_v1",
        ]
    );
}

#[tokio::test]
async fn test_column_types_through_driver() {
    let executor = Arc::new(RecordingExecutor::with_columns(&[
        ("id", "decimal(10,0)"),
        ("payload", "binary"),
        ("", ""),
        ("Partitioning", "id"),
    ]));
    let driver = driver_with(
        DriverConfig::new(),
        CredentialBroker::with_static_token("dapi"),
        Arc::new(StaticHealth::healthy()),
        executor,
        Arc::default(),
    );

    let columns = driver.table_column_types("s.t").await.unwrap();
    let types: HashMap<_, _> = columns
        .iter()
        .map(|c| (c.name.as_str(), c.generic_type.as_str()))
        .collect();
    assert_eq!(types.len(), 2);
    assert_eq!(types["id"], "bigint");
    assert_eq!(types["payload"], "hll_datasketches");
}

#[tokio::test]
async fn test_unload_reports_manifest() {
    let executor = Arc::new(RecordingExecutor::with_columns(&[("id", "int")]));
    let extractor = Arc::new(RecordingExtractor::default());
    let config = DriverConfig::new().with_bucket(databricks_connector::BucketConfig {
        bucket_type: Some("gcs".to_string()),
        export_bucket: Some("gs://cube-exports".to_string()),
        gcs_credentials: Some("{}".to_string()),
        ..Default::default()
    });
    let driver = driver_with(
        config,
        CredentialBroker::with_static_token("dapi"),
        Arc::new(StaticHealth::healthy()),
        executor.clone(),
        extractor.clone(),
    );

    assert!(driver.is_unload_supported());
    assert!(!driver.read_only());

    let manifest = driver
        .unload("pre.orders", &databricks_connector::UnloadOptions::table())
        .await
        .unwrap();
    assert_eq!(manifest.files.len(), 2);
    assert!(manifest.headerless);

    let json = serde_json::to_value(&manifest).unwrap();
    assert_eq!(json["columns"][0]["type"], "int");

    let calls = extractor.calls.lock().unwrap();
    assert_eq!(calls[0].1, "cube-exports");
    assert_eq!(calls[0].2, "pre.orders");
}

#[test]
fn test_quote_identifier_is_idempotent() {
    for id in ["a", "`a`", "a.b", "with space", "x`y"] {
        let once = NamespaceResolver::quote_identifier(id);
        assert_eq!(NamespaceResolver::quote_identifier(&once), once);
    }
}

#[test]
fn test_qualify_table_reference_adds_catalog_first() {
    let resolver = NamespaceResolver::new(Some("c".to_string()));
    let qualified = resolver.qualify_table_reference("schema.table");
    assert_eq!(qualified, "`c`.`schema`.`table`");
    assert_eq!(
        resolver.qualify_table_reference("other.schema.table"),
        "`other`.`schema`.`table`"
    );
}
