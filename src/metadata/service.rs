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

//! Schema browsing.
//!
//! `MetadataService` answers the query engine's schema-discovery calls
//! (`SHOW DATABASES`, `SHOW TABLES`, per-table `DESCRIBE`). Per-schema and
//! per-table statements run concurrently.

use super::resolver::ColumnTypeResolver;
use super::sql::SqlCommandBuilder;
use super::types::{ColumnDescriptor, TableColumn, TableRef};
use crate::client::{Row, SqlExecutor};
use crate::error::Result;
use crate::namespace::NamespaceResolver;
use futures_util::future::try_join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// `schema -> table -> columns`.
pub type TablesSchema = BTreeMap<String, BTreeMap<String, Vec<ColumnDescriptor>>>;

/// Schema browsing over a [`SqlExecutor`].
#[derive(Debug, Clone)]
pub struct MetadataService {
    executor: Arc<dyn SqlExecutor>,
    namespace: NamespaceResolver,
    resolver: ColumnTypeResolver,
}

impl MetadataService {
    pub fn new(
        executor: Arc<dyn SqlExecutor>,
        namespace: NamespaceResolver,
        resolver: ColumnTypeResolver,
    ) -> Self {
        Self {
            executor,
            namespace,
            resolver,
        }
    }

    /// Schema names in the configured catalog (or the session default).
    pub async fn get_schemas(&self) -> Result<Vec<String>> {
        let catalog = self.namespace.catalog().map(NamespaceResolver::quote_identifier);
        let sql = SqlCommandBuilder::show_databases(catalog.as_deref());
        let rows = self.executor.query(&sql, &[]).await?;

        Ok(rows
            .iter()
            .filter_map(|row| row.get("databaseName").or_else(|| row.get("namespace")))
            .map(String::from)
            .collect())
    }

    pub async fn get_tables_for_specific_schemas(&self, schemas: &[String]) -> Result<Vec<TableRef>> {
        let per_schema = try_join_all(schemas.iter().map(|s| self.show_tables(s))).await?;
        Ok(per_schema.into_iter().flatten().collect())
    }

    pub async fn get_columns_for_specific_tables(
        &self,
        tables: &[TableRef],
    ) -> Result<Vec<TableColumn>> {
        let per_table = try_join_all(tables.iter().map(|t| async move {
            let columns = self
                .resolver
                .describe_table(&format!("{}.{}", t.schema_name, t.table_name))
                .await?;
            Ok::<_, crate::Error>(
                columns
                    .into_iter()
                    .map(|c| TableColumn {
                        schema_name: t.schema_name.clone(),
                        table_name: t.table_name.clone(),
                        column_name: c.name,
                        data_type: c.generic_type,
                    })
                    .collect::<Vec<_>>(),
            )
        }))
        .await?;
        Ok(per_table.into_iter().flatten().collect())
    }

    /// Full `schema -> table -> columns` map.
    ///
    /// Restricted to `database` when given, otherwise every schema.
    pub async fn tables_schema(&self, database: Option<&str>) -> Result<TablesSchema> {
        let schemas = match database {
            Some(db) => vec![db.to_string()],
            None => self.get_schemas().await?,
        };
        let tables = self.get_tables_for_specific_schemas(&schemas).await?;
        debug!("Loading columns for {} tables", tables.len());

        let described = try_join_all(tables.into_iter().map(|t| async move {
            let columns = self
                .resolver
                .describe_table(&format!("{}.{}", t.schema_name, t.table_name))
                .await?;
            Ok::<_, crate::Error>((t, columns))
        }))
        .await?;

        let mut result = TablesSchema::new();
        for (table, columns) in described {
            result
                .entry(table.schema_name)
                .or_default()
                .insert(table.table_name, columns);
        }
        Ok(result)
    }

    pub async fn create_schema_if_not_exists(&self, schema: &str) -> Result<()> {
        let sql = SqlCommandBuilder::create_schema_if_not_exists(&self.namespace.qualify_schema(schema));
        self.executor.query(&sql, &[]).await?;
        Ok(())
    }

    async fn show_tables(&self, schema: &str) -> Result<Vec<TableRef>> {
        let sql = SqlCommandBuilder::show_tables(&self.namespace.qualify_schema(schema));
        let rows = self.executor.query(&sql, &[]).await?;
        Ok(rows.iter().filter_map(|row| table_ref(row, schema)).collect())
    }
}

fn table_ref(row: &Row, schema: &str) -> Option<TableRef> {
    let table_name = row.get("tableName")?;
    Some(TableRef {
        schema_name: row.get("database").unwrap_or(schema).to_string(),
        table_name: table_name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::QueryParam;
    use crate::metadata::type_mapping::TypeMapping;
    use crate::metadata::types::GenericType;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Answers by statement prefix; records every statement.
    #[derive(Debug, Default)]
    struct MockExecutor {
        responses: Vec<(String, Vec<Row>)>,
        calls: Mutex<Vec<String>>,
    }

    impl MockExecutor {
        fn respond(mut self, sql: &str, rows: Vec<Row>) -> Self {
            self.responses.push((sql.to_string(), rows));
            self
        }
    }

    #[async_trait]
    impl SqlExecutor for MockExecutor {
        async fn query(&self, sql: &str, _params: &[QueryParam]) -> Result<Vec<Row>> {
            self.calls.lock().unwrap().push(sql.to_string());
            Ok(self
                .responses
                .iter()
                .find(|(s, _)| s == sql)
                .map(|(_, rows)| rows.clone())
                .unwrap_or_default())
        }
    }

    fn service(executor: Arc<MockExecutor>, catalog: Option<&str>) -> MetadataService {
        let namespace = NamespaceResolver::new(catalog.map(String::from));
        let resolver =
            ColumnTypeResolver::new(executor.clone(), namespace.clone(), TypeMapping::default());
        MetadataService::new(executor, namespace, resolver)
    }

    fn db_row(name: &str) -> Row {
        Row::from_pairs([("databaseName", Some(name))])
    }

    fn table_row(db: &str, table: &str) -> Row {
        Row::from_pairs([
            ("database", Some(db)),
            ("tableName", Some(table)),
            ("isTemporary", Some("false")),
        ])
    }

    fn col_row(name: &str, data_type: &str) -> Row {
        Row::from_pairs([("col_name", Some(name)), ("data_type", Some(data_type))])
    }

    #[tokio::test]
    async fn test_get_schemas_with_catalog() {
        let executor = Arc::new(
            MockExecutor::default()
                .respond("SHOW DATABASES IN `main`", vec![db_row("a"), db_row("b")]),
        );
        let schemas = service(executor.clone(), Some("main")).get_schemas().await.unwrap();
        assert_eq!(schemas, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_get_tables_for_specific_schemas() {
        let executor = Arc::new(
            MockExecutor::default()
                .respond("SHOW TABLES IN `a`", vec![table_row("a", "t1")])
                .respond("SHOW TABLES IN `b`", vec![table_row("b", "t2")]),
        );
        let tables = service(executor, None)
            .get_tables_for_specific_schemas(&["a".into(), "b".into()])
            .await
            .unwrap();
        assert_eq!(
            tables,
            vec![
                TableRef {
                    schema_name: "a".into(),
                    table_name: "t1".into()
                },
                TableRef {
                    schema_name: "b".into(),
                    table_name: "t2".into()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_get_columns_for_specific_tables() {
        let executor = Arc::new(MockExecutor::default().respond(
            "DESCRIBE `main`.`a`.`t1`",
            vec![col_row("id", "bigint"), col_row("", "")],
        ));
        let columns = service(executor, Some("main"))
            .get_columns_for_specific_tables(&[TableRef {
                schema_name: "a".into(),
                table_name: "t1".into(),
            }])
            .await
            .unwrap();
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].column_name, "id");
        assert_eq!(columns[0].data_type, GenericType::Bigint);
    }

    #[tokio::test]
    async fn test_tables_schema_for_database() {
        let executor = Arc::new(
            MockExecutor::default()
                .respond("SHOW TABLES IN `a`", vec![table_row("a", "t1")])
                .respond("DESCRIBE `a`.`t1`", vec![col_row("name", "string")]),
        );
        let schema = service(executor.clone(), None)
            .tables_schema(Some("a"))
            .await
            .unwrap();
        assert_eq!(
            schema["a"]["t1"],
            vec![ColumnDescriptor::new("name", GenericType::Text)]
        );
        assert!(!executor
            .calls
            .lock()
            .unwrap()
            .iter()
            .any(|s| s.starts_with("SHOW DATABASES")));
    }

    #[tokio::test]
    async fn test_create_schema_if_not_exists() {
        let executor = Arc::new(MockExecutor::default());
        service(executor.clone(), Some("main"))
            .create_schema_if_not_exists("pre")
            .await
            .unwrap();
        assert_eq!(
            executor.calls.lock().unwrap().as_slice(),
            ["CREATE SCHEMA IF NOT EXISTS `main`.`pre`"]
        );
    }
}
