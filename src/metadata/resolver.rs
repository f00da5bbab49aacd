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

//! Column type introspection through `DESCRIBE`.
//!
//! Databricks appends partitioning and table details to `DESCRIBE` output
//! after a row with an empty `col_name`. That row and everything after it is
//! discarded.

use super::sql::SqlCommandBuilder;
use super::type_mapping::TypeMapping;
use super::types::ColumnDescriptor;
use crate::client::{QueryParam, Row, SqlExecutor};
use crate::error::Result;
use crate::namespace::NamespaceResolver;
use std::sync::Arc;
use tracing::debug;

const COL_NAME: &str = "col_name";
const DATA_TYPE: &str = "data_type";

/// Resolves table and query shapes into [`ColumnDescriptor`]s.
#[derive(Debug, Clone)]
pub struct ColumnTypeResolver {
    executor: Arc<dyn SqlExecutor>,
    namespace: NamespaceResolver,
    mapping: TypeMapping,
}

impl ColumnTypeResolver {
    pub fn new(
        executor: Arc<dyn SqlExecutor>,
        namespace: NamespaceResolver,
        mapping: TypeMapping,
    ) -> Self {
        Self {
            executor,
            namespace,
            mapping,
        }
    }

    pub fn mapping(&self) -> &TypeMapping {
        &self.mapping
    }

    /// Columns of a `schema.table` or `catalog.schema.table` reference.
    pub async fn describe_table(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        let qualified = self.namespace.qualify_table_reference(table);
        let sql = SqlCommandBuilder::describe_table(&qualified);
        debug!("Describing table {}", qualified);

        let rows = self.executor.query(&sql, &[]).await?;
        Ok(self.columns_from_rows(&rows))
    }

    /// Result columns of an ad-hoc query.
    pub async fn describe_query(
        &self,
        sql: &str,
        params: &[QueryParam],
    ) -> Result<Vec<ColumnDescriptor>> {
        let rows = self
            .executor
            .query(&SqlCommandBuilder::describe_query(sql), params)
            .await?;
        Ok(self.columns_from_rows(&rows))
    }

    fn columns_from_rows(&self, rows: &[Row]) -> Vec<ColumnDescriptor> {
        rows.iter()
            .map(|row| (row.get(COL_NAME).unwrap_or(""), row.get(DATA_TYPE).unwrap_or("")))
            .take_while(|(name, _)| !name.is_empty())
            .map(|(name, data_type)| ColumnDescriptor::new(name, self.mapping.map(data_type)))
            .collect()
    }
}
