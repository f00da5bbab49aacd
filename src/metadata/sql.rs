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

//! SQL command builder for metadata and unload statements.
//!
//! Identifiers passed in are expected to be quoted or qualified already by
//! [`crate::namespace::NamespaceResolver`]; this module only assembles text.

/// Builds SQL command text.
pub struct SqlCommandBuilder;

impl SqlCommandBuilder {
    /// `DESCRIBE <qualified table>`.
    pub fn describe_table(qualified_table: &str) -> String {
        format!("DESCRIBE {}", qualified_table)
    }

    /// `DESCRIBE QUERY <sql>`.
    pub fn describe_query(sql: &str) -> String {
        format!("DESCRIBE QUERY {}", sql)
    }

    /// `SHOW DATABASES`, scoped to a quoted catalog when given.
    pub fn show_databases(quoted_catalog: Option<&str>) -> String {
        match quoted_catalog {
            Some(catalog) => format!("SHOW DATABASES IN {}", catalog),
            None => "SHOW DATABASES".to_string(),
        }
    }

    /// `SHOW TABLES IN <qualified schema>`.
    pub fn show_tables(qualified_schema: &str) -> String {
        format!("SHOW TABLES IN {}", qualified_schema)
    }

    pub fn create_schema_if_not_exists(qualified_schema: &str) -> String {
        format!("CREATE SCHEMA IF NOT EXISTS {}", qualified_schema)
    }

    pub fn drop_table(table: &str) -> String {
        format!("DROP TABLE {}", table)
    }

    /// External CSV table over `location`, filled from `select`.
    pub fn create_external_csv_table(table: &str, location: &str, select: &str) -> String {
        format!(
            "CREATE TABLE {} USING CSV LOCATION '{}' OPTIONS (escape = '\"') AS ({})",
            table,
            escape_string_literal(location),
            select
        )
    }

    pub fn drop_table_if_exists(table: &str) -> String {
        format!("DROP TABLE IF EXISTS {};", table)
    }

    /// `SELECT <columns> FROM <source>`.
    pub fn select(columns: &[String], source: &str) -> String {
        let projection = if columns.is_empty() {
            "*".to_string()
        } else {
            columns.join(", ")
        };
        format!("SELECT {} FROM {}", projection, source)
    }
}

/// Escape single quotes for use inside a `'...'` literal.
pub fn escape_string_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        assert_eq!(
            SqlCommandBuilder::describe_table("`c`.`s`.`t`"),
            "DESCRIBE `c`.`s`.`t`"
        );
        assert_eq!(
            SqlCommandBuilder::describe_query("SELECT 1"),
            "DESCRIBE QUERY SELECT 1"
        );
    }

    #[test]
    fn test_show_databases() {
        assert_eq!(SqlCommandBuilder::show_databases(None), "SHOW DATABASES");
        assert_eq!(
            SqlCommandBuilder::show_databases(Some("`main`")),
            "SHOW DATABASES IN `main`"
        );
    }

    #[test]
    fn test_show_tables() {
        assert_eq!(
            SqlCommandBuilder::show_tables("`main`.`sales`"),
            "SHOW TABLES IN `main`.`sales`"
        );
    }

    #[test]
    fn test_create_external_csv_table() {
        let sql = SqlCommandBuilder::create_external_csv_table(
            "main.pre.t_tmp",
            "s3://bucket/main.pre.t",
            "SELECT * FROM main.pre.t",
        );
        assert_eq!(
            sql,
            "CREATE TABLE main.pre.t_tmp USING CSV LOCATION 's3://bucket/main.pre.t' \
             OPTIONS (escape = '\"') AS (SELECT * FROM main.pre.t)"
        );
    }

    #[test]
    fn test_drop_statements() {
        assert_eq!(
            SqlCommandBuilder::drop_table_if_exists("s.t_tmp"),
            "DROP TABLE IF EXISTS s.t_tmp;"
        );
        assert_eq!(SqlCommandBuilder::drop_table("c.s.t"), "DROP TABLE c.s.t");
    }

    #[test]
    fn test_select() {
        assert_eq!(SqlCommandBuilder::select(&[], "s.t"), "SELECT * FROM s.t");
        assert_eq!(
            SqlCommandBuilder::select(&["`a`".into(), "base64(`b`)".into()], "(SELECT 1)"),
            "SELECT `a`, base64(`b`) FROM (SELECT 1)"
        );
    }

    #[test]
    fn test_escape_string_literal() {
        assert_eq!(escape_string_literal("s3://b/it's"), "s3://b/it\\'s");
    }
}
