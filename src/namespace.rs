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

//! Catalog-aware identifier qualification.
//!
//! Unity Catalog adds a third namespace level (`catalog.schema.table`) that
//! the upstream SQL generator knows nothing about. [`NamespaceResolver`]
//! patches names and SQL text so they resolve under the configured catalog.
//!
//! The SQL rewrite is textual: any whitespace-preceded `schema.` is prefixed
//! with the catalog. It does not understand string literals or comments, so a
//! literal such as `' dev_pre_aggregations.x'` is rewritten too.

use regex::{Captures, Regex};
use tracing::debug;

const QUOTE: char = '`';

/// Qualifies identifiers and SQL text with an optional catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceResolver {
    catalog: Option<String>,
}

impl NamespaceResolver {
    pub fn new(catalog: Option<String>) -> Self {
        Self {
            catalog: catalog.filter(|c| !c.is_empty()),
        }
    }

    pub fn catalog(&self) -> Option<&str> {
        self.catalog.as_deref()
    }

    /// Wrap in backticks unless already wrapped. Idempotent.
    pub fn quote_identifier(identifier: &str) -> String {
        if is_quoted(identifier) {
            return identifier.to_string();
        }
        format!("{QUOTE}{}{QUOTE}", identifier.replace(QUOTE, "``"))
    }

    /// `` `catalog`.`schema` `` when a catalog is set, else `` `schema` ``.
    pub fn qualify_schema(&self, schema: &str) -> String {
        match &self.catalog {
            Some(catalog) => format!(
                "{}.{}",
                Self::quote_identifier(catalog),
                Self::quote_identifier(schema)
            ),
            None => Self::quote_identifier(schema),
        }
    }

    /// Quote a `table`, `schema.table` or `catalog.schema.table` reference.
    ///
    /// Two-part references gain the catalog as their first part when one is
    /// configured. A bare table name is quoted and left to resolve against
    /// the session's current schema.
    pub fn qualify_table_reference(&self, table_ref: &str) -> String {
        let parts = split_reference(table_ref);
        let mut quoted: Vec<String> = parts.iter().map(|p| Self::quote_identifier(p)).collect();

        if quoted.len() == 2 {
            if let Some(catalog) = &self.catalog {
                quoted.insert(0, Self::quote_identifier(catalog));
            }
        }

        quoted.join(".")
    }

    /// Unquoted `catalog.name`, or `name` unchanged when no catalog is set.
    pub fn with_catalog_prefix(&self, name: &str) -> String {
        match &self.catalog {
            Some(catalog) => format!("{}.{}", catalog, name),
            None => name.to_string(),
        }
    }

    /// Prefix every whitespace-preceded `schema.` in `sql` with the catalog.
    ///
    /// No-op when no catalog is configured.
    pub fn rewrite_schema_references(&self, sql: &str, schema: &str) -> String {
        let Some(catalog) = &self.catalog else {
            return sql.to_string();
        };
        if schema.is_empty() {
            return sql.to_string();
        }

        let pattern = format!(r"(\s){}\.(\S)", regex::escape(schema));
        let re = match Regex::new(&pattern) {
            Ok(re) => re,
            Err(e) => {
                // An escaped literal always compiles; keep the SQL untouched otherwise.
                debug!("Schema rewrite pattern rejected: {}", e);
                return sql.to_string();
            }
        };

        re.replace_all(sql, |caps: &Captures<'_>| {
            format!("{}{}.{}.{}", &caps[1], catalog, schema, &caps[2])
        })
        .into_owned()
    }
}

fn is_quoted(identifier: &str) -> bool {
    identifier.len() >= 2 && identifier.starts_with(QUOTE) && identifier.ends_with(QUOTE)
}

/// Split on dots outside backtick-quoted parts.
fn split_reference(reference: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in reference.chars() {
        match ch {
            QUOTE => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            '.' if !in_quotes => parts.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    parts.push(current);
    parts
}
