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

//! Data structures for metadata results.

use serde::{Serialize, Serializer};
use std::fmt;

/// Provider-agnostic column type.
///
/// Serializes to the lowercase name understood by the query engine.
/// `Other` carries a raw warehouse type the mappers did not recognise.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GenericType {
    Text,
    String,
    Int,
    Bigint,
    Float,
    Double,
    Decimal,
    Boolean,
    Timestamp,
    Date,
    HllDatasketches,
    Other(std::string::String),
}

impl GenericType {
    pub fn as_str(&self) -> &str {
        match self {
            GenericType::Text => "text",
            GenericType::String => "string",
            GenericType::Int => "int",
            GenericType::Bigint => "bigint",
            GenericType::Float => "float",
            GenericType::Double => "double",
            GenericType::Decimal => "decimal",
            GenericType::Boolean => "boolean",
            GenericType::Timestamp => "timestamp",
            GenericType::Date => "date",
            GenericType::HllDatasketches => "hll_datasketches",
            GenericType::Other(raw) => raw,
        }
    }

    /// Columns that cannot be written to CSV as-is.
    pub fn is_binary(&self) -> bool {
        matches!(self, GenericType::HllDatasketches)
    }
}

impl fmt::Display for GenericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for GenericType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Column name and generic type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub generic_type: GenericType,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, generic_type: GenericType) -> Self {
        Self {
            name: name.into(),
            generic_type,
        }
    }
}

/// Row of `get_tables_for_specific_schemas`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRef {
    pub schema_name: String,
    pub table_name: String,
}

/// Row of `get_columns_for_specific_tables`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableColumn {
    pub schema_name: String,
    pub table_name: String,
    pub column_name: String,
    pub data_type: GenericType,
}
