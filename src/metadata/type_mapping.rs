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

//! Databricks type → generic type mapping.
//!
//! Raw type names from `DESCRIBE` output are lower-cased and looked up in a
//! [`TypeOverrides`] table first; misses fall through to a
//! [`GenericTypeMapper`].

use super::types::GenericType;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Fallback mapping from a raw type name to a generic type.
pub trait GenericTypeMapper: Send + Sync + fmt::Debug {
    fn to_generic_type(&self, raw_type: &str) -> GenericType;
}

/// Default mapper: exact lower-case lookup, unknown types pass through.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTypeMapper;

impl GenericTypeMapper for DefaultTypeMapper {
    fn to_generic_type(&self, raw_type: &str) -> GenericType {
        let lower = raw_type.trim().to_lowercase();
        match lower.as_str() {
            "string" | "text" | "varchar" | "nvarchar" | "character varying" | "enum" => {
                GenericType::Text
            }
            "int" | "integer" | "tinyint" | "smallint" => GenericType::Int,
            "bigint" | "int8" => GenericType::Bigint,
            "float" => GenericType::Float,
            "double" | "double precision" | "float8" => GenericType::Double,
            "decimal" | "numeric" => GenericType::Decimal,
            "boolean" => GenericType::Boolean,
            "timestamp" | "timestamp_ntz" | "timestamp without time zone" | "datetime" => {
                GenericType::Timestamp
            }
            "date" => GenericType::Date,
            "time" => GenericType::String,
            _ => GenericType::Other(raw_type.to_string()),
        }
    }
}

/// Raw-type overrides consulted before the fallback mapper.
///
/// Keys are stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeOverrides {
    entries: HashMap<String, GenericType>,
}

impl TypeOverrides {
    /// An empty table.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Add or replace an override.
    pub fn with(mut self, raw_type: &str, generic_type: GenericType) -> Self {
        self.insert(raw_type, generic_type);
        self
    }

    pub fn insert(&mut self, raw_type: &str, generic_type: GenericType) {
        self.entries.insert(raw_type.to_lowercase(), generic_type);
    }

    pub fn get(&self, raw_type: &str) -> Option<&GenericType> {
        self.entries.get(&raw_type.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TypeOverrides {
    /// `binary` columns hold HLL sketches; `decimal(10,0)` is an integer key.
    fn default() -> Self {
        Self::empty()
            .with("binary", GenericType::HllDatasketches)
            .with("decimal(10,0)", GenericType::Bigint)
    }
}

/// Override table plus fallback.
#[derive(Debug, Clone)]
pub struct TypeMapping {
    overrides: TypeOverrides,
    fallback: Arc<dyn GenericTypeMapper>,
}

impl TypeMapping {
    pub fn new(overrides: TypeOverrides, fallback: Arc<dyn GenericTypeMapper>) -> Self {
        Self {
            overrides,
            fallback,
        }
    }

    pub fn overrides(&self) -> &TypeOverrides {
        &self.overrides
    }

    pub fn map(&self, raw_type: &str) -> GenericType {
        match self.overrides.get(raw_type) {
            Some(generic) => generic.clone(),
            None => self.fallback.to_generic_type(raw_type),
        }
    }
}

impl Default for TypeMapping {
    fn default() -> Self {
        Self::new(TypeOverrides::default(), Arc::new(DefaultTypeMapper))
    }
}
