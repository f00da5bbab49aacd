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

//! Table and query metadata.
//!
//! ## Module Structure
//!
//! - `types`: generic types and metadata result rows
//! - `type_mapping`: raw type → generic type, with an override table
//! - `sql`: SQL command builder
//! - `resolver`: `DESCRIBE`-based column type resolution
//! - `service`: schema browsing

pub mod resolver;
pub mod service;
pub mod sql;
pub mod type_mapping;
pub mod types;

pub use resolver::ColumnTypeResolver;
pub use service::{MetadataService, TablesSchema};
pub use sql::SqlCommandBuilder;
pub use type_mapping::{DefaultTypeMapper, GenericTypeMapper, TypeMapping, TypeOverrides};
pub use types::{ColumnDescriptor, GenericType, TableColumn, TableRef};
