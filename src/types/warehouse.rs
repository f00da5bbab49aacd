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

//! Types for `GET /api/2.0/sql/warehouses/{id}`.

use serde::Deserialize;

/// Subset of the warehouse description used for health checks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WarehouseInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// e.g. `RUNNING`, `STOPPED`, `DELETING`, `DELETED`.
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub health: Option<WarehouseHealth>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WarehouseHealth {
    /// e.g. `HEALTHY`, `DEGRADED`, `FAILED`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}
