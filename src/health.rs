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

//! SQL warehouse health probe.
//!
//! One authenticated `GET /api/2.0/sql/warehouses/{id}`. The response is
//! classified by [`evaluate`]: a warehouse being deleted or reporting a
//! `FAILED` health status is an error, anything else (including `DEGRADED`)
//! passes.

use crate::client::base_url;
use crate::error::{Error, Result};
use crate::types::warehouse::WarehouseInfo;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use tracing::{debug, warn};

const TERMINAL_STATES: [&str; 2] = ["DELETING", "DELETED"];
const FAILED_HEALTH: &str = "FAILED";

/// Checks that a warehouse is reachable and usable.
#[async_trait]
pub trait HealthProbe: Send + Sync + std::fmt::Debug {
    async fn check(&self, host: &str, warehouse_id: &str, auth_header: &str) -> Result<()>;
}

/// [`HealthProbe`] against the warehouses REST endpoint.
///
/// Issues exactly one request; no retries.
#[derive(Debug, Clone)]
pub struct WarehouseHealthProbe {
    client: Client,
}

impl WarehouseHealthProbe {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn warehouse_url(host: &str, warehouse_id: &str) -> String {
        format!("{}/api/2.0/sql/warehouses/{}", base_url(host), warehouse_id)
    }
}

#[async_trait]
impl HealthProbe for WarehouseHealthProbe {
    async fn check(&self, host: &str, warehouse_id: &str, auth_header: &str) -> Result<()> {
        let url = Self::warehouse_url(host, warehouse_id);
        debug!("Checking warehouse health at {}", url);

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, auth_header)
            .send()
            .await
            .map_err(|e| Error::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Unreachable(
                status.canonical_reason().unwrap_or(status.as_str()).to_string(),
            ));
        }

        let info: WarehouseInfo = response
            .json()
            .await
            .map_err(|e| Error::Unreachable(format!("Invalid warehouse response: {}", e)))?;

        evaluate(&info)
    }
}

/// Classify a warehouse description.
pub fn evaluate(info: &WarehouseInfo) -> Result<()> {
    if let Some(state) = info.state.as_deref() {
        if TERMINAL_STATES.contains(&state) {
            return Err(Error::TerminalState(state.to_string()));
        }
    }

    if let Some(health) = &info.health {
        match health.status.as_deref() {
            Some(FAILED_HEALTH) => {
                return Err(Error::Unhealthy {
                    summary: health.summary.clone().unwrap_or_default(),
                    details: health.details.clone().unwrap_or_default(),
                });
            }
            Some("DEGRADED") => {
                warn!(
                    "Warehouse reports degraded health: {}",
                    health.summary.as_deref().unwrap_or("")
                );
            }
            _ => {}
        }
    }

    Ok(())
}
