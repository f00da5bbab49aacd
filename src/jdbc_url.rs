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

//! Parsing of Databricks JDBC connection URLs.
//!
//! URLs look like
//! `jdbc:databricks://host:443/default;transportMode=http;ssl=1;httpPath=/sql/1.0/warehouses/abc;AuthMech=3;UID=token;PWD=dapi...`.
//! Only the pieces the connector needs are extracted: host, warehouse id and
//! the legacy `UID`/`PWD` properties.

use crate::error::{Error, Result};

const DATABRICKS_PREFIX: &str = "jdbc:databricks://";
const SPARK_PREFIX: &str = "jdbc:spark://";
const DEFAULT_UID: &str = "token";

/// Host and warehouse extracted from a JDBC URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionProperties {
    pub host: String,
    pub warehouse_id: String,
}

/// A JDBC URL after normalisation and credential extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JdbcUrl {
    /// URL with `UID`/`PWD` removed and the `jdbc:databricks://` scheme.
    pub cleaned: String,
    pub uid: String,
    /// `PWD` property, if the URL carried one.
    pub pwd: Option<String>,
    /// The URL used the deprecated `jdbc:spark://` scheme.
    pub spark_protocol: bool,
    pub properties: ConnectionProperties,
}

impl JdbcUrl {
    pub fn parse(url: &str) -> Result<Self> {
        let (url, spark_protocol) = match url.find(SPARK_PREFIX) {
            Some(_) => (url.replacen(SPARK_PREFIX, DATABRICKS_PREFIX, 1), true),
            None => (url.to_string(), false),
        };

        let properties = parse_connection_properties(&url)?;

        let mut uid = None;
        let mut pwd = None;
        let mut kept = Vec::new();
        for (i, segment) in url.split(';').enumerate() {
            if i > 0 {
                if let Some((key, value)) = segment.split_once('=') {
                    if key.eq_ignore_ascii_case("UID") {
                        uid = Some(value.to_string());
                        continue;
                    }
                    if key.eq_ignore_ascii_case("PWD") {
                        pwd = Some(value.to_string());
                        continue;
                    }
                }
            }
            kept.push(segment);
        }

        Ok(Self {
            cleaned: kept.join(";"),
            uid: uid
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| DEFAULT_UID.to_string()),
            pwd: pwd.filter(|p| !p.is_empty()),
            spark_protocol,
            properties,
        })
    }
}

/// Extract host and warehouse id.
///
/// The warehouse id is the path segment following `/warehouses/` in the
/// `httpPath` property.
pub fn parse_connection_properties(url: &str) -> Result<ConnectionProperties> {
    let rest = url.strip_prefix(DATABRICKS_PREFIX).ok_or_else(|| {
        Error::config(format!(
            "JDBC URL must start with {}: {}",
            DATABRICKS_PREFIX,
            redact(url)
        ))
    })?;

    let mut segments = rest.split(';');
    let authority = segments.next().unwrap_or_default();
    let host = authority
        .split(['/', ':'])
        .next()
        .unwrap_or_default()
        .to_string();
    if host.is_empty() {
        return Err(Error::config("Missing host in JDBC URL"));
    }

    let http_path = segments
        .filter_map(|s| s.split_once('='))
        .find(|(k, _)| k.eq_ignore_ascii_case("httpPath"))
        .map(|(_, v)| v)
        .ok_or_else(|| Error::config("Missing httpPath in JDBC URL"))?;

    let warehouse_id = http_path
        .split_once("/warehouses/")
        .map(|(_, tail)| tail.trim_end_matches('/'))
        .and_then(|tail| tail.split('/').next())
        .filter(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric()))
        .ok_or_else(|| Error::config("Could not find warehouseId in httpPath"))?;

    Ok(ConnectionProperties {
        host,
        warehouse_id: warehouse_id.to_string(),
    })
}

/// Replace the `PWD` value so URLs can be logged.
fn redact(url: &str) -> String {
    url.split(';')
        .map(|segment| match segment.split_once('=') {
            Some((k, _)) if k.eq_ignore_ascii_case("PWD") => format!("{}=***", k),
            _ => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join(";")
}
