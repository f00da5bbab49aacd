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

//! Export bucket URL parsing.

use crate::error::{Error, Result};
use url::Url;

/// Components of an export bucket URL.
///
/// `s3://bucket/some/path` → bucket `bucket`, path `some/path`.
/// `wasbs://container@account.blob.core.windows.net/path` → bucket
/// `account.blob.core.windows.net`, username `container`, path `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBucketUrl {
    pub bucket_name: String,
    /// Path without leading or trailing slashes; empty when absent.
    pub path: String,
    pub username: Option<String>,
}

impl ParsedBucketUrl {
    /// Parse a bucket URL. A bare `bucket/path` is accepted.
    pub fn parse(raw: &str) -> Result<Self> {
        let with_scheme = if has_scheme(raw) {
            raw.to_string()
        } else {
            format!("schema://{}", raw)
        };

        let url = Url::parse(&with_scheme)
            .map_err(|e| Error::config(format!("Invalid export bucket URL '{}': {}", raw, e)))?;

        let bucket_name = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::config(format!("Export bucket URL '{}' has no bucket", raw)))?
            .to_string();

        let username = Some(url.username())
            .filter(|u| !u.is_empty())
            .map(String::from);

        Ok(Self {
            bucket_name,
            path: url.path().trim_matches('/').to_string(),
            username,
        })
    }

    /// `path/table` when a path is set, else `table`.
    pub fn export_prefix(&self, table: &str) -> String {
        if self.path.is_empty() {
            table.to_string()
        } else {
            format!("{}/{}", self.path, table)
        }
    }
}

fn has_scheme(raw: &str) -> bool {
    match raw.split_once("://") {
        Some((scheme, _)) => {
            let mut chars = scheme.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}
