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

//! `object_store`-backed extractors for S3, Azure Blob Storage and GCS.
//!
//! Objects under the prefix are listed, CSV parts are kept and each one is
//! returned as a pre-signed GET URL.

use super::extract::{FileExtractor, ProviderCredentials};
use crate::error::{Error, Result};
use async_trait::async_trait;
use futures_util::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::ObjectStore;
use reqwest::Method;
use std::time::Duration;
use tracing::debug;

/// Lifetime of the signed URLs handed back to the caller.
pub const SIGNED_URL_TTL: Duration = Duration::from_secs(60 * 60);

const CSV_SUFFIXES: [&str; 2] = [".csv", ".csv.gz"];

/// [`FileExtractor`] for all three providers, selected by the credentials.
#[derive(Debug, Clone, Default)]
pub struct ObjectStoreExtractor {
    url_ttl: Option<Duration>,
}

impl ObjectStoreExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url_ttl(mut self, ttl: Duration) -> Self {
        self.url_ttl = Some(ttl);
        self
    }

    fn ttl(&self) -> Duration {
        self.url_ttl.unwrap_or(SIGNED_URL_TTL)
    }
}

#[async_trait]
impl FileExtractor for ObjectStoreExtractor {
    async fn extract(
        &self,
        credentials: &ProviderCredentials,
        bucket_name: &str,
        prefix: &str,
    ) -> Result<Vec<String>> {
        debug!(
            "Listing unloaded files in {} bucket {} under {}",
            credentials.provider(),
            bucket_name,
            prefix
        );

        match credentials {
            ProviderCredentials::S3 {
                access_key_id,
                secret_access_key,
                region,
            } => {
                let mut builder = AmazonS3Builder::new().with_bucket_name(bucket_name);
                if !region.is_empty() {
                    builder = builder.with_region(region);
                }
                if !access_key_id.is_empty() {
                    builder = builder
                        .with_access_key_id(access_key_id)
                        .with_secret_access_key(secret_access_key);
                }
                let store = builder
                    .build()
                    .map_err(|e| Error::Extraction(format!("S3: {}", e)))?;
                list_and_sign(&store, prefix, self.ttl()).await
            }
            ProviderCredentials::Azure {
                account_key,
                tenant_id,
                client_id,
                client_secret,
            } => {
                let (account, container) = split_azure_bucket(bucket_name)?;
                let mut builder = MicrosoftAzureBuilder::new()
                    .with_account(account)
                    .with_container_name(container);
                if let Some(key) = account_key {
                    builder = builder.with_access_key(key);
                } else if let (Some(tenant), Some(client), Some(secret)) =
                    (tenant_id, client_id, client_secret)
                {
                    builder = builder.with_client_secret_authorization(client, secret, tenant);
                }
                let store = builder
                    .build()
                    .map_err(|e| Error::Extraction(format!("Azure: {}", e)))?;
                list_and_sign(&store, prefix, self.ttl()).await
            }
            ProviderCredentials::Gcs { credentials } => {
                let mut builder = GoogleCloudStorageBuilder::new().with_bucket_name(bucket_name);
                if let Some(json) = credentials {
                    builder = builder.with_service_account_key(json);
                }
                let store = builder
                    .build()
                    .map_err(|e| Error::Extraction(format!("GCS: {}", e)))?;
                list_and_sign(&store, prefix, self.ttl()).await
            }
        }
    }
}

/// `account.blob.core.windows.net/container` → (`account`, `container`).
fn split_azure_bucket(bucket_name: &str) -> Result<(&str, &str)> {
    let (host, container) = bucket_name.split_once('/').ok_or_else(|| {
        Error::config(format!(
            "Azure export bucket must name a container: {}",
            bucket_name
        ))
    })?;
    let account = host.split('.').next().unwrap_or(host);
    if account.is_empty() || container.is_empty() {
        return Err(Error::config(format!(
            "Invalid Azure export bucket: {}",
            bucket_name
        )));
    }
    Ok((account, container))
}

fn is_csv_part(location: &Path) -> bool {
    let name = location.as_ref();
    CSV_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

async fn list_and_sign<S>(store: &S, prefix: &str, ttl: Duration) -> Result<Vec<String>>
where
    S: ObjectStore + Signer,
{
    let prefix = Path::from(prefix.trim_matches('/'));
    let mut locations: Vec<Path> = store
        .list(Some(&prefix))
        .map_ok(|meta| meta.location)
        .try_filter(|location| futures_util::future::ready(is_csv_part(location)))
        .try_collect()
        .await?;
    locations.sort();

    let mut urls = Vec::with_capacity(locations.len());
    for location in &locations {
        let url = store.signed_url(Method::GET, location, ttl).await?;
        urls.push(url.to_string());
    }

    debug!("Found {} unloaded files under {}", urls.len(), prefix);
    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_azure_bucket() {
        assert_eq!(
            split_azure_bucket("acct.blob.core.windows.net/exports").unwrap(),
            ("acct", "exports")
        );
        assert!(split_azure_bucket("acct.blob.core.windows.net").is_err());
        assert!(split_azure_bucket("acct.blob.core.windows.net/").is_err());
    }

    #[test]
    fn test_is_csv_part() {
        assert!(is_csv_part(&Path::from("p/t/part-00000-abc-c000.csv")));
        assert!(is_csv_part(&Path::from("p/t/part-00001.csv.gz")));
        assert!(!is_csv_part(&Path::from("p/t/_SUCCESS")));
        assert!(!is_csv_part(&Path::from("p/t/_committed_123")));
    }

    #[test]
    fn test_default_ttl() {
        assert_eq!(ObjectStoreExtractor::new().ttl(), SIGNED_URL_TTL);
        assert_eq!(
            ObjectStoreExtractor::new()
                .with_url_ttl(Duration::from_secs(60))
                .ttl(),
            Duration::from_secs(60)
        );
    }

    #[tokio::test]
    async fn test_s3_signed_url() {
        let store = AmazonS3Builder::new()
            .with_bucket_name("bucket")
            .with_region("us-east-1")
            .with_access_key_id("AKIA")
            .with_secret_access_key("secret")
            .build()
            .unwrap();
        let url = store
            .signed_url(Method::GET, &Path::from("p/part-0.csv"), SIGNED_URL_TTL)
            .await
            .unwrap();
        assert!(url.as_str().contains("X-Amz-Signature"));
        assert!(url.as_str().contains("p/part-0.csv"));
    }
}
