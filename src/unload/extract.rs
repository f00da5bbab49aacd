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

//! File extraction seam.
//!
//! A [`FileExtractor`] turns `(credentials, bucket, prefix)` into the URIs of
//! the files an unload produced.

use crate::config::{BucketConfig, BucketProvider};
use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Per-provider credentials handed to a [`FileExtractor`].
#[derive(Clone, PartialEq, Eq)]
pub enum ProviderCredentials {
    S3 {
        access_key_id: String,
        secret_access_key: String,
        region: String,
    },
    Azure {
        account_key: Option<String>,
        tenant_id: Option<String>,
        client_id: Option<String>,
        client_secret: Option<String>,
    },
    Gcs {
        /// Service account JSON.
        credentials: Option<String>,
    },
}

impl ProviderCredentials {
    /// Credentials for `provider` from the bucket settings.
    pub fn from_bucket_config(provider: BucketProvider, bucket: &BucketConfig) -> Self {
        match provider {
            BucketProvider::S3 => ProviderCredentials::S3 {
                access_key_id: bucket.aws_key.clone().unwrap_or_default(),
                secret_access_key: bucket.aws_secret.clone().unwrap_or_default(),
                region: bucket.aws_region.clone().unwrap_or_default(),
            },
            BucketProvider::Azure => ProviderCredentials::Azure {
                account_key: bucket.azure_key.clone(),
                tenant_id: bucket.azure_tenant_id.clone(),
                client_id: bucket.azure_client_id.clone(),
                client_secret: bucket.azure_client_secret.clone(),
            },
            BucketProvider::Gcs => ProviderCredentials::Gcs {
                credentials: bucket.gcs_credentials.clone(),
            },
        }
    }

    pub fn provider(&self) -> BucketProvider {
        match self {
            ProviderCredentials::S3 { .. } => BucketProvider::S3,
            ProviderCredentials::Azure { .. } => BucketProvider::Azure,
            ProviderCredentials::Gcs { .. } => BucketProvider::Gcs,
        }
    }
}

impl fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderCredentials::S3 {
                access_key_id,
                region,
                ..
            } => f
                .debug_struct("S3")
                .field("access_key_id", access_key_id)
                .field("region", region)
                .finish_non_exhaustive(),
            ProviderCredentials::Azure {
                account_key,
                tenant_id,
                client_id,
                ..
            } => f
                .debug_struct("Azure")
                .field("has_account_key", &account_key.is_some())
                .field("tenant_id", tenant_id)
                .field("client_id", client_id)
                .finish_non_exhaustive(),
            ProviderCredentials::Gcs { credentials } => f
                .debug_struct("Gcs")
                .field("has_credentials", &credentials.is_some())
                .finish(),
        }
    }
}

/// Lists the files an unload wrote under `prefix`.
#[async_trait]
pub trait FileExtractor: Send + Sync + fmt::Debug {
    async fn extract(
        &self,
        credentials: &ProviderCredentials,
        bucket_name: &str,
        prefix: &str,
    ) -> Result<Vec<String>>;
}

/// One extractor per provider.
#[derive(Debug, Clone)]
pub struct ExtractorSet {
    pub s3: Arc<dyn FileExtractor>,
    pub azure: Arc<dyn FileExtractor>,
    pub gcs: Arc<dyn FileExtractor>,
}

impl ExtractorSet {
    /// The same extractor for every provider.
    pub fn uniform(extractor: Arc<dyn FileExtractor>) -> Self {
        Self {
            s3: extractor.clone(),
            azure: extractor.clone(),
            gcs: extractor,
        }
    }

    pub fn for_provider(&self, provider: BucketProvider) -> &Arc<dyn FileExtractor> {
        match provider {
            BucketProvider::S3 => &self.s3,
            BucketProvider::Azure => &self.azure,
            BucketProvider::Gcs => &self.gcs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_from_bucket_config() {
        let bucket = BucketConfig {
            aws_key: Some("AKIA".into()),
            aws_secret: Some("secret".into()),
            aws_region: Some("us-west-2".into()),
            ..Default::default()
        };
        let creds = ProviderCredentials::from_bucket_config(BucketProvider::S3, &bucket);
        assert_eq!(creds.provider(), BucketProvider::S3);
        let debug = format!("{:?}", creds);
        assert!(debug.contains("AKIA"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_missing_s3_keys_default_to_empty() {
        let creds =
            ProviderCredentials::from_bucket_config(BucketProvider::S3, &BucketConfig::default());
        assert_eq!(
            creds,
            ProviderCredentials::S3 {
                access_key_id: String::new(),
                secret_access_key: String::new(),
                region: String::new(),
            }
        );
    }
}
