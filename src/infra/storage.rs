use anyhow::Result;
use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct ObjectStorage {
    client: Client,
    bucket: String,
    public_endpoint: Option<String>,
    endpoint: String,
}

impl ObjectStorage {
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let region_provider = RegionProviderChain::first_try(Region::new(config.s3_region.clone()));
        let shared_config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .load()
            .await;

        let mut s3_builder = aws_sdk_s3::config::Builder::from(&shared_config)
            .region(shared_config.region().cloned())
            .endpoint_url(config.s3_endpoint.clone());
        if let Some(provider) = shared_config.credentials_provider() {
            s3_builder = s3_builder.credentials_provider(provider);
        }
        let client = Client::from_conf(s3_builder.build());

        Ok(Self {
            client,
            bucket: config.s3_bucket.clone(),
            public_endpoint: config.s3_public_endpoint.clone(),
            endpoint: config.s3_endpoint.clone(),
        })
    }

    /// Upload an object and return its public URL.
    pub async fn put_public(
        &self,
        key: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<String> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await?;

        Ok(self.public_url(key))
    }

    pub fn public_url(&self, key: &str) -> String {
        let base = self
            .public_endpoint
            .as_deref()
            .unwrap_or(self.endpoint.as_str());
        format!("{}/{}/{}", base.trim_end_matches('/'), self.bucket, key)
    }
}
