//! MinIO/S3-compatible storage for report photos
//!
//! Photos are stored under the public prefix and served by direct URL, so the
//! client only deals with public objects.

use chrono::Utc;
use reqwest::{Client, Url};
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use serde_json::json;
use tracing::{debug, info, warn};

use super::sigv4::SigV4Signer;
use crate::core::config::MinIOConfig;
use crate::core::error::AppError;

pub struct MinIOClient {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    endpoint: String,
    public_endpoint: String,
    public_prefix: String,
    signer: SigV4Signer,
    http_client: Client,
}

impl MinIOClient {
    /// Connect, create the bucket if needed and open the public prefix for reads
    pub async fn new(config: MinIOConfig) -> Result<Self, AppError> {
        let client = Self::build(config)?;

        client.ensure_bucket_exists().await?;
        client.set_public_read_policy().await?;

        info!(
            "MinIO client initialized for endpoint: {}, bucket: {}, public_prefix: {}",
            client.endpoint,
            client.bucket.name(),
            client.public_prefix
        );

        Ok(client)
    }

    /// Construct the client without touching the network
    fn build(config: MinIOConfig) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Failed to create MinIO credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| AppError::Internal(format!("Failed to create MinIO bucket: {}", e)))?;

        // http://endpoint/bucket rather than http://bucket.endpoint
        bucket.set_path_style();

        let http_client = Client::builder()
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            bucket,
            region,
            credentials,
            signer: SigV4Signer::new(&config.access_key, &config.secret_key, &config.region),
            endpoint: config.endpoint,
            public_endpoint: config.public_endpoint,
            public_prefix: config.public_prefix.trim_matches('/').to_string(),
            http_client,
        })
    }

    pub async fn ensure_bucket_exists(&self) -> Result<(), AppError> {
        let created = Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await;

        match created {
            Ok(_) => info!("Bucket '{}' created", self.bucket.name()),
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                } else {
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        self.bucket.name(),
                        e
                    );
                }
            }
        }

        Ok(())
    }

    /// Allow anonymous `GetObject` on `{public_prefix}/*`
    ///
    /// Failure only logs a warning; the policy can be applied by hand with
    /// `mc anonymous set download`.
    async fn set_public_read_policy(&self) -> Result<(), AppError> {
        let bucket_name = self.bucket.name();
        let policy = json!({
            "Version": "2012-10-17",
            "Statement": [
                {
                    "Effect": "Allow",
                    "Principal": {"AWS": "*"},
                    "Action": ["s3:GetObject"],
                    "Resource": [format!("arn:aws:s3:::{}/{}/*", bucket_name, self.public_prefix)]
                }
            ]
        })
        .to_string();

        match self.put_bucket_policy(&bucket_name, &policy).await {
            Ok(()) => info!(
                "Set public read policy for {}/{}/*",
                bucket_name, self.public_prefix
            ),
            Err(e) => warn!(
                "Failed to set bucket policy for '{}': {}. Set it manually with: mc anonymous set download minio/{}/{}",
                bucket_name, e, bucket_name, self.public_prefix
            ),
        }

        Ok(())
    }

    async fn put_bucket_policy(&self, bucket_name: &str, policy: &str) -> Result<(), AppError> {
        let endpoint_url = Url::parse(&self.endpoint)
            .map_err(|e| AppError::Internal(format!("Invalid endpoint URL: {}", e)))?;
        let host = endpoint_url
            .host_str()
            .ok_or_else(|| AppError::Internal("Endpoint URL has no host".to_string()))?;
        let host_header = match endpoint_url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        let signed = self.signer.sign(
            "PUT",
            &host_header,
            &format!("/{}", bucket_name),
            "policy=",
            policy.as_bytes(),
            Utc::now(),
        )?;

        let response = self
            .http_client
            .put(format!("{}/{}?policy", self.endpoint, bucket_name))
            .header("Host", &host_header)
            .header("x-amz-date", &signed.amz_date)
            .header("x-amz-content-sha256", &signed.payload_hash)
            .header("Authorization", &signed.authorization)
            .header("Content-Type", "application/json")
            .body(policy.to_string())
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to send policy request: {}", e)))?;

        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(AppError::Internal(format!(
            "Failed to set bucket policy: {} - {}",
            status, body
        )))
    }

    /// `cats/u1/a.jpg` -> `public/cats/u1/a.jpg`
    pub fn generate_key(&self, path: &str) -> String {
        format!("{}/{}", self.public_prefix, path.trim_start_matches('/'))
    }

    pub async fn upload(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<String, AppError> {
        self.bucket
            .put_object_with_content_type(key, data, content_type)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to upload file '{}': {}", key, e)))?;

        debug!("Uploaded '{}' to bucket '{}'", key, self.bucket.name());
        Ok(key.to_string())
    }

    pub async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.bucket
            .delete_object(key)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to delete file '{}': {}", key, e)))?;

        debug!("Deleted '{}' from bucket '{}'", key, self.bucket.name());
        Ok(())
    }

    /// Direct URL of a public object
    pub fn get_file_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_endpoint, self.bucket.name(), key)
    }

    /// Object key behind a URL produced by [`get_file_url`](Self::get_file_url)
    ///
    /// Accepts URLs on either the public or the internal endpoint. Returns `None`
    /// for URLs of other hosts or buckets.
    pub fn extract_key_from_url(&self, url: &str) -> Option<String> {
        let bucket = self.bucket.name();
        [&self.public_endpoint, &self.endpoint]
            .into_iter()
            .find_map(|base| url.strip_prefix(&format!("{}/{}/", base, bucket)).map(str::to_string))
            .filter(|key| !key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> MinIOClient {
        MinIOClient::build(MinIOConfig {
            endpoint: "http://minio:9000".to_string(),
            public_endpoint: "https://cdn.jejakmeong.id".to_string(),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            bucket: "jejak-meong".to_string(),
            region: "us-east-1".to_string(),
            public_prefix: "public/".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_generate_key() {
        let client = client();
        assert_eq!(
            client.generate_key("cats/u1/a.jpg"),
            "public/cats/u1/a.jpg"
        );
        assert_eq!(
            client.generate_key("/cats/u1/a.jpg"),
            "public/cats/u1/a.jpg"
        );
    }

    #[test]
    fn test_url_key_mapping() {
        let client = client();
        let url = client.get_file_url("public/cats/u1/a.jpg");
        assert_eq!(url, "https://cdn.jejakmeong.id/jejak-meong/public/cats/u1/a.jpg");
        assert_eq!(
            client.extract_key_from_url(&url).as_deref(),
            Some("public/cats/u1/a.jpg")
        );
        assert_eq!(
            client
                .extract_key_from_url("http://minio:9000/jejak-meong/public/cats/u1/b.png")
                .as_deref(),
            Some("public/cats/u1/b.png")
        );
    }

    #[test]
    fn test_foreign_urls_have_no_key() {
        let client = client();
        assert!(client
            .extract_key_from_url("https://firebasestorage.googleapis.com/v0/b/x/o/cats%2Fa.jpg")
            .is_none());
        assert!(client
            .extract_key_from_url("https://cdn.jejakmeong.id/other-bucket/public/a.jpg")
            .is_none());
        assert!(client
            .extract_key_from_url("https://cdn.jejakmeong.id/jejak-meong/")
            .is_none());
    }
}
