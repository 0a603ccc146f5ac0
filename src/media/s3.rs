//! S3 image store

use aws_sdk_s3::primitives::ByteStream;

use super::ImageStore;
use crate::config::S3Args;
use crate::types::{AdminError, Result};

pub struct S3ImageStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    region: String,
    endpoint: Option<String>,
}

impl S3ImageStore {
    /// Build a client from static credentials. Returns `Config` errors for
    /// missing settings.
    pub fn new(args: &S3Args) -> Result<Self> {
        let bucket = args
            .s3_bucket
            .clone()
            .filter(|b| !b.trim().is_empty())
            .ok_or_else(|| AdminError::Config("S3_BUCKET_NAME is not set".into()))?;
        let (Some(key_id), Some(secret)) = (&args.aws_access_key_id, &args.aws_secret_access_key)
        else {
            return Err(AdminError::Config("AWS credentials are not set".into()));
        };

        let credentials =
            aws_sdk_s3::config::Credentials::new(key_id, secret, None, None, "preplens-admin");

        let mut builder = aws_sdk_s3::Config::builder()
            .credentials_provider(credentials)
            .region(aws_sdk_s3::config::Region::new(args.aws_region.clone()))
            .behavior_version_latest();

        // Custom endpoints (MinIO, R2) need path-style addressing
        if let Some(endpoint) = &args.s3_endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
            bucket,
            region: args.aws_region.clone(),
            endpoint: args.s3_endpoint.clone(),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Public URL of an object, with each key segment percent-encoded
    pub fn object_url(&self, key: &str) -> String {
        let encoded: Vec<String> = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        let encoded = encoded.join("/");

        match &self.endpoint {
            Some(endpoint) => format!(
                "{}/{}/{}",
                endpoint.trim_end_matches('/'),
                self.bucket,
                encoded
            ),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, encoded
            ),
        }
    }
}

#[async_trait::async_trait]
impl ImageStore for S3ImageStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: Option<&str>) -> Result<String> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .set_content_type(content_type.map(str::to_string))
            .send()
            .await
            .map_err(|e| AdminError::Storage(format!("S3 upload failed: {}", e)))?;

        Ok(self.object_url(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(endpoint: Option<&str>) -> S3Args {
        S3Args {
            s3_bucket: Some("preplens-images".into()),
            aws_region: "ap-south-1".into(),
            aws_access_key_id: Some("AKIAEXAMPLE".into()),
            aws_secret_access_key: Some("secret".into()),
            s3_endpoint: endpoint.map(str::to_string),
        }
    }

    #[test]
    fn test_aws_object_url() {
        let store = S3ImageStore::new(&args(None)).unwrap();
        assert_eq!(
            store.object_url("questions/17-my diagram.png"),
            "https://preplens-images.s3.ap-south-1.amazonaws.com/questions/17-my%20diagram.png"
        );
    }

    #[test]
    fn test_custom_endpoint_url() {
        let store = S3ImageStore::new(&args(Some("http://localhost:9000/"))).unwrap();
        assert_eq!(
            store.object_url("questions/1-a.png"),
            "http://localhost:9000/preplens-images/questions/1-a.png"
        );
    }

    #[test]
    fn test_missing_bucket_is_config_error() {
        let mut incomplete = args(None);
        incomplete.s3_bucket = None;
        assert!(matches!(
            S3ImageStore::new(&incomplete),
            Err(AdminError::Config(_))
        ));
    }
}
