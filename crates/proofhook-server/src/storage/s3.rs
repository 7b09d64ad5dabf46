//! S3-compatible object store (AWS S3, MinIO)

use async_trait::async_trait;
use aws_sdk_s3::{
    config::{Credentials, Region},
    error::{DisplayErrorContext, SdkError},
    operation::head_bucket::HeadBucketError,
    primitives::ByteStream,
    types::{BucketLocationConstraint, CreateBucketConfiguration},
    Client,
};
use proofhook_common::checksum::sha256_hex;
use tracing::{debug, info, instrument};

use super::{config::StorageConfig, ObjectStore, StorageError, StorageResult, UploadResult};

/// Region that rejects an explicit location constraint on bucket creation
const DEFAULT_S3_REGION: &str = "us-east-1";

/// True when `head_bucket` failed because the bucket does not exist
fn is_missing_bucket<R>(err: &SdkError<HeadBucketError, R>) -> bool {
    err.as_service_error().is_some_and(HeadBucketError::is_not_found)
}

#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    region: String,
}

impl S3ObjectStore {
    pub fn new(config: &StorageConfig) -> Self {
        debug!(
            endpoint = ?config.endpoint,
            region = %config.region,
            path_style = config.path_style,
            "Initializing S3 object store"
        );

        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "proofhook-storage",
        );

        let mut builder = aws_sdk_s3::Config::builder()
            .credentials_provider(credentials)
            .region(Region::new(config.region.clone()))
            .force_path_style(config.path_style);

        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Self {
            client: Client::from_conf(builder.build()),
            region: config.region.clone(),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    fn bucket_configuration(&self) -> Option<CreateBucketConfiguration> {
        if self.region == DEFAULT_S3_REGION {
            return None;
        }

        Some(
            CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                .build(),
        )
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn backend(&self) -> &'static str {
        "s3"
    }

    #[instrument(skip(self))]
    async fn ensure_container(&self, container: &str) -> StorageResult<()> {
        match self.client.head_bucket().bucket(container).send().await {
            Ok(_) => return Ok(()),
            Err(e) if is_missing_bucket(&e) => {},
            Err(e) => {
                return Err(StorageError::ContainerCreate {
                    container: container.to_string(),
                    message: DisplayErrorContext(&e).to_string(),
                })
            },
        }

        let result = self
            .client
            .create_bucket()
            .bucket(container)
            .set_create_bucket_configuration(self.bucket_configuration())
            .send()
            .await;

        match result {
            Ok(_) => {
                info!(container, "Created object store container");
                Ok(())
            },
            // Lost a race with a concurrent request creating the same bucket
            Err(e)
                if e.as_service_error().is_some_and(|se| {
                    se.is_bucket_already_owned_by_you() || se.is_bucket_already_exists()
                }) =>
            {
                Ok(())
            },
            Err(e) => Err(StorageError::ContainerCreate {
                container: container.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            }),
        }
    }

    #[instrument(skip(self, data))]
    async fn put_object(
        &self,
        container: &str,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<UploadResult> {
        let checksum = sha256_hex(&data);
        let size = data.len() as i64;

        debug!("Uploading {} bytes to s3://{}/{}", size, container, key);

        self.client
            .put_object()
            .bucket(container)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| StorageError::PutObject {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        info!("Successfully uploaded to s3://{}/{}", container, key);

        Ok(UploadResult {
            key: key.to_string(),
            checksum,
            size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_region_has_no_location_constraint() {
        let store = S3ObjectStore::new(&StorageConfig::for_minio("http://localhost:9000", "b"));
        assert!(store.bucket_configuration().is_none());
        assert_eq!(store.backend(), "s3");
    }

    #[test]
    fn test_only_not_found_counts_as_missing_bucket() {
        use aws_sdk_s3::{error::ErrorMetadata, types::error::NotFound};

        let missing: SdkError<HeadBucketError, ()> = SdkError::service_error(
            HeadBucketError::NotFound(NotFound::builder().build()),
            (),
        );
        assert!(is_missing_bucket(&missing));

        let forbidden: SdkError<HeadBucketError, ()> = SdkError::service_error(
            HeadBucketError::generic(ErrorMetadata::builder().code("Forbidden").build()),
            (),
        );
        assert!(!is_missing_bucket(&forbidden));

        let timeout: SdkError<HeadBucketError, ()> = SdkError::timeout_error("connect timed out");
        assert!(!is_missing_bucket(&timeout));
    }

    #[test]
    fn test_other_region_sets_location_constraint() {
        let mut config = StorageConfig::for_minio("http://localhost:9000", "b");
        config.region = "eu-west-1".to_string();
        let store = S3ObjectStore::new(&config);

        let configuration = store.bucket_configuration().unwrap();
        assert_eq!(
            configuration.location_constraint(),
            Some(&BucketLocationConstraint::EuWest1)
        );
    }
}
