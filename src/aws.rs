use std::env;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

use aws_config::meta::region::RegionProviderChain;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::store::{self, Identity, ObjectStore, StoreError};

const DEFAULT_REGION: &str = "us-east-1";

/// What is needed to build an S3 client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectOptions {
    pub profile: Option<String>,
    pub endpoint_url: String,
}

#[derive(Debug)]
pub struct S3Service {
    client: Client,
    identity: Identity,
}

impl S3Service {
    pub async fn connect(options: &ConnectOptions) -> Result<Self, StoreError> {
        let endpoint = options.endpoint_url.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(StoreError::Init(format!(
                "endpoint URL must start with http:// or https://, got {endpoint:?}"
            )));
        }

        let region = RegionProviderChain::default_provider().or_else(DEFAULT_REGION);
        let mut loader = aws_config::from_env().region(region).endpoint_url(endpoint);
        if let Some(profile) = &options.profile {
            loader = loader.profile_name(profile);
        }
        let config = loader.load().await;

        let region = config
            .region()
            .map(|r| r.as_ref().to_string())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        // Custom endpoints (LocalStack, MinIO) rarely resolve virtual-host buckets.
        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(true)
            .build();
        let client = Client::from_conf(s3_config);

        let identity = Identity {
            profile: resolve_profile(options.profile.as_deref()),
            region,
            endpoint_url: endpoint.to_string(),
        };
        info!(
            profile = %identity.profile,
            region = %identity.region,
            endpoint = %identity.endpoint_url,
            "storage client initialised"
        );
        Ok(Self { client, identity })
    }

    async fn fetch_buckets(&self) -> Result<Vec<String>, StoreError> {
        let output = self.client.list_buckets().send().await.map_err(|err| {
            let message = describe_sdk_error(&err);
            if looks_like_credentials_error(&message) {
                StoreError::Credentials(message)
            } else {
                StoreError::ListContainers(message)
            }
        })?;
        let buckets: Vec<String> = output
            .buckets()
            .iter()
            .filter_map(|bucket| bucket.name().map(str::to_string))
            .collect();
        debug!(count = buckets.len(), "listed buckets");
        Ok(buckets)
    }

    async fn fetch_objects(&self, bucket: &str) -> Result<Vec<String>, StoreError> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .send()
            .await
            .map_err(|err| StoreError::ListItems {
                container: bucket.to_string(),
                message: describe_sdk_error(&err),
            })?;
        let keys: Vec<String> = output
            .contents()
            .iter()
            .filter_map(|object| object.key().map(str::to_string))
            .collect();
        debug!(bucket, count = keys.len(), "listed objects");
        Ok(keys)
    }

    async fn fetch_object(
        &self,
        bucket: &str,
        key: &str,
        destination_dir: &Path,
    ) -> Result<PathBuf, StoreError> {
        let path = store::destination_path(destination_dir, key)?;
        let mut file = store::create_destination(&path).await?;

        let result = async {
            let output = self
                .client
                .get_object()
                .bucket(bucket)
                .key(key)
                .send()
                .await
                .map_err(|err| describe_sdk_error(&err))?;
            let mut body = output.body;
            let mut written: u64 = 0;
            while let Some(chunk) = body.try_next().await.map_err(|err| err.to_string())? {
                file.write_all(&chunk).await.map_err(|err| err.to_string())?;
                written += chunk.len() as u64;
            }
            file.flush().await.map_err(|err| err.to_string())?;
            Ok::<u64, String>(written)
        }
        .await;

        match result {
            Ok(bytes) => {
                info!(bucket, key, path = %path.display(), bytes, "download complete");
                Ok(path)
            }
            Err(message) => {
                drop(file);
                store::discard_partial(&path).await;
                Err(StoreError::Transfer {
                    key: key.to_string(),
                    message,
                })
            }
        }
    }
}

impl ObjectStore for S3Service {
    fn identity(&self) -> &Identity {
        &self.identity
    }

    fn list_containers(&self) -> BoxFuture<'_, Result<Vec<String>, StoreError>> {
        self.fetch_buckets().boxed()
    }

    fn list_items<'a>(
        &'a self,
        container: &'a str,
    ) -> BoxFuture<'a, Result<Vec<String>, StoreError>> {
        self.fetch_objects(container).boxed()
    }

    fn download<'a>(
        &'a self,
        container: &'a str,
        key: &'a str,
        destination_dir: &'a Path,
    ) -> BoxFuture<'a, Result<PathBuf, StoreError>> {
        self.fetch_object(container, key, destination_dir).boxed()
    }
}

fn resolve_profile(explicit: Option<&str>) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| env::var("AWS_PROFILE").ok().filter(|p| !p.is_empty()))
        .unwrap_or_else(|| "default".to_string())
}

fn looks_like_credentials_error(message: &str) -> bool {
    [
        "credentials",
        "UnrecognizedClientException",
        "InvalidAccessKeyId",
        "SignatureDoesNotMatch",
        "ExpiredToken",
    ]
    .iter()
    .any(|marker| message.contains(marker))
}

fn describe_sdk_error<E, R>(err: &SdkError<E, R>) -> String
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: Debug + 'static,
{
    match err {
        SdkError::ServiceError(context) => {
            let service = context.err();
            let code = service.code().unwrap_or("ServiceError");
            let message = service.message().unwrap_or("no message provided");
            format!("{code}: {message}")
        }
        SdkError::DispatchFailure(_) => {
            format!("network/dispatch failure: {}", DisplayErrorContext(err))
        }
        SdkError::TimeoutError(_) => "request timed out; please retry".into(),
        SdkError::ResponseError(context) => format!("response error: {context:?}"),
        _ => DisplayErrorContext(err).to_string(),
    }
}
