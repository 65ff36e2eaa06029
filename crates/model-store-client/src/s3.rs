// crates/model-store-client/src/s3.rs
// ============================================================================
// Module: S3 Object Store Client
// Description: Blocking S3 backend for the object-store client trait.
// Purpose: Drive aws-sdk-s3 from synchronous callers and classify failures.
// Dependencies: aws-config, aws-sdk-s3, tokio, model-store-config
// ============================================================================

//! ## Overview
//! [`S3ObjectStoreClient`] owns a private tokio runtime and blocks on each
//! SDK future, so callers stay synchronous. When invoked from inside a
//! multi-threaded runtime it uses `block_in_place`; from a current-thread
//! runtime it hands the future to a helper thread. SDK errors are mapped onto
//! [`ObjectStoreError`] by HTTP status, error code, and dispatch failure
//! shape. SDK retries are disabled, so each call issues exactly one request
//! and a conditional put is never re-sent after a lost response.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::primitives::ByteStream;
use model_store_config::ObjectStoreConfig;
use tokio::io::AsyncReadExt;
use tokio::runtime::Handle;
use tokio::runtime::Runtime;
use tokio::runtime::RuntimeFlavor;

use crate::object_store::ObjectStoreClient;
use crate::object_store::ObjectStoreError;
use crate::object_store::ObjectWrite;
use crate::object_store::WriteCondition;

// ============================================================================
// SECTION: Runtime Helpers
// ============================================================================

/// Blocks on an object-store future using a compatible runtime.
fn block_on_with_runtime<F, T>(runtime: &Runtime, future: F) -> Result<T, ObjectStoreError>
where
    F: Future<Output = Result<T, ObjectStoreError>> + Send + 'static,
    T: Send + 'static,
{
    if let Ok(handle) = Handle::try_current() {
        if matches!(handle.runtime_flavor(), RuntimeFlavor::MultiThread) {
            return tokio::task::block_in_place(|| handle.block_on(future));
        }
        let (tx, rx) = std::sync::mpsc::sync_channel(1);
        std::thread::spawn(move || {
            let result = Runtime::new()
                .map_err(|err| ObjectStoreError::Io(err.to_string()))
                .and_then(|runtime| runtime.block_on(future));
            let _ = tx.send(result);
        });
        return rx
            .recv()
            .unwrap_or_else(|_| Err(ObjectStoreError::Io("object store thread join failed".to_string())));
    }

    runtime.block_on(future)
}

// ============================================================================
// SECTION: Error Classification
// ============================================================================

/// What a failed request was addressing.
#[derive(Clone, Copy)]
enum Subject<'a> {
    /// The bucket itself (probe, list).
    Bucket(&'a str),
    /// A single object key.
    Object(&'a str),
}

/// Maps an SDK error onto the object-store taxonomy.
fn classify<E>(err: &SdkError<E>, subject: Subject<'_>) -> ObjectStoreError
where
    E: std::error::Error + ProvideErrorMetadata + 'static,
{
    let message = DisplayErrorContext(err).to_string();
    if message.to_ascii_lowercase().contains("credential") {
        return ObjectStoreError::MissingCredentials(message);
    }
    match err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => {
            ObjectStoreError::EndpointUnreachable(message)
        }
        SdkError::ConstructionFailure(_) => ObjectStoreError::Invalid(message),
        _ => {
            let status = err.raw_response().map(|response| response.status().as_u16());
            classify_response(status, err.code(), subject, message)
        }
    }
}

/// Maps an HTTP status and S3 error code onto the object-store taxonomy.
fn classify_response(
    status: Option<u16>,
    code: Option<&str>,
    subject: Subject<'_>,
    message: String,
) -> ObjectStoreError {
    match (code, status) {
        (Some("NoSuchBucket"), _) => ObjectStoreError::BucketNotFound(message),
        (Some("NoSuchKey"), _) => ObjectStoreError::NotFound(message),
        (Some("AccessDenied" | "AllAccessDisabled" | "InvalidAccessKeyId"), _)
        | (_, Some(403)) => ObjectStoreError::AccessDenied(message),
        (Some("PreconditionFailed" | "ConditionalRequestConflict"), _)
        | (_, Some(409 | 412)) => ObjectStoreError::PreconditionFailed(message),
        (_, Some(404)) => match subject {
            Subject::Bucket(bucket) => ObjectStoreError::BucketNotFound(bucket.to_string()),
            Subject::Object(key) => ObjectStoreError::NotFound(key.to_string()),
        },
        (Some("PermanentRedirect" | "AuthorizationHeaderMalformed"), _) | (_, Some(301)) => {
            ObjectStoreError::EndpointUnreachable(message)
        }
        _ => ObjectStoreError::Backend(message),
    }
}

// ============================================================================
// SECTION: S3 Client
// ============================================================================

/// S3-backed object-store client.
pub struct S3ObjectStoreClient {
    /// Underlying S3 client.
    client: Client,
    /// Bucket name.
    bucket: String,
    /// Tokio runtime for blocking S3 operations.
    runtime: Option<Arc<Runtime>>,
}

impl Drop for S3ObjectStoreClient {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            let _ = std::thread::spawn(move || drop(runtime));
        }
    }
}

impl S3ObjectStoreClient {
    /// Builds a new S3-backed object store client.
    ///
    /// Credentials are resolved lazily by the SDK; a missing credential chain
    /// surfaces on the first request.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError`] when configuration or runtime setup fails.
    pub fn new(config: &ObjectStoreConfig) -> Result<Self, ObjectStoreError> {
        Self::build(config, None)
    }

    /// Builds the client, optionally pinning static credentials.
    fn build(
        config: &ObjectStoreConfig,
        credentials: Option<Credentials>,
    ) -> Result<Self, ObjectStoreError> {
        config.validate().map_err(|err| ObjectStoreError::Invalid(err.to_string()))?;
        let runtime = Runtime::new().map_err(|err| ObjectStoreError::Io(err.to_string()))?;
        let region = config.region.clone();
        let endpoint = config.endpoint.clone();
        let timeout = Duration::from_millis(config.request_timeout_ms);
        let shared_config = block_on_with_runtime(&runtime, async move {
            let timeouts = TimeoutConfig::builder()
                .operation_timeout(timeout)
                .connect_timeout(timeout)
                .build();
            let mut loader = aws_config::defaults(BehaviorVersion::latest())
                .region(Region::new(region))
                .retry_config(RetryConfig::disabled())
                .timeout_config(timeouts);
            if let Some(endpoint) = endpoint {
                loader = loader.endpoint_url(endpoint);
            }
            if let Some(credentials) = credentials {
                loader = loader.credentials_provider(credentials);
            }
            Ok(loader.load().await)
        })?;
        let mut s3_builder = aws_sdk_s3::config::Builder::from(&shared_config);
        if config.force_path_style {
            s3_builder = s3_builder.force_path_style(true);
        }
        let client = Client::from_conf(s3_builder.build());
        Ok(Self {
            client,
            bucket: config.bucket.trim().to_string(),
            runtime: Some(Arc::new(runtime)),
        })
    }

    /// Returns the runtime or an error if shutdown.
    fn runtime(&self) -> Result<&Runtime, ObjectStoreError> {
        self.runtime
            .as_ref()
            .map(AsRef::as_ref)
            .ok_or_else(|| ObjectStoreError::Io("object store runtime closed".to_string()))
    }
}

impl ObjectStoreClient for S3ObjectStoreClient {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn probe(&self) -> Result<(), ObjectStoreError> {
        let bucket = self.bucket.clone();
        let client = self.client.clone();
        block_on_with_runtime(self.runtime()?, async move {
            client
                .head_bucket()
                .bucket(bucket.clone())
                .send()
                .await
                .map_err(|err| classify(&err, Subject::Bucket(&bucket)))?;
            Ok(())
        })
    }

    fn put(&self, write: ObjectWrite) -> Result<(), ObjectStoreError> {
        let bucket = self.bucket.clone();
        let client = self.client.clone();
        block_on_with_runtime(self.runtime()?, async move {
            let ObjectWrite {
                key,
                bytes,
                content_type,
                metadata,
                condition,
            } = write;
            let mut request = client
                .put_object()
                .bucket(bucket)
                .key(key.clone())
                .body(ByteStream::from(bytes))
                .set_content_type(content_type);
            for (name, value) in metadata {
                request = request.metadata(name, value);
            }
            if condition == WriteCondition::IfAbsent {
                request = request.if_none_match("*");
            }
            request.send().await.map_err(|err| classify(&err, Subject::Object(&key)))?;
            Ok(())
        })
    }

    fn get(&self, key: &str, max_bytes: usize) -> Result<Vec<u8>, ObjectStoreError> {
        let bucket = self.bucket.clone();
        let key = key.to_string();
        let client = self.client.clone();
        block_on_with_runtime(self.runtime()?, async move {
            let output = client
                .get_object()
                .bucket(bucket)
                .key(key.clone())
                .send()
                .await
                .map_err(|err| classify(&err, Subject::Object(&key)))?;
            if let Some(length) = output.content_length() {
                let actual_bytes = usize::try_from(length).unwrap_or(usize::MAX);
                if actual_bytes > max_bytes {
                    return Err(ObjectStoreError::TooLarge {
                        path: key.clone(),
                        max_bytes,
                        actual_bytes,
                    });
                }
            }
            let mut reader = output.body.into_async_read();
            let mut buffer = Vec::new();
            let mut total_bytes = 0usize;
            let mut chunk = [0u8; 8192];
            loop {
                let read = reader
                    .read(&mut chunk)
                    .await
                    .map_err(|err| ObjectStoreError::Io(err.to_string()))?;
                if read == 0 {
                    break;
                }
                total_bytes = total_bytes
                    .checked_add(read)
                    .ok_or_else(|| ObjectStoreError::Io("object size overflow".to_string()))?;
                if total_bytes > max_bytes {
                    return Err(ObjectStoreError::TooLarge {
                        path: key.clone(),
                        max_bytes,
                        actual_bytes: total_bytes,
                    });
                }
                buffer.extend_from_slice(&chunk[.. read]);
            }
            Ok(buffer)
        })
    }

    fn exists(&self, key: &str) -> Result<bool, ObjectStoreError> {
        let bucket = self.bucket.clone();
        let key = key.to_string();
        let client = self.client.clone();
        block_on_with_runtime(self.runtime()?, async move {
            match client.head_object().bucket(bucket).key(key.clone()).send().await {
                Ok(_) => Ok(true),
                Err(err) => match classify(&err, Subject::Object(&key)) {
                    ObjectStoreError::NotFound(_) => Ok(false),
                    other => Err(other),
                },
            }
        })
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, ObjectStoreError> {
        let bucket = self.bucket.clone();
        let prefix = prefix.to_string();
        let client = self.client.clone();
        block_on_with_runtime(self.runtime()?, async move {
            let mut keys = Vec::new();
            let mut continuation: Option<String> = None;
            loop {
                let output = client
                    .list_objects_v2()
                    .bucket(bucket.clone())
                    .prefix(prefix.clone())
                    .set_continuation_token(continuation.take())
                    .send()
                    .await
                    .map_err(|err| classify(&err, Subject::Bucket(&bucket)))?;
                keys.extend(
                    output.contents().iter().filter_map(|object| object.key().map(str::to_string)),
                );
                match output.next_continuation_token() {
                    Some(token) if output.is_truncated().unwrap_or(false) => {
                        continuation = Some(token.to_string());
                    }
                    _ => break,
                }
            }
            Ok(keys)
        })
    }
}
