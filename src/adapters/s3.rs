use std::{error::Error, fmt::Debug, io::Read, sync::Arc, time::Duration};

use aws_sdk_s3::{
    config::Region,
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    operation::{
        create_multipart_upload::builders::CreateMultipartUploadFluentBuilder,
        put_object::builders::PutObjectFluentBuilder,
    },
    presigning::PresigningConfig,
    primitives::{ByteStream, DateTimeFormat},
    types::{CompletedMultipartUpload, CompletedPart, Delete, ObjectIdentifier},
};
use tokio::runtime::Runtime;
use tracing::{debug, error, info};

use crate::{
    adapters,
    model::object::{
        ListObjectsPage, ListObjectsRequest, ObjectError, ObjectInfo, ObjectMeta, RequestOptions,
        CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE,
    },
    util,
};

const USER_METADATA_PREFIXES: [&str; 2] = ["x-amz-meta-", "x-oss-meta-"];

/// Streams at least this long go up as multipart uploads, one part per chunk.
/// S3 and OSS both require parts other than the last to be at least 5 MiB.
pub const PART_SIZE: usize = 8 * 1024 * 1024;

/// Connection settings layered over the standard AWS environment chain.
#[derive(Clone, Debug, Default)]
pub struct S3Settings {
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub force_path_style: bool,
}

/// Blocking facade over `aws_sdk_s3::Client`. Works against any
/// S3-compatible endpoint, Aliyun OSS included.
pub struct S3Client {
    client: aws_sdk_s3::Client,
    runtime: Arc<Runtime>,
}

impl S3Client {
    pub fn new(client: aws_sdk_s3::Client) -> std::io::Result<Self> {
        Ok(Self {
            client,
            runtime: Arc::new(util::runtime::build_runtime()?),
        })
    }

    pub fn from_settings(settings: &S3Settings) -> std::io::Result<Self> {
        let runtime = util::runtime::build_runtime()?;

        let mut loader = aws_config::from_env();
        if let Some(region) = &settings.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &settings.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = util::runtime::block_until_ready(&runtime, loader.load());
        let client = aws_sdk_s3::Client::from_conf(
            aws_sdk_s3::config::Builder::from(&sdk_config)
                .force_path_style(settings.force_path_style)
                .build(),
        );

        Ok(Self {
            client,
            runtime: Arc::new(runtime),
        })
    }

    fn block_on<Fut: std::future::Future>(&self, future: Fut) -> Fut::Output {
        util::runtime::block_until_ready(&self.runtime, future)
    }
}

fn sdk_error<E, R>(operation: &str, key: &str, err: SdkError<E, R>) -> ObjectError
where
    E: ProvideErrorMetadata + Error + 'static,
    R: Debug,
{
    ObjectError {
        message: format!("failed to {} at: {}, {}", operation, key, DisplayErrorContext(&err)),
        code: err
            .as_service_error()
            .and_then(|svc_err| svc_err.code())
            .map(str::to_string),
    }
}

fn user_metadata_name(option: &str) -> Option<&str> {
    USER_METADATA_PREFIXES
        .iter()
        .find_map(|prefix| option.strip_prefix(prefix))
        .filter(|name| !name.is_empty())
}

fn apply_options(
    mut req: PutObjectFluentBuilder,
    key: &str,
    options: &RequestOptions,
) -> Result<PutObjectFluentBuilder, ObjectError> {
    for (option, value) in options {
        req = match option.as_str() {
            CONTENT_TYPE => req.content_type(value),
            CONTENT_LENGTH => {
                let length = value.parse::<i64>().map_err(|err| {
                    ObjectError::new(format!("invalid content-length for: {}, {}", key, err))
                })?;
                req.content_length(length)
            }
            CONTENT_DISPOSITION => req.content_disposition(value),
            CACHE_CONTROL => req.cache_control(value),
            CONTENT_ENCODING => req.content_encoding(value),
            other => match user_metadata_name(other) {
                Some(name) => req.metadata(name, value),
                None => {
                    debug!(option = other, key = key, "ignoring unsupported request option");
                    req
                }
            },
        };
    }

    Ok(req)
}

/// Same options as `apply_options`, minus `content-length`, which a
/// multipart upload derives from its parts.
fn apply_upload_options(
    mut req: CreateMultipartUploadFluentBuilder,
    key: &str,
    options: &RequestOptions,
) -> CreateMultipartUploadFluentBuilder {
    for (option, value) in options {
        req = match option.as_str() {
            CONTENT_TYPE => req.content_type(value),
            CONTENT_DISPOSITION => req.content_disposition(value),
            CACHE_CONTROL => req.cache_control(value),
            CONTENT_ENCODING => req.content_encoding(value),
            other => match user_metadata_name(other) {
                Some(name) => req.metadata(name, value),
                None => {
                    debug!(option = other, key = key, "ignoring unsupported upload option");
                    req
                }
            },
        };
    }

    req
}

/// Reads up to `size` bytes, fewer only at the end of `body`.
fn read_part(body: &mut dyn Read, key: &str, size: usize) -> Result<Vec<u8>, ObjectError> {
    let mut part = Vec::with_capacity(size);
    (&mut *body)
        .take(size as u64)
        .read_to_end(&mut part)
        .map_err(|err| ObjectError::new(format!("failed to read body for: {}, {}", key, err)))?;

    Ok(part)
}

impl S3Client {
    fn upload_parts(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        first: Vec<u8>,
        body: &mut dyn Read,
    ) -> Result<Vec<CompletedPart>, ObjectError> {
        let mut parts = Vec::new();
        let mut part = first;
        let mut part_number = 1;

        while !part.is_empty() {
            let req = self
                .client
                .upload_part()
                .bucket(bucket)
                .key(key)
                .upload_id(upload_id)
                .part_number(part_number)
                .body(ByteStream::from(part));

            let output = self
                .block_on(req.send())
                .map_err(|err| sdk_error("upload_part", key, err))?;
            debug!(key = key, part_number = part_number, "uploaded part");

            parts.push(
                CompletedPart::builder()
                    .set_e_tag(output.e_tag().map(str::to_string))
                    .part_number(part_number)
                    .build(),
            );

            part_number += 1;
            part = read_part(body, key, PART_SIZE)?;
        }

        Ok(parts)
    }

    fn multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        first: Vec<u8>,
        body: &mut dyn Read,
        options: &RequestOptions,
    ) -> Result<(), ObjectError> {
        let req = self.client.create_multipart_upload().bucket(bucket).key(key);
        let output = self
            .block_on(apply_upload_options(req, key, options).send())
            .map_err(|err| sdk_error("create_multipart_upload", key, err))?;

        let upload_id = output
            .upload_id()
            .ok_or_else(|| ObjectError::new(format!("missing upload id for: {}", key)))?
            .to_string();
        info!(key = key, upload_id = %upload_id, "started multipart upload");

        let result = self
            .upload_parts(bucket, key, &upload_id, first, body)
            .and_then(|parts| {
                let req = self
                    .client
                    .complete_multipart_upload()
                    .bucket(bucket)
                    .key(key)
                    .upload_id(&upload_id)
                    .multipart_upload(
                        CompletedMultipartUpload::builder()
                            .set_parts(Some(parts))
                            .build(),
                    );

                self.block_on(req.send())
                    .map(|_| ())
                    .map_err(|err| sdk_error("complete_multipart_upload", key, err))
            });

        if result.is_err() {
            let req = self
                .client
                .abort_multipart_upload()
                .bucket(bucket)
                .key(key)
                .upload_id(&upload_id);

            if let Err(err) = self.block_on(req.send()) {
                let err = sdk_error("abort_multipart_upload", key, err);
                error!(error_message=%err, error_group="abort_multipart_upload");
            }
        }

        result
    }
}

impl adapters::ObjectClient for S3Client {
    fn object_exists(&self, bucket: &str, key: &str) -> Result<bool, ObjectError> {
        let req = self.client.head_object().bucket(bucket).key(key);

        match self.block_on(req.send()) {
            Ok(_) => Ok(true),
            Err(err) => {
                if let Some(svc_err) = err.as_service_error() {
                    if svc_err.is_not_found() {
                        return Ok(false);
                    }
                }

                Err(sdk_error("head_object", key, err))
            }
        }
    }

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        options: &RequestOptions,
    ) -> Result<(), ObjectError> {
        let req = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body));
        let req = apply_options(req, key, options)?;

        self.block_on(req.send())
            .map_err(|err| sdk_error("put_object", key, err))?;

        Ok(())
    }

    fn put_object_stream(
        &self,
        bucket: &str,
        key: &str,
        body: &mut dyn Read,
        options: &RequestOptions,
    ) -> Result<(), ObjectError> {
        let first = read_part(body, key, PART_SIZE)?;
        if first.len() < PART_SIZE {
            return self.put_object(bucket, key, first, options);
        }

        self.multipart_upload(bucket, key, first, body, options)
    }

    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ObjectError> {
        let req = self.client.get_object().bucket(bucket).key(key);

        let output = self
            .block_on(req.send())
            .map_err(|err| sdk_error("get_object", key, err))?;

        let bytes = self.block_on(output.body.collect()).map_err(|err| {
            ObjectError::new(format!("failed to collect body: {}, {}", key, err))
        })?;

        Ok(bytes.into_bytes().to_vec())
    }

    fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMeta, ObjectError> {
        let req = self.client.head_object().bucket(bucket).key(key);

        let output = self
            .block_on(req.send())
            .map_err(|err| sdk_error("head_object", key, err))?;

        Ok(ObjectMeta {
            content_length: output
                .content_length()
                .and_then(|length| u64::try_from(length).ok()),
            content_type: output.content_type().map(str::to_string),
            last_modified: output
                .last_modified()
                .and_then(|time| time.fmt(DateTimeFormat::HttpDate).ok()),
        })
    }

    fn delete_object(&self, bucket: &str, key: &str) -> Result<(), ObjectError> {
        let req = self.client.delete_object().bucket(bucket).key(key);

        self.block_on(req.send())
            .map_err(|err| sdk_error("delete_object", key, err))?;

        Ok(())
    }

    fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<(), ObjectError> {
        let objects = keys
            .iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| ObjectError::new(format!("failed to build delete_objects: {}", err)))?;

        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(true)
            .build()
            .map_err(|err| ObjectError::new(format!("failed to build delete_objects: {}", err)))?;

        let req = self.client.delete_objects().bucket(bucket).delete(delete);
        let output = self
            .block_on(req.send())
            .map_err(|err| sdk_error("delete_objects", bucket, err))?;

        if let Some(failed) = output.errors().first() {
            return Err(ObjectError {
                message: format!(
                    "failed to delete_objects at: {}, {}",
                    failed.key().unwrap_or(""),
                    failed.message().unwrap_or("unknown error")
                ),
                code: failed.code().map(str::to_string),
            });
        }

        Ok(())
    }

    fn copy_object(
        &self,
        bucket: &str,
        source_key: &str,
        destination_key: &str,
    ) -> Result<(), ObjectError> {
        let req = self
            .client
            .copy_object()
            .copy_source(format!("{}/{}", bucket, urlencoding::encode(source_key)))
            .bucket(bucket)
            .key(destination_key);

        self.block_on(req.send())
            .map_err(|err| sdk_error("copy_object", source_key, err))?;

        Ok(())
    }

    fn list_objects(
        &self,
        bucket: &str,
        request: &ListObjectsRequest,
    ) -> Result<ListObjectsPage, ObjectError> {
        let mut req = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(&request.prefix)
            .max_keys(request.max_keys)
            .set_continuation_token(request.continuation_token.clone());

        if let Some(delimiter) = request.delimiter.as_deref().filter(|d| !d.is_empty()) {
            req = req.delimiter(delimiter);
        }

        let output = self
            .block_on(req.send())
            .map_err(|err| sdk_error("list_objects", &request.prefix, err))?;

        let objects = output
            .contents()
            .iter()
            .map(|o| ObjectInfo {
                key: o.key().unwrap_or("").to_string(),
                size: o.size().and_then(|size| u64::try_from(size).ok()).unwrap_or(0),
                last_modified: o
                    .last_modified()
                    .and_then(|time| time.fmt(DateTimeFormat::DateTime).ok()),
            })
            .collect();

        let common_prefixes = output
            .common_prefixes()
            .iter()
            .filter_map(|p| p.prefix())
            .map(str::to_string)
            .collect();

        let next_continuation_token = if output.is_truncated().unwrap_or(false) {
            output.next_continuation_token().map(str::to_string)
        } else {
            None
        };

        Ok(ListObjectsPage {
            objects,
            common_prefixes,
            next_continuation_token,
        })
    }

    fn presign_get_object(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, ObjectError> {
        let config = PresigningConfig::expires_in(expires_in).map_err(|err| {
            ObjectError::new(format!("invalid presigning config for: {}, {}", key, err))
        })?;

        let req = self.client.get_object().bucket(bucket).key(key);
        let presigned = self
            .block_on(req.presigned(config))
            .map_err(|err| sdk_error("presign get_object", key, err))?;

        Ok(presigned.uri().to_string())
    }
}
