use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("failed to parse bucket uri: {0}")]
pub struct BucketUriError(String);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provider {
    AWS,
    OSS,
}

impl Provider {
    /// Aliyun OSS serves the S3 protocol from a per-region endpoint.
    pub fn default_endpoint(&self, region: Option<&str>) -> Option<String> {
        match (self, region) {
            (Provider::OSS, Some(region)) => Some(format!("https://oss-{}.aliyuncs.com", region)),
            _ => None,
        }
    }
}

/// `s3://bucket/optional/prefix` split into its parts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BucketUri {
    pub provider: Provider,
    pub bucket: String,
    pub prefix: String,
}

pub fn parse_provider_from_uri(bucket_uri: &str) -> Result<Provider, BucketUriError> {
    if bucket_uri.starts_with("s3://") {
        Ok(Provider::AWS)
    } else if bucket_uri.starts_with("oss://") {
        Ok(Provider::OSS)
    } else {
        Err(BucketUriError(format!("unsupported scheme in: {}", bucket_uri)))
    }
}

pub fn parse_bucket_uri(bucket_uri: &str) -> Result<BucketUri, BucketUriError> {
    let provider = parse_provider_from_uri(bucket_uri)?;
    let rest = bucket_uri
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or("");

    let (bucket, prefix) = rest.split_once('/').unwrap_or((rest, ""));
    if bucket.is_empty() {
        return Err(BucketUriError(format!("missing bucket in: {}", bucket_uri)));
    }

    Ok(BucketUri {
        provider,
        bucket: bucket.to_string(),
        prefix: prefix.to_string(),
    })
}
