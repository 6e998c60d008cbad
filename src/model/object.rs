use std::collections::BTreeMap;

use thiserror::Error;

/// Provider request options keyed by their wire name (`content-type`,
/// `content-length`, `x-amz-meta-*`, ...).
pub type RequestOptions = BTreeMap<String, String>;

pub const CONTENT_TYPE: &str = "content-type";
pub const CONTENT_LENGTH: &str = "content-length";
pub const CONTENT_DISPOSITION: &str = "content-disposition";
pub const CACHE_CONTROL: &str = "cache-control";
pub const CONTENT_ENCODING: &str = "content-encoding";

/// The single failure type every `ObjectClient` reports.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ObjectError {
    pub message: String,
    pub code: Option<String>,
}

impl ObjectError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: Some(code.into()),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.code.as_deref(), Some("NoSuchKey" | "NotFound"))
    }
}

/// One entry of a listing page, as the provider reports it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectInfo {
    pub key: String,
    pub size: u64,
    /// RFC 3339 timestamp as found in listing responses.
    pub last_modified: Option<String>,
}

/// Result of a metadata-head request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectMeta {
    pub content_length: Option<u64>,
    pub content_type: Option<String>,
    /// HTTP-date as found in the `last-modified` response header.
    pub last_modified: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct ListObjectsRequest {
    pub prefix: String,
    pub delimiter: Option<String>,
    pub max_keys: i32,
    pub continuation_token: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct ListObjectsPage {
    pub objects: Vec<ObjectInfo>,
    pub common_prefixes: Vec<String>,
    pub next_continuation_token: Option<String>,
}
