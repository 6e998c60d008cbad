use std::{io::Read, time::Duration};

use crate::model::object::{
    ListObjectsPage, ListObjectsRequest, ObjectError, ObjectMeta, RequestOptions,
};

pub mod mock;
pub mod s3;

/// Blocking object-storage operations the filesystem layer is built on.
pub trait ObjectClient: Send + Sync {
    fn object_exists(&self, bucket: &str, key: &str) -> Result<bool, ObjectError>;

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        options: &RequestOptions,
    ) -> Result<(), ObjectError>;

    /// Uploads `body` until it is exhausted. Implementations decide how much
    /// of it to hold at once: `S3Client` buffers one `s3::PART_SIZE` chunk
    /// and switches to a multipart upload for longer bodies, while
    /// `MockClient` reads everything into memory.
    fn put_object_stream(
        &self,
        bucket: &str,
        key: &str,
        body: &mut dyn Read,
        options: &RequestOptions,
    ) -> Result<(), ObjectError>;

    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ObjectError>;

    fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMeta, ObjectError>;

    fn delete_object(&self, bucket: &str, key: &str) -> Result<(), ObjectError>;

    /// Deletes at most 1000 keys in one request.
    fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<(), ObjectError>;

    fn copy_object(
        &self,
        bucket: &str,
        source_key: &str,
        destination_key: &str,
    ) -> Result<(), ObjectError>;

    fn list_objects(
        &self,
        bucket: &str,
        request: &ListObjectsRequest,
    ) -> Result<ListObjectsPage, ObjectError>;

    fn presign_get_object(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, ObjectError>;
}
