//! Filesystem-style access to a bucket on S3 or any S3-compatible object
//! store, Aliyun OSS included.

pub mod adapters;
pub mod error;
pub mod filesystem;
pub mod fs;
pub mod listing;
pub mod metadata;
pub mod mime_type;
pub mod model;
pub mod options;
pub mod prefixer;
pub mod util;

pub use error::{FilesystemError, FilesystemResult, MetadataAttribute};
pub use filesystem::{Config, FilesystemAdapter};
pub use fs::ObjectFS;
pub use model::fs::{DirectoryAttributes, FileAttributes, StorageAttributes, Visibility};
