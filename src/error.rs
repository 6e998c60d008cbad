use std::fmt;

use thiserror::Error;

use crate::model::object::ObjectError;

/// Attribute named by a failed metadata lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetadataAttribute {
    MimeType,
    LastModified,
    FileSize,
    Visibility,
    Url,
}

impl fmt::Display for MetadataAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetadataAttribute::MimeType => "mime_type",
            MetadataAttribute::LastModified => "last_modified",
            MetadataAttribute::FileSize => "file_size",
            MetadataAttribute::Visibility => "visibility",
            MetadataAttribute::Url => "url",
        };
        f.write_str(name)
    }
}

/// Every failure an adapter operation can report. Provider errors only appear
/// as the `source()` of one of these.
#[derive(Debug, Error)]
pub enum FilesystemError {
    #[error("unable to check existence for: {path}")]
    UnableToCheckExistence {
        path: String,
        #[source]
        cause: ObjectError,
    },

    #[error("unable to write file at location: {path}")]
    UnableToWriteFile {
        path: String,
        #[source]
        cause: Option<ObjectError>,
    },

    #[error("unable to read file from location: {path}. {reason}")]
    UnableToReadFile {
        path: String,
        reason: String,
        #[source]
        cause: Option<ObjectError>,
    },

    #[error("unable to delete file located at: {path}")]
    UnableToDeleteFile {
        path: String,
        #[source]
        cause: ObjectError,
    },

    #[error("unable to delete directory located at: {path}")]
    UnableToDeleteDirectory {
        path: String,
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("unable to create a directory at {path}")]
    UnableToCreateDirectory {
        path: String,
        #[source]
        cause: ObjectError,
    },

    #[error("unable to copy file from {source_path} to {destination}")]
    UnableToCopyFile {
        source_path: String,
        destination: String,
        #[source]
        cause: ObjectError,
    },

    #[error("unable to move file from {source_path} to {destination}")]
    UnableToMoveFile {
        source_path: String,
        destination: String,
        #[source]
        cause: Box<FilesystemError>,
    },

    #[error("unable to retrieve the {attribute} for file at location: {path}. {reason}")]
    UnableToRetrieveMetadata {
        path: String,
        attribute: MetadataAttribute,
        reason: String,
        #[source]
        cause: Option<ObjectError>,
    },

    #[error("unable to set visibility for file {path}. {reason}")]
    UnableToSetVisibility { path: String, reason: String },
}

impl FilesystemError {
    pub(crate) fn read(path: &str, cause: ObjectError) -> Self {
        FilesystemError::UnableToReadFile {
            path: path.to_string(),
            reason: cause.message.clone(),
            cause: Some(cause),
        }
    }

    pub(crate) fn write(path: &str, cause: ObjectError) -> Self {
        FilesystemError::UnableToWriteFile {
            path: path.to_string(),
            cause: Some(cause),
        }
    }

    pub(crate) fn metadata(path: &str, attribute: MetadataAttribute, cause: ObjectError) -> Self {
        FilesystemError::UnableToRetrieveMetadata {
            path: path.to_string(),
            attribute,
            reason: cause.message.clone(),
            cause: Some(cause),
        }
    }

    pub(crate) fn missing_metadata(path: &str, attribute: MetadataAttribute) -> Self {
        FilesystemError::UnableToRetrieveMetadata {
            path: path.to_string(),
            attribute,
            reason: String::new(),
            cause: None,
        }
    }

    /// The path the failed operation was addressing (the source path for
    /// copy and move).
    pub fn location(&self) -> &str {
        match self {
            FilesystemError::UnableToCheckExistence { path, .. }
            | FilesystemError::UnableToWriteFile { path, .. }
            | FilesystemError::UnableToReadFile { path, .. }
            | FilesystemError::UnableToDeleteFile { path, .. }
            | FilesystemError::UnableToDeleteDirectory { path, .. }
            | FilesystemError::UnableToCreateDirectory { path, .. }
            | FilesystemError::UnableToRetrieveMetadata { path, .. }
            | FilesystemError::UnableToSetVisibility { path, .. } => path,
            FilesystemError::UnableToCopyFile { source_path, .. }
            | FilesystemError::UnableToMoveFile { source_path, .. } => source_path,
        }
    }
}

pub type FilesystemResult<T> = Result<T, FilesystemError>;
