use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => f.write_str("public"),
            Visibility::Private => f.write_str("private"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileAttributes {
    path: String,
    file_size: Option<u64>,
    visibility: Option<Visibility>,
    last_modified: Option<i64>,
    mime_type: Option<String>,
}

impl FileAttributes {
    pub fn new(
        path: impl Into<String>,
        file_size: Option<u64>,
        visibility: Option<Visibility>,
        last_modified: Option<i64>,
        mime_type: Option<String>,
    ) -> Self {
        Self {
            path: path.into(),
            file_size,
            visibility,
            last_modified,
            mime_type,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn file_size(&self) -> Option<u64> {
        self.file_size
    }

    pub fn visibility(&self) -> Option<Visibility> {
        self.visibility
    }

    /// Unix timestamp in seconds.
    pub fn last_modified(&self) -> Option<i64> {
        self.last_modified
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryAttributes {
    path: String,
    visibility: Option<Visibility>,
    last_modified: Option<i64>,
    extra_metadata: BTreeMap<String, String>,
}

impl DirectoryAttributes {
    pub fn new(path: impl Into<String>, visibility: Option<Visibility>, last_modified: Option<i64>) -> Self {
        Self {
            path: path.into(),
            visibility,
            last_modified,
            extra_metadata: BTreeMap::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn visibility(&self) -> Option<Visibility> {
        self.visibility
    }

    pub fn last_modified(&self) -> Option<i64> {
        self.last_modified
    }

    pub fn extra_metadata(&self) -> &BTreeMap<String, String> {
        &self.extra_metadata
    }
}

/// A listing entry: either a file or a (possibly synthesized) directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageAttributes {
    File(FileAttributes),
    Directory(DirectoryAttributes),
}

impl StorageAttributes {
    pub fn path(&self) -> &str {
        match self {
            StorageAttributes::File(file) => file.path(),
            StorageAttributes::Directory(dir) => dir.path(),
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, StorageAttributes::File(_))
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, StorageAttributes::Directory(_))
    }

    pub fn last_modified(&self) -> Option<i64> {
        match self {
            StorageAttributes::File(file) => file.last_modified(),
            StorageAttributes::Directory(dir) => dir.last_modified(),
        }
    }
}
