use std::{collections::BTreeMap, io::Read};

use crate::{
    error::FilesystemResult,
    model::fs::{FileAttributes, StorageAttributes, Visibility},
};

/// Per-call options handed to writes, directory creation, copy and move.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    options: BTreeMap<String, String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }

    /// Present, non-empty and not `"0"`.
    pub fn get_truthy(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|value| !value.is_empty() && *value != "0")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Config {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            options: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

/// Lazily fetched listing. Single pass: it cannot be rewound and stops after
/// the first error.
pub type Listing<'a> = Box<dyn Iterator<Item = FilesystemResult<StorageAttributes>> + 'a>;

/// The generic filesystem surface storage backends implement.
pub trait FilesystemAdapter {
    fn file_exists(&self, path: &str) -> FilesystemResult<bool>;

    fn directory_exists(&self, path: &str) -> FilesystemResult<bool>;

    fn write(&self, path: &str, contents: &[u8], config: &Config) -> FilesystemResult<()>;

    fn write_stream(&self, path: &str, contents: &mut dyn Read, config: &Config) -> FilesystemResult<()>;

    fn read(&self, path: &str) -> FilesystemResult<Vec<u8>>;

    fn read_stream(&self, path: &str) -> FilesystemResult<Box<dyn Read + Send>>;

    fn delete(&self, path: &str) -> FilesystemResult<()>;

    fn delete_directory(&self, path: &str) -> FilesystemResult<()>;

    fn create_directory(&self, path: &str, config: &Config) -> FilesystemResult<()>;

    fn set_visibility(&self, path: &str, visibility: Visibility) -> FilesystemResult<()>;

    fn visibility(&self, path: &str) -> FilesystemResult<FileAttributes>;

    fn mime_type(&self, path: &str) -> FilesystemResult<FileAttributes>;

    fn last_modified(&self, path: &str) -> FilesystemResult<FileAttributes>;

    fn file_size(&self, path: &str) -> FilesystemResult<FileAttributes>;

    fn list_contents(&self, path: &str, deep: bool) -> Listing<'_>;

    fn move_file(&self, source: &str, destination: &str, config: &Config) -> FilesystemResult<()>;

    fn copy(&self, source: &str, destination: &str, config: &Config) -> FilesystemResult<()>;
}
