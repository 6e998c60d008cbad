use std::{
    io::{Cursor, Read},
    time::Duration,
};

use tracing::{error, info, span, Level};

use crate::{
    adapters::ObjectClient,
    error::{FilesystemError, FilesystemResult, MetadataAttribute},
    filesystem::{Config, FilesystemAdapter, Listing},
    listing::DirectoryListing,
    metadata,
    mime_type::{ExtensionMimeTypeDetector, MimeTypeDetector},
    model::{
        fs::{FileAttributes, Visibility},
        object::{ListObjectsRequest, ObjectError, RequestOptions, CONTENT_TYPE},
    },
    options,
    prefixer::PathPrefixer,
};

/// Lifetime of URLs handed out by `get_url`.
pub const URL_EXPIRY: Duration = Duration::from_secs(60 * 60);

const DELETE_BATCH: usize = 1000;
const MIME_SNIFF_LEN: u64 = 512;
const VISIBILITY_UNSUPPORTED: &str = "visibility is not supported by this adapter";
const READ_STREAM_UNSUPPORTED: &str = "streaming reads are not supported by this adapter";

/// A bucket, optionally scoped to a key prefix, exposed as a filesystem.
pub struct ObjectFS {
    client: Box<dyn ObjectClient>,
    bucket: String,
    prefixer: PathPrefixer,
    mime_type_detector: Box<dyn MimeTypeDetector>,
    options: RequestOptions,
}

impl ObjectFS {
    pub fn new(client: Box<dyn ObjectClient>, bucket: &str, prefix: &str) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
            prefixer: PathPrefixer::new(prefix),
            mime_type_detector: Box::new(ExtensionMimeTypeDetector),
            options: RequestOptions::new(),
        }
    }

    pub fn with_mime_type_detector(mut self, detector: Box<dyn MimeTypeDetector>) -> Self {
        self.mime_type_detector = detector;
        self
    }

    /// Request options applied to every write before per-call config.
    pub fn with_default_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn prefixer(&self) -> &PathPrefixer {
        &self.prefixer
    }

    /// Same as `list_contents`, without boxing the iterator.
    pub fn list(&self, path: &str, deep: bool) -> DirectoryListing<'_> {
        DirectoryListing::new(
            self.client.as_ref(),
            &self.bucket,
            &self.prefixer,
            self.mime_type_detector.as_ref(),
            path,
            deep,
        )
    }

    /// Presigned GET URL valid for `URL_EXPIRY`.
    pub fn get_url(&self, path: &str) -> FilesystemResult<String> {
        let span = span!(Level::INFO, "get_url", context = "get_url");
        let _e = span.enter();
        info!(path = path, "called");

        let key = self.prefixer.prefix_path(path);
        self.client
            .presign_get_object(&self.bucket, &key, URL_EXPIRY)
            .map_err(|err| {
                error!(error_message=%err, error_group="presign_get_object");
                FilesystemError::metadata(path, MetadataAttribute::Url, err)
            })
    }

    fn fetch_file_metadata(
        &self,
        path: &str,
        attribute: MetadataAttribute,
    ) -> FilesystemResult<FileAttributes> {
        let key = self.prefixer.prefix_path(path);

        let meta = self.client.head_object(&self.bucket, &key).map_err(|err| {
            error!(error_message=%err, error_group="head_object");
            FilesystemError::metadata(path, attribute, err)
        })?;

        Ok(metadata::meta_to_file_attributes(path, &meta))
    }
}

impl FilesystemAdapter for ObjectFS {
    fn file_exists(&self, path: &str) -> FilesystemResult<bool> {
        let span = span!(Level::INFO, "file_exists", context = "file_exists");
        let _e = span.enter();
        info!(path = path, "called");

        let key = self.prefixer.prefix_path(path);
        self.client
            .object_exists(&self.bucket, &key)
            .map_err(|err| {
                error!(error_message=%err, error_group="object_exists");
                FilesystemError::UnableToCheckExistence {
                    path: path.to_string(),
                    cause: err,
                }
            })
    }

    fn directory_exists(&self, path: &str) -> FilesystemResult<bool> {
        let span = span!(Level::INFO, "directory_exists", context = "directory_exists");
        let _e = span.enter();
        info!(path = path, "called");

        let request = ListObjectsRequest {
            prefix: self.prefixer.prefix_directory_path(path),
            delimiter: Some("/".to_string()),
            max_keys: 1,
            continuation_token: None,
        };

        let page = self
            .client
            .list_objects(&self.bucket, &request)
            .map_err(|err| {
                error!(error_message=%err, error_group="list_objects");
                FilesystemError::UnableToCheckExistence {
                    path: path.to_string(),
                    cause: err,
                }
            })?;

        Ok(!page.objects.is_empty() || !page.common_prefixes.is_empty())
    }

    fn write(&self, path: &str, contents: &[u8], config: &Config) -> FilesystemResult<()> {
        let span = span!(Level::INFO, "write", context = "write");
        let _e = span.enter();
        info!(path = path, size = contents.len(), "called");

        let key = self.prefixer.prefix_path(path);
        let mut options = options::options_from_config(&self.options, config);
        options::ensure_content_type(&mut options, self.mime_type_detector.as_ref(), path, contents);

        self.client
            .put_object(&self.bucket, &key, contents.to_vec(), &options)
            .map_err(|err| {
                error!(error_message=%err, error_group="put_object");
                FilesystemError::write(path, err)
            })
    }

    fn write_stream(&self, path: &str, contents: &mut dyn Read, config: &Config) -> FilesystemResult<()> {
        let span = span!(Level::INFO, "write_stream", context = "write_stream");
        let _e = span.enter();
        info!(path = path, "called");

        let key = self.prefixer.prefix_path(path);
        let mut options = options::options_from_config(&self.options, config);

        let mut head = Vec::new();
        if !options.contains_key(CONTENT_TYPE) {
            (&mut *contents)
                .take(MIME_SNIFF_LEN)
                .read_to_end(&mut head)
                .map_err(|err| {
                    error!(error_message=%err, error_group="read_stream_head");
                    FilesystemError::UnableToWriteFile {
                        path: path.to_string(),
                        cause: Some(ObjectError::new(format!(
                            "failed to read contents for: {}, {}",
                            path, err
                        ))),
                    }
                })?;
            options::ensure_content_type(&mut options, self.mime_type_detector.as_ref(), path, &head);
        }

        let mut body = Cursor::new(head).chain(contents);
        self.client
            .put_object_stream(&self.bucket, &key, &mut body, &options)
            .map_err(|err| {
                error!(error_message=%err, error_group="put_object_stream");
                FilesystemError::write(path, err)
            })
    }

    fn read(&self, path: &str) -> FilesystemResult<Vec<u8>> {
        let span = span!(Level::INFO, "read", context = "read");
        let _e = span.enter();
        info!(path = path, "called");

        let key = self.prefixer.prefix_path(path);
        self.client.get_object(&self.bucket, &key).map_err(|err| {
            error!(error_message=%err, error_group="get_object");
            FilesystemError::read(path, err)
        })
    }

    fn read_stream(&self, path: &str) -> FilesystemResult<Box<dyn Read + Send>> {
        info!(path = path, "read_stream called");

        Err(FilesystemError::UnableToReadFile {
            path: path.to_string(),
            reason: READ_STREAM_UNSUPPORTED.to_string(),
            cause: None,
        })
    }

    fn delete(&self, path: &str) -> FilesystemResult<()> {
        let span = span!(Level::INFO, "delete", context = "delete");
        let _e = span.enter();
        info!(path = path, "called");

        let key = self.prefixer.prefix_path(path);
        self.client.delete_object(&self.bucket, &key).map_err(|err| {
            error!(error_message=%err, error_group="delete_object");
            FilesystemError::UnableToDeleteFile {
                path: path.to_string(),
                cause: err,
            }
        })
    }

    fn delete_directory(&self, path: &str) -> FilesystemResult<()> {
        let span = span!(Level::INFO, "delete_directory", context = "delete_directory");
        let _e = span.enter();
        info!(path = path, "called");

        let mut keys = Vec::new();
        for entry in self.list(path, true) {
            let entry = entry.map_err(|err| FilesystemError::UnableToDeleteDirectory {
                path: path.to_string(),
                cause: Box::new(err),
            })?;

            keys.push(if entry.is_dir() {
                self.prefixer.prefix_directory_path(entry.path())
            } else {
                self.prefixer.prefix_path(entry.path())
            });
        }

        info!(path = path, objects = keys.len(), "deleting");

        for batch in keys.chunks(DELETE_BATCH) {
            self.client
                .delete_objects(&self.bucket, batch)
                .map_err(|err| {
                    error!(error_message=%err, error_group="delete_objects");
                    FilesystemError::UnableToDeleteDirectory {
                        path: path.to_string(),
                        cause: Box::new(err),
                    }
                })?;
        }

        Ok(())
    }

    fn create_directory(&self, path: &str, config: &Config) -> FilesystemResult<()> {
        let span = span!(Level::INFO, "create_directory", context = "create_directory");
        let _e = span.enter();
        info!(path = path, "called");

        let key = self.prefixer.prefix_directory_path(path);
        let options = options::options_from_config(&self.options, config);

        self.client
            .put_object(&self.bucket, &key, Vec::new(), &options)
            .map_err(|err| {
                error!(error_message=%err, error_group="put_object");
                FilesystemError::UnableToCreateDirectory {
                    path: path.to_string(),
                    cause: err,
                }
            })
    }

    fn set_visibility(&self, path: &str, visibility: Visibility) -> FilesystemResult<()> {
        info!(path = path, visibility = %visibility, "set_visibility called");

        Err(FilesystemError::UnableToSetVisibility {
            path: path.to_string(),
            reason: VISIBILITY_UNSUPPORTED.to_string(),
        })
    }

    fn visibility(&self, path: &str) -> FilesystemResult<FileAttributes> {
        info!(path = path, "visibility called");

        Err(FilesystemError::UnableToRetrieveMetadata {
            path: path.to_string(),
            attribute: MetadataAttribute::Visibility,
            reason: VISIBILITY_UNSUPPORTED.to_string(),
            cause: None,
        })
    }

    fn mime_type(&self, path: &str) -> FilesystemResult<FileAttributes> {
        let span = span!(Level::INFO, "mime_type", context = "mime_type");
        let _e = span.enter();
        info!(path = path, "called");

        let attributes = self.fetch_file_metadata(path, MetadataAttribute::MimeType)?;
        if attributes.mime_type().is_none() {
            return Err(FilesystemError::missing_metadata(path, MetadataAttribute::MimeType));
        }

        Ok(attributes)
    }

    fn last_modified(&self, path: &str) -> FilesystemResult<FileAttributes> {
        let span = span!(Level::INFO, "last_modified", context = "last_modified");
        let _e = span.enter();
        info!(path = path, "called");

        let attributes = self.fetch_file_metadata(path, MetadataAttribute::LastModified)?;
        if attributes.last_modified().is_none() {
            return Err(FilesystemError::missing_metadata(path, MetadataAttribute::LastModified));
        }

        Ok(attributes)
    }

    fn file_size(&self, path: &str) -> FilesystemResult<FileAttributes> {
        let span = span!(Level::INFO, "file_size", context = "file_size");
        let _e = span.enter();
        info!(path = path, "called");

        let attributes = self.fetch_file_metadata(path, MetadataAttribute::FileSize)?;
        if attributes.file_size().is_none() {
            return Err(FilesystemError::missing_metadata(path, MetadataAttribute::FileSize));
        }

        Ok(attributes)
    }

    fn list_contents(&self, path: &str, deep: bool) -> Listing<'_> {
        info!(path = path, deep = deep, "list_contents called");

        Box::new(self.list(path, deep))
    }

    fn move_file(&self, source: &str, destination: &str, config: &Config) -> FilesystemResult<()> {
        let span = span!(Level::INFO, "move_file", context = "move_file");
        let _e = span.enter();
        info!(source = source, destination = destination, "called");

        // The source is only deleted once the copy has succeeded.
        self.copy(source, destination, config)
            .and_then(|_| self.delete(source))
            .map_err(|err| FilesystemError::UnableToMoveFile {
                source_path: source.to_string(),
                destination: destination.to_string(),
                cause: Box::new(err),
            })
    }

    fn copy(&self, source: &str, destination: &str, _config: &Config) -> FilesystemResult<()> {
        let span = span!(Level::INFO, "copy", context = "copy");
        let _e = span.enter();
        info!(source = source, destination = destination, "called");

        let source_key = self.prefixer.prefix_path(source);
        let destination_key = self.prefixer.prefix_path(destination);

        self.client
            .copy_object(&self.bucket, &source_key, &destination_key)
            .map_err(|err| {
                error!(error_message=%err, error_group="copy_object");
                FilesystemError::UnableToCopyFile {
                    source_path: source.to_string(),
                    destination: destination.to_string(),
                    cause: err,
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeSet, error::Error, sync::Arc, thread};

    use super::*;
    use crate::{
        adapters::mock::{MockClient, MockOperation},
        model::fs::StorageAttributes,
    };

    const BUCKET: &str = "dummy-bucket";

    fn adapter(prefix: &str) -> (ObjectFS, MockClient) {
        let client = MockClient::new();
        let fs = ObjectFS::new(Box::new(client.clone()), BUCKET, prefix);
        (fs, client)
    }

    fn collect(fs: &ObjectFS, path: &str, deep: bool) -> Vec<StorageAttributes> {
        fs.list_contents(path, deep)
            .collect::<FilesystemResult<Vec<_>>>()
            .unwrap()
    }

    fn paths(entries: &[StorageAttributes]) -> BTreeSet<(String, bool)> {
        entries
            .iter()
            .map(|entry| (entry.path().to_string(), entry.is_dir()))
            .collect()
    }

    #[test]
    fn test_overwriting_a_file() {
        let (fs, _) = adapter("");

        fs.write("path.txt", b"contents", &Config::new()).unwrap();
        fs.write("path.txt", b"new contents", &Config::new()).unwrap();

        assert_eq!(fs.read("path.txt").unwrap(), b"new contents".to_vec());
    }

    #[test]
    fn test_creating_zero_dir() {
        let (fs, _) = adapter("");

        fs.write("0/file.txt", b"contents", &Config::new()).unwrap();

        assert_eq!(fs.read("0/file.txt").unwrap(), b"contents".to_vec());
        assert!(fs.directory_exists("0").unwrap());
    }

    #[test]
    fn test_prefix_scopes_keys() {
        let (fs, client) = adapter("root/");

        fs.write("/a.txt", b"a", &Config::new()).unwrap();
        fs.create_directory("dir", &Config::new()).unwrap();

        assert_eq!(client.keys(BUCKET), vec!["root/a.txt".to_string(), "root/dir/".to_string()]);
        assert_eq!(
            paths(&collect(&fs, "", false)),
            BTreeSet::from([("a.txt".to_string(), false), ("dir".to_string(), true)])
        );
    }

    #[test]
    fn test_write_detects_mime_type() {
        let (fs, _) = adapter("");

        let cases = vec![
            ("page.html", Config::new(), "text/html"),
            ("notes", Config::new(), "text/plain"),
            ("page.html", Config::new().with("mimetype", "text/x-custom"), "text/x-custom"),
            ("page.html", Config::new().with("mimetype", ""), "text/html"),
        ];

        for (path, config, expected) in cases {
            fs.write(path, b"<p>hello</p>", &config).unwrap();
            let attributes = fs.mime_type(path).unwrap();
            assert_eq!(attributes.mime_type(), Some(expected), "failed for case: {}", path);
        }
    }

    #[test]
    fn test_default_options_apply() {
        let client = MockClient::new();
        let mut defaults = RequestOptions::new();
        defaults.insert(CONTENT_TYPE.to_string(), "application/x-default".to_string());
        let fs = ObjectFS::new(Box::new(client), BUCKET, "").with_default_options(defaults);

        fs.write("a.txt", b"a", &Config::new()).unwrap();

        assert_eq!(fs.mime_type("a.txt").unwrap().mime_type(), Some("application/x-default"));
    }

    #[test]
    fn test_write_stream_sniffs_and_keeps_all_bytes() {
        let (fs, _) = adapter("");
        let mut contents = b"\x89PNG\r\n\x1a\n".to_vec();
        contents.extend(std::iter::repeat(7u8).take(2048));

        fs.write_stream("image", &mut Cursor::new(contents.clone()), &Config::new())
            .unwrap();

        assert_eq!(fs.read("image").unwrap(), contents);
        assert_eq!(fs.mime_type("image").unwrap().mime_type(), Some("image/png"));
    }

    #[test]
    fn test_write_stream_with_configured_mime_type() {
        let (fs, _) = adapter("");

        fs.write_stream(
            "data.bin",
            &mut Cursor::new(b"abc".to_vec()),
            &Config::new().with("mimetype", "application/x-thing"),
        )
        .unwrap();

        assert_eq!(fs.read("data.bin").unwrap(), b"abc".to_vec());
        assert_eq!(fs.mime_type("data.bin").unwrap().mime_type(), Some("application/x-thing"));
    }

    #[test]
    fn test_read_missing_file() {
        let (fs, _) = adapter("");

        let err = fs.read("missing.txt").unwrap_err();

        assert!(matches!(err, FilesystemError::UnableToReadFile { cause: Some(_), .. }));
        assert_eq!(err.location(), "missing.txt");
    }

    #[test]
    fn test_read_stream_always_fails() {
        let (fs, _) = adapter("");
        fs.write("exists.txt", b"x", &Config::new()).unwrap();

        for path in ["exists.txt", "missing.txt"] {
            let err = fs.read_stream(path).err().unwrap();
            assert!(
                matches!(err, FilesystemError::UnableToReadFile { cause: None, .. }),
                "failed for case: {}",
                path
            );
        }
    }

    #[test]
    fn test_visibility_always_fails() {
        let (fs, _) = adapter("");
        fs.write("path.txt", b"x", &Config::new()).unwrap();

        for path in ["path.txt", "missing.txt"] {
            assert!(
                matches!(
                    fs.visibility(path),
                    Err(FilesystemError::UnableToRetrieveMetadata {
                        attribute: MetadataAttribute::Visibility,
                        ..
                    })
                ),
                "failed for case: {}",
                path
            );
            for visibility in [Visibility::Public, Visibility::Private] {
                assert!(
                    matches!(
                        fs.set_visibility(path, visibility),
                        Err(FilesystemError::UnableToSetVisibility { .. })
                    ),
                    "failed for case: {}",
                    path
                );
            }
        }
    }

    #[test]
    fn test_file_exists_and_delete() {
        let (fs, _) = adapter("");
        fs.write("a.txt", b"a", &Config::new()).unwrap();

        assert!(fs.file_exists("a.txt").unwrap());
        fs.delete("a.txt").unwrap();
        assert!(!fs.file_exists("a.txt").unwrap());
    }

    #[test]
    fn test_create_directory() {
        let (fs, client) = adapter("");

        fs.create_directory("path", &Config::new()).unwrap();

        assert_eq!(client.keys(BUCKET), vec!["path/".to_string()]);
        assert!(fs.directory_exists("path").unwrap());
        assert!(!fs.directory_exists("other").unwrap());
    }

    #[test]
    fn test_listing_contents_recursive() {
        let (fs, _) = adapter("");

        fs.create_directory("path", &Config::new()).unwrap();
        fs.write("path/file.txt", b"string", &Config::new()).unwrap();

        let items = collect(&fs, "", true);
        assert_eq!(items.len(), 2, "unexpected listing: {:?}", items);
        assert_eq!(
            paths(&items),
            BTreeSet::from([("path".to_string(), true), ("path/file.txt".to_string(), false)])
        );
    }

    #[test]
    fn test_listing_contents_shallow() {
        let (fs, _) = adapter("");

        fs.write("dir/file.txt", b"file", &Config::new()).unwrap();
        fs.write("dir/sub/nested.txt", b"nested", &Config::new()).unwrap();
        fs.write("outside.txt", b"outside", &Config::new()).unwrap();

        let items = collect(&fs, "dir", false);
        assert_eq!(
            paths(&items),
            BTreeSet::from([("dir/file.txt".to_string(), false), ("dir/sub".to_string(), true)])
        );

        let file = items.iter().find(|entry| entry.is_file()).unwrap();
        match file {
            StorageAttributes::File(attributes) => {
                assert_eq!(attributes.file_size(), Some(4));
                assert_eq!(attributes.mime_type(), Some("text/plain"));
                assert!(attributes.last_modified().is_some());
            }
            StorageAttributes::Directory(_) => unreachable!(),
        }

        let deep = collect(&fs, "dir", true);
        assert_eq!(
            paths(&deep),
            BTreeSet::from([
                ("dir/file.txt".to_string(), false),
                ("dir/sub/nested.txt".to_string(), false)
            ])
        );
    }

    #[test]
    fn test_listing_fetches_pages_lazily() {
        let (fs, client) = adapter("");
        for i in 0..2500 {
            fs.write(&format!("many/{:04}.txt", i), b"x", &Config::new()).unwrap();
        }

        let mut listing = fs.list("many", true);
        assert_eq!(client.list_calls(), 0);

        listing.next().unwrap().unwrap();
        assert_eq!(client.list_calls(), 1);

        assert_eq!(listing.count(), 2499);
        assert_eq!(client.list_calls(), 3);
    }

    #[test]
    fn test_listing_error_ends_iteration() {
        let (fs, client) = adapter("");
        fs.write("a.txt", b"a", &Config::new()).unwrap();
        client.fail_on(MockOperation::List);

        let mut listing = fs.list("", false);

        assert!(matches!(listing.next(), Some(Err(FilesystemError::UnableToReadFile { .. }))));
        assert!(listing.next().is_none());
    }

    #[test]
    fn test_delete_directory() {
        let (fs, client) = adapter("");

        fs.create_directory("dir", &Config::new()).unwrap();
        fs.create_directory("dir/sub", &Config::new()).unwrap();
        fs.write("dir/a.txt", b"a", &Config::new()).unwrap();
        fs.write("dir/sub/b.txt", b"b", &Config::new()).unwrap();
        fs.write("dirty.txt", b"keep", &Config::new()).unwrap();

        fs.delete_directory("dir").unwrap();

        assert_eq!(client.keys(BUCKET), vec!["dirty.txt".to_string()]);
    }

    #[test]
    fn test_directory_marker_ignores_trailing_separator() {
        let cases = vec!["dir", "dir/", "dir//", "dir\\"];

        for path in cases {
            let (fs, client) = adapter("");

            fs.create_directory(path, &Config::new()).unwrap();
            assert_eq!(client.keys(BUCKET), vec!["dir/".to_string()], "failed for case: {}", path);

            fs.delete_directory("dir").unwrap();
            assert!(client.keys(BUCKET).is_empty(), "failed for case: {}", path);
        }
    }

    #[test]
    fn test_delete_directory_in_batches() {
        let (fs, client) = adapter("");
        for i in 0..1500 {
            fs.write(&format!("bulk/{:04}.txt", i), b"x", &Config::new()).unwrap();
        }

        fs.delete_directory("bulk").unwrap();

        assert!(client.keys(BUCKET).is_empty());
    }

    #[test]
    fn test_copying_a_file() {
        let (fs, _) = adapter("");
        fs.write("source.txt", b"contents to be copied", &Config::new()).unwrap();

        fs.copy("source.txt", "destination.txt", &Config::new()).unwrap();

        assert!(fs.file_exists("source.txt").unwrap());
        assert!(fs.file_exists("destination.txt").unwrap());
        assert_eq!(fs.read("source.txt").unwrap(), b"contents to be copied".to_vec());
        assert_eq!(fs.read("destination.txt").unwrap(), b"contents to be copied".to_vec());
    }

    #[test]
    fn test_moving_a_file() {
        let (fs, _) = adapter("");
        fs.write("source.txt", b"contents to be copied", &Config::new()).unwrap();

        fs.move_file("source.txt", "destination.txt", &Config::new()).unwrap();

        assert!(!fs.file_exists("source.txt").unwrap());
        assert!(fs.file_exists("destination.txt").unwrap());
        assert_eq!(fs.read("destination.txt").unwrap(), b"contents to be copied".to_vec());
    }

    #[test]
    fn test_move_keeps_source_when_copy_fails() {
        let (fs, client) = adapter("");
        fs.write("source.txt", b"contents", &Config::new()).unwrap();
        client.fail_on(MockOperation::Copy);

        let err = fs.move_file("source.txt", "destination.txt", &Config::new()).unwrap_err();

        assert!(matches!(err, FilesystemError::UnableToMoveFile { .. }));
        let cause = err.source().unwrap().to_string();
        assert_eq!(cause, "unable to copy file from source.txt to destination.txt");

        client.clear_failures();
        assert!(fs.file_exists("source.txt").unwrap());
        assert!(!fs.file_exists("destination.txt").unwrap());
    }

    #[test]
    fn test_move_reports_delete_failure_as_move() {
        let (fs, client) = adapter("");
        fs.write("source.txt", b"contents", &Config::new()).unwrap();
        client.fail_on(MockOperation::Delete);

        let err = fs.move_file("source.txt", "destination.txt", &Config::new()).unwrap_err();

        assert!(matches!(err, FilesystemError::UnableToMoveFile { .. }));
        assert_eq!(err.location(), "source.txt");

        client.clear_failures();
        assert!(fs.file_exists("destination.txt").unwrap());
    }

    #[test]
    fn test_metadata() {
        let (fs, _) = adapter("");
        fs.write("file.txt", b"twelve bytes", &Config::new()).unwrap();

        assert_eq!(fs.file_size("file.txt").unwrap().file_size(), Some(12));
        assert_eq!(fs.mime_type("file.txt").unwrap().mime_type(), Some("text/plain"));
        assert!(fs.last_modified("file.txt").unwrap().last_modified().is_some());
        assert_eq!(fs.file_size("file.txt").unwrap().path(), "file.txt");
    }

    #[test]
    fn test_unknown_mime_type_fails() {
        let (fs, _) = adapter("");
        fs.write("blank", b"", &Config::new()).unwrap();

        let err = fs.mime_type("blank").unwrap_err();

        assert!(matches!(
            err,
            FilesystemError::UnableToRetrieveMetadata {
                attribute: MetadataAttribute::MimeType,
                cause: None,
                ..
            }
        ));
    }

    #[test]
    fn test_metadata_of_missing_file() {
        let (fs, _) = adapter("");

        let cases = vec![
            (fs.mime_type("missing"), MetadataAttribute::MimeType),
            (fs.last_modified("missing"), MetadataAttribute::LastModified),
            (fs.file_size("missing"), MetadataAttribute::FileSize),
        ];

        for (result, expected) in cases {
            match result {
                Err(FilesystemError::UnableToRetrieveMetadata { attribute, cause, .. }) => {
                    assert_eq!(attribute, expected);
                    assert!(cause.is_some(), "failed for case: {}", expected);
                }
                other => panic!("unexpected result for {}: {:?}", expected, other),
            }
        }
    }

    #[test]
    fn test_get_url() {
        let (fs, _) = adapter("root");

        let url = fs.get_url("dir/file name.txt").unwrap();

        assert!(url.starts_with("https://dummy-bucket.mock.invalid/root/dir/file%20name.txt?"), "unexpected: {}", url);
        assert!(url.contains("Expires="));
    }

    #[test]
    fn test_provider_failures_are_operation_tagged() {
        let (fs, client) = adapter("");
        fs.write("a.txt", b"a", &Config::new()).unwrap();

        client.fail_on(MockOperation::Exists);
        assert!(matches!(fs.file_exists("a.txt"), Err(FilesystemError::UnableToCheckExistence { .. })));

        client.fail_on(MockOperation::Put);
        assert!(matches!(
            fs.write("a.txt", b"b", &Config::new()),
            Err(FilesystemError::UnableToWriteFile { cause: Some(_), .. })
        ));
        assert!(matches!(
            fs.write_stream("a.txt", &mut Cursor::new(b"b".to_vec()), &Config::new()),
            Err(FilesystemError::UnableToWriteFile { .. })
        ));
        assert!(matches!(
            fs.create_directory("d", &Config::new()),
            Err(FilesystemError::UnableToCreateDirectory { .. })
        ));

        client.fail_on(MockOperation::Get);
        assert!(matches!(fs.read("a.txt"), Err(FilesystemError::UnableToReadFile { .. })));

        client.fail_on(MockOperation::Delete);
        assert!(matches!(fs.delete("a.txt"), Err(FilesystemError::UnableToDeleteFile { .. })));

        client.fail_on(MockOperation::DeleteMany);
        assert!(matches!(fs.delete_directory(""), Err(FilesystemError::UnableToDeleteDirectory { .. })));

        client.fail_on(MockOperation::Copy);
        assert!(matches!(
            fs.copy("a.txt", "b.txt", &Config::new()),
            Err(FilesystemError::UnableToCopyFile { .. })
        ));

        client.fail_on(MockOperation::Presign);
        assert!(matches!(
            fs.get_url("a.txt"),
            Err(FilesystemError::UnableToRetrieveMetadata {
                attribute: MetadataAttribute::Url,
                ..
            })
        ));

        client.fail_on(MockOperation::List);
        assert!(matches!(fs.directory_exists(""), Err(FilesystemError::UnableToCheckExistence { .. })));
    }

    #[test]
    fn test_shared_across_threads() {
        let (fs, _) = adapter("");
        let fs = Arc::new(fs);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let fs = fs.clone();
                thread::spawn(move || {
                    let path = format!("thread/{}.txt", i);
                    fs.write(&path, path.as_bytes(), &Config::new()).unwrap();
                    fs.read(&path).unwrap()
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), format!("thread/{}.txt", i).into_bytes());
        }
        assert_eq!(collect(&fs, "thread", false).len(), 8);
    }
}
