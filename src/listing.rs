use std::collections::VecDeque;

use tracing::{debug, error};

use crate::{
    adapters::ObjectClient,
    error::{FilesystemError, FilesystemResult},
    metadata,
    mime_type::MimeTypeDetector,
    model::{fs::StorageAttributes, object::ListObjectsRequest},
    prefixer::PathPrefixer,
};

pub const MAX_KEYS: i32 = 1000;
const DELIMITER: &str = "/";

/// Lazily paginated listing of one directory.
///
/// Each page is fetched only once the previous one has been consumed, so the
/// iterator is single pass: it holds the provider's continuation state and
/// cannot be restarted. After an error it yields nothing more.
pub struct DirectoryListing<'a> {
    client: &'a dyn ObjectClient,
    bucket: &'a str,
    prefixer: &'a PathPrefixer,
    detector: &'a dyn MimeTypeDetector,
    path: String,
    request: ListObjectsRequest,
    buffer: VecDeque<StorageAttributes>,
    exhausted: bool,
}

impl<'a> DirectoryListing<'a> {
    pub(crate) fn new(
        client: &'a dyn ObjectClient,
        bucket: &'a str,
        prefixer: &'a PathPrefixer,
        detector: &'a dyn MimeTypeDetector,
        path: &str,
        deep: bool,
    ) -> Self {
        let mut directory = prefixer
            .prefix_path(path)
            .trim_end_matches(['/', '\\'])
            .to_string();
        if !directory.is_empty() {
            directory.push('/');
        }

        Self {
            client,
            bucket,
            prefixer,
            detector,
            path: path.to_string(),
            request: ListObjectsRequest {
                prefix: directory,
                delimiter: (!deep).then(|| DELIMITER.to_string()),
                max_keys: MAX_KEYS,
                continuation_token: None,
            },
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }

    fn fetch_page(&mut self) -> FilesystemResult<()> {
        let page = self
            .client
            .list_objects(self.bucket, &self.request)
            .map_err(|err| {
                error!(error_message=%err, error_group="list_objects");
                FilesystemError::read(&self.path, err)
            })?;

        debug!(
            prefix = %self.request.prefix,
            objects = page.objects.len(),
            common_prefixes = page.common_prefixes.len(),
            "fetched page"
        );

        let (prefixer, detector) = (self.prefixer, self.detector);
        let directory = self.request.prefix.as_str();
        let entries = page
            .objects
            .iter()
            .map(|object| metadata::object_to_attributes(object, directory, prefixer, detector))
            .chain(
                page.common_prefixes
                    .iter()
                    .map(|prefix| metadata::common_prefix_to_attributes(prefix, prefixer)),
            )
            .filter(|entry| !entry.path().is_empty());
        self.buffer.extend(entries);

        self.exhausted = page.next_continuation_token.is_none();
        self.request.continuation_token = page.next_continuation_token;

        Ok(())
    }
}

impl Iterator for DirectoryListing<'_> {
    type Item = FilesystemResult<StorageAttributes>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.buffer.pop_front() {
                return Some(Ok(entry));
            }

            if self.exhausted {
                return None;
            }

            if let Err(err) = self.fetch_page() {
                self.exhausted = true;
                return Some(Err(err));
            }
        }
    }
}

impl std::iter::FusedIterator for DirectoryListing<'_> {}
