use time::{
    format_description::well_known::{Rfc2822, Rfc3339},
    macros::format_description,
    OffsetDateTime, PrimitiveDateTime,
};

use crate::{
    mime_type::MimeTypeDetector,
    model::{
        fs::{DirectoryAttributes, FileAttributes, StorageAttributes},
        object::{ObjectInfo, ObjectMeta},
    },
    prefixer::PathPrefixer,
};

/// Unix seconds for a provider timestamp, `None` when it cannot be parsed.
pub fn parse_timestamp(value: &str) -> Option<i64> {
    let value = value.trim();

    if let Ok(datetime) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(datetime.unix_timestamp());
    }

    let http_date = format_description!(
        "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
    );
    if let Ok(datetime) = PrimitiveDateTime::parse(value, http_date) {
        return Some(datetime.assume_utc().unix_timestamp());
    }

    OffsetDateTime::parse(value, &Rfc2822)
        .ok()
        .map(|datetime| datetime.unix_timestamp())
}

/// Translates one listed object. `directory` is the queried key prefix
/// (empty or ending with `/`).
pub fn object_to_attributes(
    object: &ObjectInfo,
    directory: &str,
    prefixer: &PathPrefixer,
    detector: &dyn MimeTypeDetector,
) -> StorageAttributes {
    let last_modified = object.last_modified.as_deref().and_then(parse_timestamp);

    let is_marker = object.size == 0 && (object.key == directory || object.key.ends_with('/'));
    if is_marker {
        return StorageAttributes::Directory(DirectoryAttributes::new(
            prefixer.strip_directory_prefix(&object.key),
            None,
            last_modified,
        ));
    }

    let path = prefixer.strip_prefix(&object.key);
    StorageAttributes::File(FileAttributes::new(
        path,
        Some(object.size),
        None,
        last_modified,
        detector.detect_mime_type_from_path(path),
    ))
}

pub fn common_prefix_to_attributes(prefix: &str, prefixer: &PathPrefixer) -> StorageAttributes {
    StorageAttributes::Directory(DirectoryAttributes::new(
        prefixer.strip_directory_prefix(prefix),
        None,
        None,
    ))
}

pub fn meta_to_file_attributes(path: &str, meta: &ObjectMeta) -> FileAttributes {
    FileAttributes::new(
        path,
        meta.content_length,
        None,
        meta.last_modified.as_deref().and_then(parse_timestamp),
        meta.content_type.clone(),
    )
}
