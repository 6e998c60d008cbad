use crate::{
    filesystem::Config,
    mime_type::MimeTypeDetector,
    model::object::{RequestOptions, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE},
};

/// Generic config names and the request option each one sets.
pub const OPTION_MAPPING: [(&str, &str); 3] = [
    ("mimetype", CONTENT_TYPE),
    ("size", CONTENT_LENGTH),
    ("filename", CONTENT_DISPOSITION),
];

/// Adapter defaults overridden by every mapped option that is truthy in `config`.
pub fn options_from_config(defaults: &RequestOptions, config: &Config) -> RequestOptions {
    let mut options = defaults.clone();

    for (name, option) in OPTION_MAPPING {
        if let Some(value) = config.get_truthy(name) {
            options.insert(option.to_string(), value.to_string());
        }
    }

    options
}

/// Fills in `content-type` from the detector when nothing set it.
pub fn ensure_content_type(
    options: &mut RequestOptions,
    detector: &dyn MimeTypeDetector,
    path: &str,
    content: &[u8],
) {
    if options.contains_key(CONTENT_TYPE) {
        return;
    }

    if let Some(mime_type) = detector.detect_mime_type(path, content) {
        options.insert(CONTENT_TYPE.to_string(), mime_type);
    }
}
