const SEPARATORS: [char; 2] = ['/', '\\'];
const SEPARATOR: char = '/';

/// Maps caller paths onto bucket keys below a fixed root prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathPrefixer {
    prefix: String,
}

impl PathPrefixer {
    pub fn new(prefix: &str) -> Self {
        let mut trimmed = prefix.trim_end_matches(SEPARATORS).to_string();
        if !trimmed.is_empty() || prefix == "/" {
            trimmed.push(SEPARATOR);
        }

        Self { prefix: trimmed }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn prefix_path(&self, path: &str) -> String {
        format!("{}{}", self.prefix, path.trim_start_matches(SEPARATORS))
    }

    /// Keys outside the prefix are returned unchanged.
    pub fn strip_prefix<'a>(&self, key: &'a str) -> &'a str {
        key.strip_prefix(self.prefix.as_str()).unwrap_or(key)
    }

    pub fn strip_directory_prefix<'a>(&self, key: &'a str) -> &'a str {
        self.strip_prefix(key).trim_end_matches(SEPARATORS)
    }

    /// Directory key with exactly one trailing `/`, however many separators
    /// `path` ends with.
    pub fn prefix_directory_path(&self, path: &str) -> String {
        let prefixed = self.prefix_path(path);
        let trimmed = prefixed.trim_end_matches(SEPARATORS);
        if trimmed.is_empty() {
            return prefixed;
        }

        format!("{}{}", trimmed, SEPARATOR)
    }
}
