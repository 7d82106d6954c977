pub mod error;
pub mod package;

pub use error::{ErrorCategory, ErrorClassifier, PkgError, Result, ResultExt};
pub use package::{Inventory, PackageRecord};

// =============================================================================
// Domain Newtypes
// =============================================================================

use std::fmt;

/// Maximum length of a sanitized key, leaving room for the timestamp suffix
const MAX_SAFE_KEY_LEN: usize = 100;

/// Filesystem-safe form of a package report key
///
/// Both freshly saved reports and reports rediscovered on disk are indexed
/// under this form, so lookups agree regardless of where an entry came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SafeKey(String);

impl SafeKey {
    /// Transliterate an arbitrary key into a file-name-safe token
    pub fn new(key: &str) -> Self {
        let mut safe: String = key
            .trim()
            .chars()
            .map(|c| match c {
                '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
                c if c.is_control() || c.is_whitespace() => '_',
                c => c,
            })
            .collect();

        // Windows refuses names ending in a dot
        while safe.ends_with('.') {
            safe.pop();
        }

        if safe.chars().count() > MAX_SAFE_KEY_LEN {
            safe = safe.chars().take(MAX_SAFE_KEY_LEN).collect();
        }

        if safe.is_empty() {
            safe.push_str("package");
        }

        Self(safe)
    }

    /// Wrap a token already read back from a file name
    pub fn from_file_stem(stem: &str) -> Self {
        Self(stem.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SafeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SafeKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for SafeKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
