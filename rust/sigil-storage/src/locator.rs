use std::fmt;

use serde::{Deserialize, Serialize};

/// Names an object: the container (bucket) it lives in and its key within
/// that container. Keys are free-form and may contain `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectLocator {
    container: String,
    key: String,
}

impl ObjectLocator {
    /// Locate `key` inside `container`
    pub fn new(container: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            key: key.into(),
        }
    }

    /// The container (bucket) name
    pub fn container(&self) -> &str {
        &self.container
    }

    /// The object key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The key under which a URL for this object is cached
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::from(self)
    }
}

impl fmt::Display for ObjectLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.container, self.key)
    }
}

/// Cache key derived from an [ObjectLocator].
///
/// Formatted as `signed-url:<container length>:<container>:<key>`. The length
/// prefix keeps locators that differ only in where the container ends from
/// sharing an entry, since both container names and keys may contain `:`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    const PREFIX: &'static str = "signed-url";

    /// The key as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&ObjectLocator> for CacheKey {
    fn from(locator: &ObjectLocator) -> Self {
        Self(format!(
            "{}:{}:{}:{}",
            Self::PREFIX,
            locator.container.len(),
            locator.container,
            locator.key
        ))
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
