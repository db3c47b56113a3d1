use std::{fmt, time::SystemTime};

use sigil_presign::parse_expiration;
use url::Url;

/// A time-limited URL granting access to an object without further
/// credentials.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignedUrl(Url);

impl SignedUrl {
    /// Parse a URL string
    pub fn parse(url: &str) -> Result<Self, url::ParseError> {
        Ok(Self(Url::parse(url)?))
    }

    /// The URL as a string
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The parsed URL
    pub fn url(&self) -> &Url {
        &self.0
    }

    /// Consume into the URL string
    pub fn into_string(self) -> String {
        self.0.into()
    }

    /// The instant after which the backend rejects this URL, if the URL
    /// carries one
    pub fn expires_at(&self) -> Option<SystemTime> {
        parse_expiration(self.as_str())
    }
}

impl From<Url> for SignedUrl {
    fn from(url: Url) -> Self {
        Self(url)
    }
}

impl From<SignedUrl> for Url {
    fn from(url: SignedUrl) -> Self {
        url.0
    }
}

impl AsRef<str> for SignedUrl {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for SignedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
