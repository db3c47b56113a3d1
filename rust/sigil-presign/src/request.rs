use chrono::{DateTime, Utc};
use url::Url;

/// Default URL validity: 1 hour.
pub const DEFAULT_EXPIRES: u64 = 3600;

/// HTTP methods a presigned URL can be issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Download an object
    Get,
    /// Upload an object
    Put,
    /// Probe a bucket or object for existence
    Head,
    /// Remove an object
    Delete,
}

impl Method {
    /// The method as it appears on the wire and in the string to sign
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Head => "HEAD",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a signer needs to know about a request.
#[derive(Debug, Clone)]
pub struct PresignRequest {
    /// The HTTP method the URL will be used with
    pub method: Method,
    /// Object (or bucket) URL, without credentials
    pub url: Url,
    /// Signing region, e.g. `us-east-1` or `auto` for R2
    pub region: String,
    /// Signing service name
    pub service: String,
    /// How long the URL stays valid, in seconds
    pub expires: u64,
    /// Signing time; `None` means now
    pub time: Option<DateTime<Utc>>,
    /// Additional `x-amz-*` headers folded into the signature
    pub headers: Vec<(String, String)>,
}

impl PresignRequest {
    /// A request for `url` with default region, service and validity
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            region: "auto".to_string(),
            service: "s3".to_string(),
            expires: DEFAULT_EXPIRES,
            time: None,
            headers: Vec::new(),
        }
    }

    /// Set the signing region
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Set how long the URL stays valid, in seconds
    pub fn with_expires(mut self, expires: u64) -> Self {
        self.expires = expires;
        self
    }

    /// Pin the signing time
    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    /// Sign an additional header that the caller will send with the request
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into().to_lowercase(), value.into()));
        self
    }

    /// The signing time, defaulting to the current time
    pub fn time(&self) -> DateTime<Utc> {
        self.time
            .unwrap_or_else(|| DateTime::<Utc>::from(sigil_common::time::now()))
    }
}

/// An authorization of the request
#[derive(Debug, Clone)]
pub struct Authorization {
    /// The presigned URL
    pub url: Url,
    /// Headers that must be included in the HTTP request
    pub headers: Vec<(String, String)>,
}
