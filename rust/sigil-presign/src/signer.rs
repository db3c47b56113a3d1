use serde::Deserialize;

use crate::{Authorization, Credentials, PresignError, PresignRequest, encoding, sigv2, sigv4};

/// Which query-string authentication scheme to sign with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureVersion {
    /// No signature; for public buckets
    Unsigned,
    /// Legacy HMAC-SHA1 query authentication with an absolute `Expires`
    V2,
    /// AWS Signature Version 4
    #[default]
    V4,
}

impl std::str::FromStr for SignatureVersion {
    type Err = PresignError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "unsigned" | "none" => Ok(Self::Unsigned),
            "v2" | "2" => Ok(Self::V2),
            "v4" | "4" => Ok(Self::V4),
            _ => Err(PresignError::UnknownSignatureVersion(value.to_string())),
        }
    }
}

/// Signs requests with one of the supported schemes.
#[derive(Debug, Clone)]
pub enum Signer {
    /// Leaves URLs unsigned (public access)
    Unsigned,
    /// SigV2 query-string authentication
    V2(Credentials),
    /// SigV4 query-string authentication
    V4(Credentials),
}

impl Signer {
    /// Build the signer for `version`. Signed versions without credentials
    /// fall back to [Signer::Unsigned].
    pub fn new(version: SignatureVersion, credentials: Option<Credentials>) -> Self {
        match (version, credentials) {
            (SignatureVersion::V2, Some(credentials)) => Self::V2(credentials),
            (SignatureVersion::V4, Some(credentials)) => Self::V4(credentials),
            _ => Self::Unsigned,
        }
    }

    /// The scheme this signer uses
    pub fn version(&self) -> SignatureVersion {
        match self {
            Self::Unsigned => SignatureVersion::Unsigned,
            Self::V2(_) => SignatureVersion::V2,
            Self::V4(_) => SignatureVersion::V4,
        }
    }

    /// Authorize `request`, producing a URL that carries its credentials.
    pub fn authorize(&self, request: &PresignRequest) -> Result<Authorization, PresignError> {
        match self {
            Self::Unsigned => unsigned(request),
            Self::V2(credentials) => sigv2::authorize(credentials, request),
            Self::V4(credentials) => sigv4::authorize(credentials, request),
        }
    }
}

/// Adds the headers the request needs without signing anything.
fn unsigned(request: &PresignRequest) -> Result<Authorization, PresignError> {
    let host = encoding::host_header(&request.url)
        .ok_or_else(|| PresignError::InvalidEndpoint("URL missing host".into()))?;

    let mut headers = vec![("host".to_string(), host)];
    headers.extend(request.headers.iter().cloned());

    Ok(Authorization {
        url: request.url.clone(),
        headers,
    })
}
