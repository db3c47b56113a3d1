use std::time::Duration;

use serde::Deserialize;
use sigil_presign::{Credentials, DEFAULT_EXPIRES, SignatureVersion, Signer};

use crate::{
    CachePolicy, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL, DEFAULT_MIN_TTL,
    DEFAULT_SAFETY_MARGIN, StorageError,
};

/// Settings for a [SignedUrlStore](crate::SignedUrlStore) backed by an
/// S3-compatible service
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoreConfig {
    /// Service endpoint, e.g. `https://s3.us-east-1.amazonaws.com`
    pub endpoint: String,
    /// Signing region
    #[serde(default = "default_region")]
    pub region: String,
    /// How URLs (and the backend's own requests) are signed
    #[serde(default)]
    pub signature_version: SignatureVersion,
    /// Required unless `signature_version` is `unsigned`
    #[serde(default)]
    pub credentials: Option<Credentials>,
    /// URL validity used when a caller does not ask for one, in seconds
    #[serde(default = "default_expiration_secs")]
    pub default_expiration_secs: u64,
    /// URL cache tuning
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Settings for the URL cache
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached URLs
    pub capacity: usize,
    /// Lifetime of URLs whose expiry cannot be read, in seconds
    pub default_ttl_secs: u64,
    /// Subtracted from a URL's remaining validity, in seconds
    pub safety_margin_secs: u64,
    /// Shortest time a URL is cached for, in seconds
    pub min_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
            default_ttl_secs: DEFAULT_CACHE_TTL.as_secs(),
            safety_margin_secs: DEFAULT_SAFETY_MARGIN.as_secs(),
            min_ttl_secs: DEFAULT_MIN_TTL.as_secs(),
        }
    }
}

impl CacheConfig {
    /// Lifetime of URLs whose expiry cannot be read
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    /// The TTL policy these settings describe
    pub fn policy(&self) -> CachePolicy {
        CachePolicy {
            safety_margin: Duration::from_secs(self.safety_margin_secs),
            min_ttl: Duration::from_secs(self.min_ttl_secs),
        }
    }
}

fn default_region() -> String {
    "us-east-1".into()
}

fn default_expiration_secs() -> u64 {
    DEFAULT_EXPIRES
}

impl StoreConfig {
    /// Settings for `endpoint` with every other value at its default
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            region: default_region(),
            signature_version: SignatureVersion::default(),
            credentials: None,
            default_expiration_secs: default_expiration_secs(),
            cache: CacheConfig::default(),
        }
    }

    /// URL validity used when a caller does not ask for one
    pub fn default_expiration(&self) -> Duration {
        Duration::from_secs(self.default_expiration_secs)
    }

    /// The signer these settings describe. Signed versions without
    /// credentials are rejected rather than silently downgraded.
    pub fn signer(&self) -> Result<Signer, StorageError> {
        match (self.signature_version, &self.credentials) {
            (SignatureVersion::Unsigned, _) => Ok(Signer::Unsigned),
            (version, Some(credentials)) => Ok(Signer::new(version, Some(credentials.clone()))),
            (version, None) => Err(StorageError::Configuration(format!(
                "signature version {version:?} requires credentials"
            ))),
        }
    }

    /// Read settings from the process environment.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `SIGIL_ENDPOINT` | required |
    /// | `SIGIL_REGION` | `us-east-1` |
    /// | `SIGIL_SIGNATURE_VERSION` | `v4` (`unsigned`, `v2`, `v4`) |
    /// | `SIGIL_ACCESS_KEY_ID`, `SIGIL_SECRET_ACCESS_KEY` | none |
    /// | `SIGIL_SESSION_TOKEN` | none |
    /// | `SIGIL_URL_EXPIRATION` | `3600` |
    /// | `SIGIL_CACHE_CAPACITY` | `10000` |
    /// | `SIGIL_CACHE_DEFAULT_TTL` | `86400` |
    /// | `SIGIL_CACHE_SAFETY_MARGIN` | `300` |
    /// | `SIGIL_CACHE_MIN_TTL` | `60` |
    pub fn from_env() -> Result<Self, StorageError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [from_env](Self::from_env), reading variables through `lookup`
    pub fn from_lookup<F>(var: F) -> Result<Self, StorageError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| var(name).filter(|value| !value.trim().is_empty());

        let endpoint = lookup("SIGIL_ENDPOINT")
            .ok_or_else(|| StorageError::Configuration("SIGIL_ENDPOINT is not set".into()))?;
        let mut config = Self::new(endpoint);

        if let Some(region) = lookup("SIGIL_REGION") {
            config.region = region;
        }
        if let Some(version) = lookup("SIGIL_SIGNATURE_VERSION") {
            config.signature_version = version.parse().map_err(|error| {
                StorageError::Configuration(format!("SIGIL_SIGNATURE_VERSION: {error}"))
            })?;
        }

        config.credentials = match (
            lookup("SIGIL_ACCESS_KEY_ID"),
            lookup("SIGIL_SECRET_ACCESS_KEY"),
        ) {
            (Some(access_key_id), Some(secret_access_key)) => {
                let credentials = Credentials::new(access_key_id, secret_access_key);
                Some(match lookup("SIGIL_SESSION_TOKEN") {
                    Some(token) => credentials.with_session_token(token),
                    None => credentials,
                })
            }
            (None, None) => None,
            _ => {
                return Err(StorageError::Configuration(
                    "SIGIL_ACCESS_KEY_ID and SIGIL_SECRET_ACCESS_KEY must be set together".into(),
                ));
            }
        };

        if let Some(value) = lookup("SIGIL_URL_EXPIRATION") {
            config.default_expiration_secs = parse_number("SIGIL_URL_EXPIRATION", &value)?;
        }
        if let Some(value) = lookup("SIGIL_CACHE_CAPACITY") {
            config.cache.capacity = parse_number("SIGIL_CACHE_CAPACITY", &value)?;
        }
        if let Some(value) = lookup("SIGIL_CACHE_DEFAULT_TTL") {
            config.cache.default_ttl_secs = parse_number("SIGIL_CACHE_DEFAULT_TTL", &value)?;
        }
        if let Some(value) = lookup("SIGIL_CACHE_SAFETY_MARGIN") {
            config.cache.safety_margin_secs = parse_number("SIGIL_CACHE_SAFETY_MARGIN", &value)?;
        }
        if let Some(value) = lookup("SIGIL_CACHE_MIN_TTL") {
            config.cache.min_ttl_secs = parse_number("SIGIL_CACHE_MIN_TTL", &value)?;
        }

        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, StorageError> {
    value
        .trim()
        .parse()
        .map_err(|_| StorageError::Configuration(format!("{name} is not a number: {value}")))
}
