//! AWS S3 Signature Version 4 query-string authentication.
//!
//! Produces presigned URLs for AWS S3, Cloudflare R2 and other services that
//! speak [SigV4 query string authentication]. The URL's validity is expressed
//! relative to `X-Amz-Date` via `X-Amz-Expires`.
//!
//! [SigV4 query string authentication]: https://docs.aws.amazon.com/AmazonS3/latest/API/sigv4-query-string-auth.html

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::{
    Authorization, Credentials, PresignError, PresignRequest,
    encoding::{canonical_path, hex_encode, host_header, percent_encode},
};

/// Signing algorithm identifier
pub const ALGORITHM_IDENTIFIER: &str = "AWS4-HMAC-SHA256";
/// Payload hash used for presigned requests
pub const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";
/// Query parameter carrying the signing time
pub const AMZ_DATE_QUERY_PARAM: &str = "X-Amz-Date";
/// Query parameter carrying the validity in seconds
pub const EXPIRES_QUERY_PARAM: &str = "X-Amz-Expires";
/// Query parameter carrying the signature
pub const SIGNATURE_QUERY_PARAM: &str = "X-Amz-Signature";
/// Format of `X-Amz-Date`
pub const AMZ_DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";
/// Longest validity SigV4 allows: 7 days
pub const MAX_EXPIRES: u64 = 604_800;

const KEY_TYPE_IDENTIFIER: &str = "aws4_request";

/// Presign `request` with SigV4 query authentication.
pub fn authorize(
    credentials: &Credentials,
    request: &PresignRequest,
) -> Result<Authorization, PresignError> {
    if request.expires > MAX_EXPIRES {
        return Err(PresignError::ExpirationTooLong {
            requested: request.expires,
            maximum: MAX_EXPIRES,
        });
    }

    let timestamp = request.time().format(AMZ_DATE_FORMAT).to_string();
    let date = &timestamp[0..8];

    let key = SigningKey::derive(
        &credentials.secret_access_key,
        date,
        &request.region,
        &request.service,
    );
    let scope = format!(
        "{}/{}/{}/{}",
        date, request.region, request.service, KEY_TYPE_IDENTIFIER
    );

    let host = host_header(&request.url)
        .ok_or_else(|| PresignError::InvalidEndpoint("URL missing host".into()))?;

    let mut headers = vec![("host".to_string(), host)];
    headers.extend(request.headers.iter().cloned());
    headers.sort_by(|a, b| a.0.cmp(&b.0));

    let signed_headers = headers
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(";");

    let mut query_params: Vec<(String, String)> = vec![
        ("X-Amz-Algorithm".into(), ALGORITHM_IDENTIFIER.into()),
        ("X-Amz-Content-Sha256".into(), UNSIGNED_PAYLOAD.into()),
        (
            "X-Amz-Credential".into(),
            format!("{}/{}", credentials.access_key_id, scope),
        ),
        (AMZ_DATE_QUERY_PARAM.into(), timestamp.clone()),
        (EXPIRES_QUERY_PARAM.into(), request.expires.to_string()),
    ];

    if let Some(token) = &credentials.session_token {
        query_params.push(("X-Amz-Security-Token".into(), token.clone()));
    }

    query_params.push(("X-Amz-SignedHeaders".into(), signed_headers.clone()));

    // Existing query parameters are part of the canonical request too
    for (name, value) in request.url.query_pairs() {
        query_params.push((name.into_owned(), value.into_owned()));
    }

    query_params.sort_by(|a, b| a.0.cmp(&b.0));

    let canonical_query = query_params
        .iter()
        .map(|(name, value)| format!("{}={}", percent_encode(name), percent_encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    let canonical_headers = headers
        .iter()
        .map(|(name, value)| format!("{}:{}", name, value.trim()))
        .collect::<Vec<_>>()
        .join("\n");

    let canonical_request = format!(
        "{}\n{}\n{}\n{}\n\n{}\n{}",
        request.method.as_str(),
        canonical_path(request.url.path()),
        canonical_query,
        canonical_headers,
        signed_headers,
        UNSIGNED_PAYLOAD
    );

    let digest = Sha256::digest(canonical_request.as_bytes());
    let payload = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM_IDENTIFIER,
        timestamp,
        scope,
        hex_encode(&digest)
    );

    let signature = hex_encode(&key.sign(payload.as_bytes()));

    let mut url = request.url.clone();
    url.set_query(None);
    {
        let mut query = url.query_pairs_mut();
        for (name, value) in &query_params {
            query.append_pair(name, value);
        }
        query.append_pair(SIGNATURE_QUERY_PARAM, &signature);
    }

    Ok(Authorization { url, headers })
}

/// AWS SigV4 signing key derived through an HMAC chain:
/// `HMAC(HMAC(HMAC(HMAC("AWS4" + secret, date), region), service), "aws4_request")`
struct SigningKey(Vec<u8>);

impl SigningKey {
    fn derive(secret: &str, date: &str, region: &str, service: &str) -> Self {
        let secret = format!("AWS4{}", secret);
        let k_date = hmac_sha256(secret.as_bytes(), date.as_bytes());
        let k_region = hmac_sha256(&k_date, region.as_bytes());
        let k_service = hmac_sha256(&k_region, service.as_bytes());
        Self(hmac_sha256(&k_service, KEY_TYPE_IDENTIFIER.as_bytes()))
    }

    fn sign(&self, data: &[u8]) -> Vec<u8> {
        hmac_sha256(&self.0, data)
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key).expect("HMAC accepts keys of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}
