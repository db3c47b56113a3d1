#![warn(missing_docs)]

//! Presigned URL generation for S3-compatible object storage.
//!
//! A [Signer] turns a [PresignRequest] into an [Authorization]: a URL that
//! carries its own credentials in the query string, plus any headers that
//! were folded into the signature and so must accompany the request.
//!
//! ```rust
//! use sigil_presign::{Credentials, Method, PresignRequest, Signer, parse_expiration};
//! use url::Url;
//!
//! let signer = Signer::V2(Credentials::new("my-id", "top secret"));
//! let request = PresignRequest::new(
//!     Method::Get,
//!     Url::parse("https://s3.amazonaws.com/bucket/key").unwrap(),
//! );
//!
//! let authorization = signer.authorize(&request).unwrap();
//! assert!(parse_expiration(authorization.url.as_str()).is_some());
//! ```

mod encoding;

mod error;
pub use error::*;

mod credentials;
pub use credentials::*;

mod request;
pub use request::*;

mod signer;
pub use signer::*;

pub mod sigv2;
pub mod sigv4;

mod expiration;
pub use expiration::*;
