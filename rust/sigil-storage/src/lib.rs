#![warn(missing_docs)]

//! Object storage that hands out presigned URLs and remembers them.
//!
//! A [SignedUrlStore] wraps an [ObjectBackend] (an S3-compatible service, or
//! an in-memory stand-in) and a [UrlCache]. Uploads and deletes go straight
//! to the backend. URL requests may be answered from the cache, where each
//! URL is kept only until shortly before the backend would reject it.
//!
//! ```
//! # async fn example() -> Result<(), sigil_storage::StorageError> {
//! use std::time::Duration;
//! use sigil_storage::{MemoryBackend, MemoryUrlCache, ObjectLocator, SignedUrlStore};
//!
//! let backend = MemoryBackend::default();
//! backend.create_bucket("media").await;
//!
//! let store = SignedUrlStore::new(backend, MemoryUrlCache::new(128)?);
//! let locator = ObjectLocator::new("media", "avatars/1.png");
//!
//! assert_eq!(store.put_object(&locator, b"png").await?, 3);
//!
//! let url = store.get_url(&locator, Duration::from_secs(600), true).await?;
//! assert!(url.is_some());
//! # Ok(())
//! # }
//! ```

mod error;
pub use error::*;

mod locator;
pub use locator::*;

mod signed_url;
pub use signed_url::*;

mod policy;
pub use policy::*;

mod cache;
pub use cache::*;

mod backend;
pub use backend::*;

mod config;
pub use config::*;

mod store;
pub use store::*;
