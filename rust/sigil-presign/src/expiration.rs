//! Recovering the expiry instant a backend baked into a presigned URL.
//!
//! This is the one place that knows what presigned URLs look like on the
//! wire. If a backend changes its format, this is what needs to change.

use std::sync::LazyLock;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::NaiveDateTime;
use regex::Regex;

use crate::sigv4::AMZ_DATE_FORMAT;

/// `Expires=<unix seconds>` as issued by SigV2 query authentication
static LEGACY_EXPIRES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[?&]Expires=(\d+)(?:[&#]|$)").expect("legacy expiry pattern is valid")
});

/// `X-Amz-Date=<YYYYMMDDTHHMMSSZ>` as issued by SigV4 query authentication
static AMZ_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[?&]X-Amz-Date=(\d{8}T\d{6}Z)(?:[&#]|$)").expect("amz date pattern is valid")
});

/// `X-Amz-Expires=<seconds>`, relative to `X-Amz-Date`
static AMZ_EXPIRES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[?&]X-Amz-Expires=(\d+)(?:[&#]|$)").expect("amz expires pattern is valid")
});

/// The instant after which the backend will reject `url`, if the URL says.
///
/// Understands SigV2 (`Expires`) and SigV4 (`X-Amz-Date` + `X-Amz-Expires`)
/// query authentication. Returns `None` for anything else, including unsigned
/// URLs and values that do not fit in a timestamp.
pub fn parse_expiration(url: &str) -> Option<SystemTime> {
    legacy_expiration(url).or_else(|| sigv4_expiration(url))
}

fn legacy_expiration(url: &str) -> Option<SystemTime> {
    let seconds = capture(&LEGACY_EXPIRES, url)?.parse::<u64>().ok()?;
    UNIX_EPOCH.checked_add(Duration::from_secs(seconds))
}

fn sigv4_expiration(url: &str) -> Option<SystemTime> {
    let signed_at = NaiveDateTime::parse_from_str(capture(&AMZ_DATE, url)?, AMZ_DATE_FORMAT)
        .ok()?
        .and_utc()
        .timestamp();
    let validity = capture(&AMZ_EXPIRES, url)?.parse::<u64>().ok()?;

    UNIX_EPOCH
        .checked_add(Duration::from_secs(u64::try_from(signed_at).ok()?))?
        .checked_add(Duration::from_secs(validity))
}

fn capture<'a>(pattern: &Regex, url: &'a str) -> Option<&'a str> {
    pattern
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map(|group| group.as_str())
}
