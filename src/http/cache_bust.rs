use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use reqwest::header::{CACHE_CONTROL, EXPIRES, HeaderMap, HeaderValue, IF_MODIFIED_SINCE, PRAGMA};
use url::Url;

const RANDOM_MIN: u32 = 10_000;
const RANDOM_MAX: u32 = 99_999;

/// Appends `_cb` (epoch millis), `_rnd` (5 digits) and `_uid` (8 hex chars),
/// keeping any existing query.
#[must_use]
pub fn cache_busted_url<R: Rng + ?Sized>(url: &Url, rng: &mut R) -> Url {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_millis());
    let random = rng.gen_range(RANDOM_MIN..=RANDOM_MAX);
    let uid: u32 = rng.r#gen();

    let mut busted = url.clone();
    busted
        .query_pairs_mut()
        .append_pair("_cb", &now_ms.to_string())
        .append_pair("_rnd", &random.to_string())
        .append_pair("_uid", &format!("{:08x}", uid));
    busted
}

/// Headers asking every intermediary to skip its cache. No `If-None-Match`:
/// a 304 would count as a failed request.
#[must_use]
pub fn no_cache_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate, max-age=0"),
    );
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(EXPIRES, HeaderValue::from_static("0"));
    headers.insert(
        IF_MODIFIED_SINCE,
        HeaderValue::from_static("Thu, 01 Jan 1970 00:00:00 GMT"),
    );
    headers
}
