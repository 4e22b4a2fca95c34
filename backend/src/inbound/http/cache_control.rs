//! `Cache-Control` policies for portal responses.

use actix_web::http::header::{CacheControl, CacheDirective};

/// Per-student JSON: browsers may keep it but must revalidate, shared
/// caches must not store it.
pub fn private_revalidate() -> CacheControl {
    CacheControl(vec![
        CacheDirective::Private,
        CacheDirective::NoCache,
        CacheDirective::MustRevalidate,
    ])
}

/// Probes and loan QR codes are never stored anywhere.
pub fn no_store() -> CacheControl {
    CacheControl(vec![CacheDirective::NoStore])
}
