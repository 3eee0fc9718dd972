//! Identity middleware.
//!
//! Reads the identity header and injects an [`IdentityContext`] into request
//! extensions. The context is built fresh per request and never stored
//! anywhere else, so concurrent requests cannot observe each other's
//! identity. Malformed header bytes and unresolved template sentinels both
//! degrade to anonymous — operations then fail with 401, never with another
//! user's identity.

use cubby_core::defaults::IDENTITY_HEADER;
use cubby_core::IdentityContext;

/// Inject the per-request [`IdentityContext`] from the identity header.
pub async fn identity_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let raw = req
        .headers()
        .get(IDENTITY_HEADER)
        .and_then(|v| match v.to_str() {
            Ok(s) => Some(s),
            Err(_) => {
                tracing::warn!("identity header contains non-ASCII bytes, treating as anonymous");
                None
            }
        });

    let ctx = IdentityContext::from_header_value(raw);
    if let Some(user) = ctx.current() {
        tracing::debug!(owner = %user, "request identity resolved");
    }

    req.extensions_mut().insert(ctx);
    next.run(req).await
}
