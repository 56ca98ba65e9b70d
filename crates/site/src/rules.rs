//! Host canonicalization and response header rules

use axum::{
    extract::{Request, State},
    http::{header, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::debug;

pub static X_ROBOTS_TAG: HeaderName = HeaderName::from_static("x-robots-tag");

/// Requests for the bare domain get sent to `www.<domain>`.
#[derive(Debug, Clone)]
pub struct CanonicalHost {
    bare_domain: String,
}

impl CanonicalHost {
    pub fn new(bare_domain: impl Into<String>) -> Self {
        Self {
            bare_domain: bare_domain.into().to_lowercase(),
        }
    }

    /// Redirect target for a request to `host`, if it needs one
    pub fn redirect_target(&self, host: &str, path_and_query: &str) -> Option<String> {
        let hostname = host.split(':').next().unwrap_or(host).trim_end_matches('.');
        if hostname.eq_ignore_ascii_case(&self.bare_domain) {
            Some(format!("https://www.{}{}", self.bare_domain, path_and_query))
        } else {
            None
        }
    }
}

/// Middleware issuing the permanent bare-domain redirect
pub async fn canonicalize_host(
    State(rule): State<Arc<CanonicalHost>>,
    request: Request,
    next: Next,
) -> Response {
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| request.uri().host());

    if let Some(host) = host {
        let path_and_query = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");

        if let Some(target) = rule.redirect_target(host, path_and_query) {
            debug!("Redirecting {} to {}", host, target);
            return Redirect::permanent(&target).into_response();
        }
    }

    next.run(request).await
}

/// Layer stamping `X-Robots-Tag` on every response
pub fn robots_tag_layer(value: HeaderValue) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(X_ROBOTS_TAG.clone(), value)
}
