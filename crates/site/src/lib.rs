//! GuildGate marketing site
//!
//! Serves the public website for GuildGate, the platform creators use to
//! sell access to their Discord communities.
//!
//! ## Endpoints
//!
//! - `GET /` - Home page
//! - `GET /blog` - Blog listing, newest first
//! - `GET /blog/{slug}` - Single blog post
//! - `GET /login`, `GET /signup` - Account pages
//! - `GET /verify-email?token=...` - Email verification
//! - `GET /sitemap.xml` - Sitemap
//! - `GET /robots.txt` - Crawler rules
//! - `GET /health` - Health check
//!
//! Every response carries `X-Robots-Tag`; requests for the bare domain are
//! permanently redirected to `www`.

pub mod config;
pub mod content;
pub mod handlers;
pub mod metadata;
pub mod rules;
pub mod sitemap;

use anyhow::{Context, Result};
use axum::{http::HeaderValue, middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use verification_flow::{HttpVerificationClient, VerificationApi};

use config::Config;
use content::BlogIndex;
use metadata::SiteMetadata;
use rules::CanonicalHost;

/// Application state shared across handlers
pub struct AppState {
    /// Canonical origin, e.g. `https://www.guildgate.app`
    pub site_url: String,

    /// Account API base URL
    pub api_url: String,

    /// Where verification pages send the user
    pub login_path: String,

    pub metadata: SiteMetadata,

    pub blog: BlogIndex,

    /// Verification endpoint client
    pub verifier: Arc<dyn VerificationApi>,
}

impl AppState {
    /// Build the state from configuration, loading the blog manifest
    pub fn from_config(config: &Config) -> Result<Self> {
        let blog = BlogIndex::load(&config.blog_manifest).context("Failed to load blog")?;

        let verifier = HttpVerificationClient::new(config.verify_endpoint.clone(), config.verify_timeout)
            .context("Failed to build verification client")?;

        Ok(Self {
            site_url: config.site_url(),
            api_url: config.api_url.clone(),
            login_path: config.login_path.clone(),
            metadata: SiteMetadata::standard(),
            blog,
            verifier: Arc::new(verifier),
        })
    }
}

/// Host/header rules applied around every route
#[derive(Debug, Clone)]
pub struct SiteRules {
    pub canonical_host: CanonicalHost,
    pub robots_tag: HeaderValue,
}

impl SiteRules {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            canonical_host: CanonicalHost::new(config.domain.clone()),
            robots_tag: HeaderValue::from_str(&config.robots_tag).context("Invalid ROBOTS_TAG")?,
        })
    }
}

/// Create the site router
pub fn create_router(state: AppState, rules: SiteRules) -> Router {
    let state = Arc::new(state);

    Router::new()
        // Health check
        .route("/health", get(handlers::health_handler))
        // Marketing pages
        .route("/", get(handlers::home_handler))
        .route("/blog", get(handlers::blog_index_handler))
        .route("/blog/{slug}", get(handlers::blog_post_handler))
        // Account pages
        .route("/login", get(handlers::login_handler))
        .route("/signup", get(handlers::signup_handler))
        .route("/verify-email", get(handlers::verify_email_handler))
        // Crawlers
        .route("/sitemap.xml", get(handlers::sitemap_handler))
        .route("/robots.txt", get(handlers::robots_txt_handler))
        .fallback(handlers::not_found_handler)
        .with_state(state)
        // Middleware; the robots tag sits outside the redirect so it covers it too
        .layer(middleware::from_fn_with_state(
            Arc::new(rules.canonical_host),
            rules::canonicalize_host,
        ))
        .layer(rules::robots_tag_layer(rules.robots_tag))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
