//! Configuration management for the GuildGate site
//!
//! Loads configuration from environment variables with sensible defaults.

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Bare domain; requests for it are redirected to `www.<domain>`
    pub domain: String,

    /// Base URL of the account API (login/signup forms post here)
    pub api_url: String,

    /// Email verification endpoint
    pub verify_endpoint: String,

    /// Timeout for the verification request
    pub verify_timeout: Duration,

    /// Where verified (or stuck) users are sent
    pub login_path: String,

    /// JSON manifest listing blog posts
    pub blog_manifest: PathBuf,

    /// Value of the `X-Robots-Tag` header on every response
    pub robots_tag: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (for local development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let domain = var("SITE_DOMAIN", "guildgate.app").to_lowercase();
        let api_url = lookup("API_URL")
            .unwrap_or_else(|| format!("https://api.{}", domain))
            .trim_end_matches('/')
            .to_string();

        let config = Config {
            host: var("SITE_HOST", "0.0.0.0"),

            port: var("SITE_PORT", "3000").parse().context("Invalid SITE_PORT")?,

            verify_endpoint: lookup("VERIFY_ENDPOINT")
                .unwrap_or_else(|| format!("{}/auth/verify-email", api_url)),

            verify_timeout: Duration::from_secs(
                var("VERIFY_TIMEOUT_SECS", "10")
                    .parse()
                    .context("Invalid VERIFY_TIMEOUT_SECS")?,
            ),

            login_path: var("LOGIN_PATH", "/login"),

            blog_manifest: var("BLOG_MANIFEST", "./content/blog/posts.json").into(),

            robots_tag: var("ROBOTS_TAG", "index, follow"),

            api_url,
            domain,
        };

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("SITE_PORT must be greater than 0");
        }

        if self.domain.is_empty() || self.domain.starts_with("www.") {
            anyhow::bail!("SITE_DOMAIN must be the bare domain, without www.");
        }

        validate_http_url("API_URL", &self.api_url)?;
        validate_http_url("VERIFY_ENDPOINT", &self.verify_endpoint)?;

        if self.verify_timeout.is_zero() {
            anyhow::bail!("VERIFY_TIMEOUT_SECS must be greater than 0");
        }

        if !self.login_path.starts_with('/') {
            anyhow::bail!("LOGIN_PATH must start with '/'");
        }

        HeaderValue::from_str(&self.robots_tag).context("Invalid ROBOTS_TAG")?;

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Canonical public origin, e.g. `https://www.guildgate.app`
    pub fn site_url(&self) -> String {
        format!("https://www.{}", self.domain)
    }
}

fn validate_http_url(key: &str, value: &str) -> Result<()> {
    let url = reqwest::Url::parse(value).with_context(|| format!("Invalid {}: {}", key, value))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("{} must be an http(s) URL", key);
    }
    Ok(())
}
