//! Per-route page metadata (title and description)

use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteMetadata {
    pub title: String,
    pub description: String,
}

impl RouteMetadata {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Route -> metadata mapping, built once at startup
#[derive(Debug, Clone)]
pub struct SiteMetadata {
    pub site_name: String,
    default: RouteMetadata,
    routes: HashMap<&'static str, RouteMetadata>,
}

impl SiteMetadata {
    pub fn standard() -> Self {
        let site_name = "GuildGate".to_string();
        let default = RouteMetadata::new(
            "GuildGate - Monetize your Discord community",
            "Sell memberships, gate roles behind subscriptions, and get paid for the community you built on Discord.",
        );

        let routes = HashMap::from([
            ("/", default.clone()),
            (
                "/blog",
                RouteMetadata::new(
                    "Blog | GuildGate",
                    "Guides, product updates and stories from creators growing paid Discord communities.",
                ),
            ),
            (
                "/login",
                RouteMetadata::new("Log in | GuildGate", "Log in to manage your servers, tiers and payouts."),
            ),
            (
                "/signup",
                RouteMetadata::new(
                    "Sign up | GuildGate",
                    "Create a GuildGate account and start charging for access to your Discord server.",
                ),
            ),
            (
                "/verify-email",
                RouteMetadata::new("Verify your email | GuildGate", "Confirm your email address to finish signing up."),
            ),
        ]);

        Self {
            site_name,
            default,
            routes,
        }
    }

    /// Metadata for `path`, falling back to the site default
    pub fn for_path(&self, path: &str) -> &RouteMetadata {
        self.routes.get(path).unwrap_or(&self.default)
    }

    /// Metadata for a page not known ahead of time, such as a blog post
    pub fn for_page(&self, title: &str, description: &str) -> RouteMetadata {
        RouteMetadata::new(format!("{} | {}", title, self.site_name), description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_route() {
        let metadata = SiteMetadata::standard();
        assert_eq!(metadata.for_path("/blog").title, "Blog | GuildGate");
    }

    #[test]
    fn test_unknown_route_uses_default() {
        let metadata = SiteMetadata::standard();
        assert_eq!(metadata.for_path("/nowhere"), metadata.for_path("/"));
    }

    #[test]
    fn test_page_title_carries_site_name() {
        let metadata = SiteMetadata::standard();
        let page = metadata.for_page("Launch day", "We launched");
        assert_eq!(page.title, "Launch day | GuildGate");
        assert_eq!(page.description, "We launched");
    }
}
