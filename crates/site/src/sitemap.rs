//! Sitemap generation
//!
//! The sitemap is a pure function of the blog listing: four static pages
//! plus one entry per post.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::{self, Write};

use crate::content::BlogPost;

/// Sitemap protocol change-frequency hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl fmt::Display for ChangeFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeFrequency::Always => "always",
            ChangeFrequency::Hourly => "hourly",
            ChangeFrequency::Daily => "daily",
            ChangeFrequency::Weekly => "weekly",
            ChangeFrequency::Monthly => "monthly",
            ChangeFrequency::Yearly => "yearly",
            ChangeFrequency::Never => "never",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SitemapEntry {
    pub url: String,
    pub last_modified: NaiveDate,
    pub change_frequency: ChangeFrequency,
    pub priority: f32,
}

impl SitemapEntry {
    fn new(url: String, last_modified: NaiveDate, change_frequency: ChangeFrequency, priority: f32) -> Self {
        Self {
            url,
            last_modified,
            change_frequency,
            priority,
        }
    }
}

/// Build the sitemap entries for `base_url` (no trailing slash).
///
/// Order: home, blog index, each post, login, signup.
pub fn build_sitemap(base_url: &str, posts: &[BlogPost], generated_on: NaiveDate) -> Vec<SitemapEntry> {
    let base_url = base_url.trim_end_matches('/');
    let mut entries = Vec::with_capacity(posts.len() + 4);

    entries.push(SitemapEntry::new(
        base_url.to_string(),
        generated_on,
        ChangeFrequency::Weekly,
        1.0,
    ));
    entries.push(SitemapEntry::new(
        format!("{}/blog", base_url),
        generated_on,
        ChangeFrequency::Daily,
        0.9,
    ));

    entries.extend(posts.iter().map(|post| {
        SitemapEntry::new(
            format!("{}/blog/{}", base_url, post.slug),
            post.last_modified(),
            ChangeFrequency::Monthly,
            0.8,
        )
    }));

    entries.push(SitemapEntry::new(
        format!("{}/login", base_url),
        generated_on,
        ChangeFrequency::Monthly,
        0.5,
    ));
    entries.push(SitemapEntry::new(
        format!("{}/signup", base_url),
        generated_on,
        ChangeFrequency::Monthly,
        0.6,
    ));

    entries
}

/// Render entries as a sitemaps.org `urlset` document
pub fn render_sitemap_xml(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );

    for entry in entries {
        // Writing into a String cannot fail.
        let _ = write!(
            xml,
            "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    \
             <changefreq>{}</changefreq>\n    <priority>{:.1}</priority>\n  </url>\n",
            escape_xml(&entry.url),
            entry.last_modified.format("%Y-%m-%d"),
            entry.change_frequency,
            entry.priority,
        );
    }

    xml.push_str("</urlset>\n");
    xml
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
