//! Request handlers for the site's pages

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::Utc;
use guildgate_common::VerificationStatus;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};
use verification_flow::VerificationFlow;

use crate::content::BlogPost;
use crate::metadata::RouteMetadata;
use crate::sitemap::{build_sitemap, render_sitemap_xml};
use crate::AppState;

/// Number of posts teased on the home page
const HOME_POST_COUNT: usize = 3;

/// API Error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status == StatusCode::NOT_FOUND {
            let meta = RouteMetadata::new("Page not found | GuildGate", "This page does not exist.");
            let page = NotFoundPage {
                site_name: "GuildGate",
                meta: &meta,
                message: &self.message,
            };
            if let Ok(html) = page.render() {
                return (self.status, Html(html)).into_response();
            }
        }

        (self.status, self.message).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<askama::Error> for ApiError {
    fn from(err: askama::Error) -> Self {
        error!("Template rendering failed: {}", err);
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Internal server error".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "home.html")]
struct HomePage<'a> {
    site_name: &'a str,
    meta: &'a RouteMetadata,
    latest_posts: &'a [BlogPost],
}

#[derive(Template)]
#[template(path = "blog_index.html")]
struct BlogIndexPage<'a> {
    site_name: &'a str,
    meta: &'a RouteMetadata,
    posts: &'a [BlogPost],
}

#[derive(Template)]
#[template(path = "blog_post.html")]
struct BlogPostPage<'a> {
    site_name: &'a str,
    meta: &'a RouteMetadata,
    post: &'a BlogPost,
}

#[derive(Template)]
#[template(path = "login.html")]
struct LoginPage<'a> {
    site_name: &'a str,
    meta: &'a RouteMetadata,
    app_url: &'a str,
}

#[derive(Template)]
#[template(path = "signup.html")]
struct SignupPage<'a> {
    site_name: &'a str,
    meta: &'a RouteMetadata,
    app_url: &'a str,
}

#[derive(Template)]
#[template(path = "verify_email.html")]
struct VerifyEmailPage<'a> {
    site_name: &'a str,
    meta: &'a RouteMetadata,
    status: &'a str,
    message: &'a str,
    failed: bool,
    login_path: &'a str,
    redirect_after_secs: Option<u64>,
}

#[derive(Template)]
#[template(path = "not_found.html")]
struct NotFoundPage<'a> {
    site_name: &'a str,
    meta: &'a RouteMetadata,
    message: &'a str,
}

/// Query string of a verification link
#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    pub token: Option<String>,
}

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "guildgate-site"
    }))
}

pub async fn home_handler(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let posts = state.blog.posts();
    let page = HomePage {
        site_name: &state.metadata.site_name,
        meta: state.metadata.for_path("/"),
        latest_posts: &posts[..posts.len().min(HOME_POST_COUNT)],
    };
    Ok(Html(page.render()?))
}

pub async fn blog_index_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, ApiError> {
    let page = BlogIndexPage {
        site_name: &state.metadata.site_name,
        meta: state.metadata.for_path("/blog"),
        posts: state.blog.posts(),
    };
    Ok(Html(page.render()?))
}

pub async fn blog_post_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Html<String>, ApiError> {
    let post = state
        .blog
        .find(&slug)
        .ok_or_else(|| ApiError::not_found(format!("No blog post named {}", slug)))?;

    let meta = state.metadata.for_page(&post.title, &post.description);
    let page = BlogPostPage {
        site_name: &state.metadata.site_name,
        meta: &meta,
        post,
    };
    Ok(Html(page.render()?))
}

pub async fn login_handler(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let page = LoginPage {
        site_name: &state.metadata.site_name,
        meta: state.metadata.for_path("/login"),
        app_url: &state.api_url,
    };
    Ok(Html(page.render()?))
}

pub async fn signup_handler(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let page = SignupPage {
        site_name: &state.metadata.site_name,
        meta: state.metadata.for_path("/signup"),
        app_url: &state.api_url,
    };
    Ok(Html(page.render()?))
}

/// Run the verification flow for the link's token and render the outcome
pub async fn verify_email_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<VerifyEmailQuery>,
) -> Result<Html<String>, ApiError> {
    let mut flow = VerificationFlow::new(state.verifier.clone(), state.login_path.clone());
    let attempt = flow.activate(query.token.as_deref()).await.clone();

    let status = match attempt.status {
        VerificationStatus::Pending => "pending",
        VerificationStatus::Success => "success",
        VerificationStatus::Error => "error",
    };
    info!("Email verification page rendered with status {}", status);

    let page = VerifyEmailPage {
        site_name: &state.metadata.site_name,
        meta: state.metadata.for_path("/verify-email"),
        status,
        message: attempt.message.as_deref().unwrap_or("Verifying your email..."),
        failed: attempt.status == VerificationStatus::Error,
        login_path: flow.login_path(),
        redirect_after_secs: flow.redirect().map(|r| r.delay.as_secs()),
    };
    Ok(Html(page.render()?))
}

pub async fn sitemap_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let entries = build_sitemap(&state.site_url, state.blog.posts(), Utc::now().date_naive());
    (
        [(header::CONTENT_TYPE, "application/xml")],
        render_sitemap_xml(&entries),
    )
}

pub async fn robots_txt_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = format!(
        "User-agent: *\nAllow: /\n\nSitemap: {}/sitemap.xml\n",
        state.site_url
    );
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body)
}

pub async fn not_found_handler() -> ApiError {
    ApiError::not_found("We couldn't find the page you were looking for.")
}
