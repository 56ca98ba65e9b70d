//! GuildGate Site
//!
//! Serves the marketing site, writes the sitemap, or runs a verification
//! link from the command line.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use guildgate_common::VerificationStatus;
use guildgate_site::{
    config::Config,
    content::BlogIndex,
    create_router,
    sitemap::{build_sitemap, render_sitemap_xml},
    AppState, SiteRules,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use verification_flow::{ChannelNavigator, HttpVerificationClient, VerificationFlow};

#[derive(Parser)]
#[command(name = "guildgate-site", about = "GuildGate marketing site")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the web server (default)
    Serve,

    /// Print the sitemap, or write it to a file
    Sitemap {
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Follow an email verification link
    Verify {
        #[arg(long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "guildgate_site=debug,verification_flow=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Sitemap { out } => write_sitemap(&config, out),
        Command::Verify { token } => verify(&config, token).await,
    }
}

async fn serve(config: Config) -> Result<()> {
    info!("Starting GuildGate site");
    info!("Canonical URL: {}", config.site_url());
    info!("Verification endpoint: {}", config.verify_endpoint);

    let state = AppState::from_config(&config)?;
    let rules = SiteRules::from_config(&config)?;
    let app = create_router(state, rules);

    let listener = TcpListener::bind(&config.address())
        .await
        .with_context(|| format!("Failed to bind to {}", config.address()))?;

    info!("GuildGate site listening on {}", config.address());
    info!("Health check: http://{}/health", config.address());

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Received shutdown signal");
        })
        .await
        .context("Server error")?;

    Ok(())
}

fn write_sitemap(config: &Config, out: Option<PathBuf>) -> Result<()> {
    let blog = BlogIndex::load(&config.blog_manifest)?;
    let entries = build_sitemap(&config.site_url(), blog.posts(), Utc::now().date_naive());
    let xml = render_sitemap_xml(&entries);

    match out {
        Some(path) => {
            std::fs::write(&path, xml)
                .with_context(|| format!("Failed to write sitemap: {}", path.display()))?;
            info!("Wrote {} sitemap entries to {}", entries.len(), path.display());
        }
        None => print!("{}", xml),
    }

    Ok(())
}

async fn verify(config: &Config, token: Option<String>) -> Result<()> {
    let client = HttpVerificationClient::new(config.verify_endpoint.clone(), config.verify_timeout)
        .context("Failed to build verification client")?;
    let (navigator, mut navigations) = ChannelNavigator::new();

    let mut flow = VerificationFlow::new(Arc::new(client), config.login_path.clone())
        .with_navigator(Arc::new(navigator));

    println!("Verifying your email...");
    let attempt = flow.activate(token.as_deref()).await.clone();
    println!("{}", attempt.message.as_deref().unwrap_or_default());

    match attempt.status {
        VerificationStatus::Success => {
            if let Some(target) = navigations.recv().await {
                println!("-> {}{}", config.site_url(), target);
            }
        }
        _ => println!("Go to login: {}{}", config.site_url(), flow.login_path()),
    }

    Ok(())
}
