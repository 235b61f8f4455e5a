//! Muguet YouTube CLI - channel data, analytics, and upload sessions
//!
//! A command-line front end over the cached YouTube client: prints channel
//! metadata, recent videos, analytics reports, and resumable upload session
//! URLs as pretty JSON.

use clap::Parser;
use serde::Serialize;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use muguet::auth::{OauthConfig, TokenSet};
use muguet::cache::CacheManager;
use muguet::cli::{Cli, Command, DateRange};
use muguet::data::{PrivacyStatus, VideoUploadMetadata, YouTubeClient};

/// Prints any serializable value as pretty JSON on stdout
fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Builds an authenticated client from environment credentials
fn client_from_env() -> Result<YouTubeClient, Box<dyn std::error::Error>> {
    let oauth = OauthConfig::from_env()?;
    let tokens = TokenSet::from_env()?;
    Ok(YouTubeClient::new(oauth, tokens))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("muguet=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::AuthUrl { state } => {
            let oauth = OauthConfig::from_env()?;
            println!("{}", oauth.authorization_url(state.as_deref()));
        }

        Command::Channel { id } => {
            let client = client_from_env()?;
            let channel = client.fetch_channel(id.as_deref()).await?;
            print_json(&channel)?;
        }

        Command::Videos { limit } => {
            let client = client_from_env()?;
            let videos = client.fetch_videos(limit).await?;
            print_json(&videos)?;
        }

        Command::VideoStats { ids } => {
            let client = client_from_env()?;
            if ids.len() == 1 {
                let stats = client.fetch_video_statistics(&ids[0]).await?;
                print_json(&stats)?;
            } else {
                let stats = client.fetch_multiple_video_statistics(&ids).await;
                if stats.is_empty() {
                    warn!("no statistics returned; treat as unavailable, not zero");
                }
                print_json(&stats)?;
            }
        }

        Command::Analytics { from, to } => {
            let range = DateRange::resolve(from, to)?;
            let client = client_from_env()?;
            // Reports are keyed by channel id, so resolve our own channel first
            let channel = client.fetch_channel(None).await?;
            let analytics = client
                .fetch_channel_analytics(&channel.id, &range.from_param(), &range.to_param())
                .await?;
            print_json(&analytics)?;
        }

        Command::Daily { from, to } => {
            let range = DateRange::resolve(from, to)?;
            let client = client_from_env()?;
            let channel = client.fetch_channel(None).await?;
            let daily = client
                .fetch_daily_analytics(&channel.id, &range.from_param(), &range.to_param())
                .await?;
            print_json(&daily)?;
        }

        Command::VideoAnalytics { id, from, to } => {
            let range = DateRange::resolve(from, to)?;
            let client = client_from_env()?;
            let analytics = client
                .fetch_video_analytics(&id, &range.from_param(), &range.to_param())
                .await?;
            print_json(&analytics)?;
        }

        Command::Upload {
            title,
            description,
            tag,
            public,
        } => {
            let client = client_from_env()?;
            let mut metadata = VideoUploadMetadata::new(title, description).with_tags(tag);
            if public {
                metadata = metadata.with_privacy(PrivacyStatus::Public);
            }
            let session = client.start_video_upload(&metadata).await?;
            print_json(&session)?;
        }

        Command::ClearCache => {
            match CacheManager::new() {
                Some(cache) => {
                    cache.clear();
                    println!("Cache cleared");
                }
                None => println!("No cache directory available; nothing to clear"),
            }
        }
    }

    Ok(())
}
