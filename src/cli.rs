//! Command-line interface parsing for the Muguet YouTube tool
//!
//! This module defines the clap command tree and validates the date-range
//! arguments the analytics commands take.

use chrono::{Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use thiserror::Error;

/// Analytics reports default to the most recent 30 days when no range is
/// given
const DEFAULT_RANGE_DAYS: i64 = 30;

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// The start of a date range falls after its end
    #[error("Invalid date range: {from} is after {to}")]
    InvalidDateRange { from: NaiveDate, to: NaiveDate },
}

/// Muguet YouTube CLI - channel data, analytics, and uploads
#[derive(Parser, Debug)]
#[command(name = "muguet")]
#[command(about = "YouTube channel data, analytics, and upload sessions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the Google consent URL for linking a YouTube account
    AuthUrl {
        /// Opaque state value echoed back on the OAuth callback
        #[arg(long)]
        state: Option<String>,
    },

    /// Show channel metadata and statistics
    Channel {
        /// Channel id to fetch; defaults to the authenticated user's channel
        #[arg(long)]
        id: Option<String>,
    },

    /// List the authenticated user's most recent videos
    Videos {
        /// Maximum number of videos to list
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },

    /// Show current statistics for one or more videos
    VideoStats {
        /// Video ids to look up
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Show aggregate channel analytics for a date range
    Analytics {
        /// Start date (YYYY-MM-DD); defaults to 30 days before the end date
        #[arg(long)]
        from: Option<NaiveDate>,
        /// End date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        to: Option<NaiveDate>,
    },

    /// Show per-day channel analytics for a date range
    Daily {
        /// Start date (YYYY-MM-DD); defaults to 30 days before the end date
        #[arg(long)]
        from: Option<NaiveDate>,
        /// End date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        to: Option<NaiveDate>,
    },

    /// Show aggregate analytics for a single video
    VideoAnalytics {
        /// Video id to report on
        id: String,
        /// Start date (YYYY-MM-DD); defaults to 30 days before the end date
        #[arg(long)]
        from: Option<NaiveDate>,
        /// End date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        to: Option<NaiveDate>,
    },

    /// Open a resumable upload session for a new video
    Upload {
        /// Video title
        #[arg(long)]
        title: String,
        /// Video description
        #[arg(long, default_value = "")]
        description: String,
        /// Tags to attach, repeatable
        #[arg(long)]
        tag: Vec<String>,
        /// Make the video public instead of private
        #[arg(long)]
        public: bool,
    },

    /// Drop every cached API response
    ClearCache,
}

/// A validated inclusive date range for analytics reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// Resolves optional CLI dates into a concrete range.
    ///
    /// # Arguments
    /// * `from` - Optional start date; defaults to 30 days before `to`
    /// * `to` - Optional end date; defaults to today
    ///
    /// # Returns
    /// * `Ok(DateRange)` when the range is ordered
    /// * `Err(CliError::InvalidDateRange)` when `from` is after `to`
    pub fn resolve(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Self, CliError> {
        let to = to.unwrap_or_else(|| Utc::now().date_naive());
        let from = from.unwrap_or(to - Duration::days(DEFAULT_RANGE_DAYS));

        if from > to {
            return Err(CliError::InvalidDateRange { from, to });
        }

        Ok(Self { from, to })
    }

    /// Start date formatted for the reports API
    pub fn from_param(&self) -> String {
        self.from.format("%Y-%m-%d").to_string()
    }

    /// End date formatted for the reports API
    pub fn to_param(&self) -> String {
        self.to.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("Valid test date")
    }

    #[test]
    fn test_cli_parse_channel_default() {
        let cli = Cli::parse_from(["muguet", "channel"]);
        match cli.command {
            Command::Channel { id } => assert!(id.is_none()),
            other => panic!("Expected Channel, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_parse_channel_with_id() {
        let cli = Cli::parse_from(["muguet", "channel", "--id", "UCabc123"]);
        match cli.command {
            Command::Channel { id } => assert_eq!(id.as_deref(), Some("UCabc123")),
            other => panic!("Expected Channel, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_parse_videos_default_limit() {
        let cli = Cli::parse_from(["muguet", "videos"]);
        match cli.command {
            Command::Videos { limit } => assert_eq!(limit, 10),
            other => panic!("Expected Videos, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_parse_videos_custom_limit() {
        let cli = Cli::parse_from(["muguet", "videos", "--limit", "25"]);
        match cli.command {
            Command::Videos { limit } => assert_eq!(limit, 25),
            other => panic!("Expected Videos, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_parse_video_stats_requires_ids() {
        let result = Cli::try_parse_from(["muguet", "video-stats"]);
        assert!(result.is_err(), "video-stats without ids must fail");

        let cli = Cli::parse_from(["muguet", "video-stats", "a", "b", "c"]);
        match cli.command {
            Command::VideoStats { ids } => assert_eq!(ids, vec!["a", "b", "c"]),
            other => panic!("Expected VideoStats, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_parse_analytics_dates() {
        let cli = Cli::parse_from([
            "muguet",
            "analytics",
            "--from",
            "2024-07-01",
            "--to",
            "2024-07-31",
        ]);
        match cli.command {
            Command::Analytics { from, to } => {
                assert_eq!(from, Some(date("2024-07-01")));
                assert_eq!(to, Some(date("2024-07-31")));
            }
            other => panic!("Expected Analytics, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_parse_rejects_malformed_date() {
        let result = Cli::try_parse_from(["muguet", "analytics", "--from", "July 1st"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_upload_flags() {
        let cli = Cli::parse_from([
            "muguet", "upload", "--title", "Haul", "--tag", "beauty", "--tag", "spring",
            "--public",
        ]);
        match cli.command {
            Command::Upload {
                title,
                description,
                tag,
                public,
            } => {
                assert_eq!(title, "Haul");
                assert_eq!(description, "");
                assert_eq!(tag, vec!["beauty", "spring"]);
                assert!(public);
            }
            other => panic!("Expected Upload, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_parse_auth_url_with_state() {
        let cli = Cli::parse_from(["muguet", "auth-url", "--state", "xyz"]);
        match cli.command {
            Command::AuthUrl { state } => assert_eq!(state.as_deref(), Some("xyz")),
            other => panic!("Expected AuthUrl, got {:?}", other),
        }
    }

    #[test]
    fn test_date_range_explicit() {
        let range =
            DateRange::resolve(Some(date("2024-07-01")), Some(date("2024-07-31"))).unwrap();
        assert_eq!(range.from_param(), "2024-07-01");
        assert_eq!(range.to_param(), "2024-07-31");
    }

    #[test]
    fn test_date_range_defaults_to_thirty_days() {
        let range = DateRange::resolve(None, Some(date("2024-07-31"))).unwrap();
        assert_eq!(range.from, date("2024-07-01"));
        assert_eq!(range.to, date("2024-07-31"));
    }

    #[test]
    fn test_date_range_single_day_is_valid() {
        let range =
            DateRange::resolve(Some(date("2024-07-15")), Some(date("2024-07-15"))).unwrap();
        assert_eq!(range.from, range.to);
    }

    #[test]
    fn test_date_range_rejects_inverted_range() {
        let result = DateRange::resolve(Some(date("2024-08-01")), Some(date("2024-07-01")));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("2024-08-01"));
        assert!(err.to_string().contains("after"));
    }
}
