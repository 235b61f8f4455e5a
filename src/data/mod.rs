//! Core data models for the Muguet YouTube integration
//!
//! Flat domain records normalized from the provider's nested response
//! shapes. Every field the API may omit carries a zero-equivalent default so
//! callers never branch on missing data.

pub mod analytics;
pub mod upload;
pub mod youtube;

pub use upload::{UploadSession, VideoUploadMetadata};
pub use youtube::{YouTubeClient, YouTubeError};

use serde::{Deserialize, Serialize};

/// A single thumbnail rendition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thumbnail {
    /// Image URL
    pub url: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// The standard thumbnail renditions YouTube returns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thumbnails {
    /// 120x90 rendition
    pub default: Thumbnail,
    /// 320x180 rendition
    pub medium: Thumbnail,
    /// 480x360 rendition
    pub high: Thumbnail,
}

/// Aggregate statistics for a channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelStatistics {
    /// Lifetime view count
    pub view_count: u64,
    /// Current subscriber count
    pub subscriber_count: u64,
    /// Number of public videos
    pub video_count: u64,
}

/// A YouTube channel, flattened from snippet/statistics/brandingSettings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Channel {
    /// Channel id (e.g., "UC...")
    pub id: String,
    /// Channel title
    pub title: String,
    /// Channel description
    pub description: String,
    /// Vanity URL handle, empty when unset
    pub custom_url: String,
    /// ISO 8601 creation timestamp
    pub published_at: String,
    /// Channel thumbnails
    pub thumbnails: Thumbnails,
    /// Aggregate statistics
    pub statistics: ChannelStatistics,
    /// Channel keywords from branding settings, empty when unset
    pub keywords: String,
}

/// Per-video statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoStatistics {
    /// View count
    pub view_count: u64,
    /// Like count
    pub like_count: u64,
    /// Comment count
    pub comment_count: u64,
}

/// Visibility of a video
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyStatus {
    Public,
    #[default]
    Private,
    Unlisted,
}

/// Processing state of an uploaded video
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    #[default]
    Processed,
    Uploaded,
    Failed,
}

/// A YouTube video, flattened from snippet/statistics/status/contentDetails
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Video {
    /// Video id
    pub id: String,
    /// Video title
    pub title: String,
    /// Video description
    pub description: String,
    /// ISO 8601 publish timestamp
    pub published_at: String,
    /// ISO 8601 duration (e.g., "PT4M13S"); "PT0S" when absent
    pub duration: String,
    /// Video thumbnails
    pub thumbnails: Thumbnails,
    /// View/like/comment counts
    pub statistics: VideoStatistics,
    /// Visibility
    pub privacy_status: PrivacyStatus,
    /// Processing state
    pub upload_status: UploadStatus,
    /// Owning channel id
    pub channel_id: String,
    /// Owning channel title
    pub channel_title: String,
    /// YouTube category id
    pub category_id: String,
    /// Video tags
    pub tags: Vec<String>,
}

/// Statistics for one video out of a batch lookup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoStats {
    /// Video id the stats belong to
    pub id: String,
    /// View count
    pub view_count: u64,
    /// Like count
    pub like_count: u64,
    /// Comment count
    pub comment_count: u64,
}

/// Aggregate analytics for a channel or video over a date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelAnalytics {
    /// Total views
    pub views: u64,
    /// Total watch time in minutes
    pub estimated_minutes_watched: u64,
    /// Average view duration, formatted `M:SS` or `H:MM:SS`
    pub average_view_duration: String,
    /// Subscribers gained over the range
    pub subscribers_gained: u64,
    /// Subscribers lost over the range
    pub subscribers_lost: u64,
    /// Likes
    pub likes: u64,
    /// Dislikes
    pub dislikes: u64,
    /// Comments
    pub comments: u64,
    /// Shares
    pub shares: u64,
    /// Estimated revenue in the channel currency
    pub estimated_revenue: f64,
    /// Cost per mille
    pub cpm: f64,
    /// Click-through rate; the reports API does not return this metric, so
    /// it is always 0
    pub ctr: f64,
    /// Thumbnail impressions
    pub impressions: u64,
    /// Clickable thumbnail impressions
    pub impressions_clickable: u64,
}

impl Default for ChannelAnalytics {
    fn default() -> Self {
        Self {
            views: 0,
            estimated_minutes_watched: 0,
            average_view_duration: "0:00".to_string(),
            subscribers_gained: 0,
            subscribers_lost: 0,
            likes: 0,
            dislikes: 0,
            comments: 0,
            shares: 0,
            estimated_revenue: 0.0,
            cpm: 0.0,
            ctr: 0.0,
            impressions: 0,
            impressions_clickable: 0,
        }
    }
}

/// Analytics for a single day within a report range
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyAnalytics {
    /// Day the row covers (YYYY-MM-DD)
    pub date: String,
    /// Views that day
    pub views: u64,
    /// Watch time in minutes
    pub estimated_minutes_watched: u64,
    /// Average view duration in seconds
    pub average_view_duration: f64,
    /// Subscribers gained
    pub subscribers_gained: u64,
    /// Subscribers lost
    pub subscribers_lost: u64,
    /// Likes
    pub likes: u64,
    /// Dislikes
    pub dislikes: u64,
    /// Comments
    pub comments: u64,
    /// Shares
    pub shares: u64,
    /// Estimated revenue
    pub estimated_revenue: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_defaults_are_zero_equivalent() {
        let channel = Channel::default();
        assert_eq!(channel.id, "");
        assert_eq!(channel.statistics.view_count, 0);
        assert_eq!(channel.statistics.subscriber_count, 0);
        assert_eq!(channel.thumbnails.high.url, "");
    }

    #[test]
    fn test_channel_serialization_roundtrip() {
        let channel = Channel {
            id: "UC123".to_string(),
            title: "Creator".to_string(),
            description: "A channel".to_string(),
            custom_url: "@creator".to_string(),
            published_at: "2020-01-15T00:00:00Z".to_string(),
            thumbnails: Thumbnails {
                high: Thumbnail {
                    url: "https://img.example/high.jpg".to_string(),
                    width: 480,
                    height: 360,
                },
                ..Thumbnails::default()
            },
            statistics: ChannelStatistics {
                view_count: 123_456,
                subscriber_count: 789,
                video_count: 42,
            },
            keywords: "music vlog".to_string(),
        };

        let json = serde_json::to_string(&channel).expect("Failed to serialize Channel");
        let deserialized: Channel =
            serde_json::from_str(&json).expect("Failed to deserialize Channel");

        assert_eq!(deserialized, channel);
    }

    #[test]
    fn test_channel_deserializes_with_missing_fields() {
        // Cached entries written by older versions may lack newer fields
        let partial = r#"{"id": "UC123", "title": "Creator"}"#;

        let channel: Channel = serde_json::from_str(partial).expect("Should tolerate omissions");
        assert_eq!(channel.id, "UC123");
        assert_eq!(channel.statistics.video_count, 0);
        assert_eq!(channel.keywords, "");
    }

    #[test]
    fn test_privacy_status_parses_lowercase() {
        let public: PrivacyStatus = serde_json::from_str("\"public\"").expect("Should parse");
        let unlisted: PrivacyStatus = serde_json::from_str("\"unlisted\"").expect("Should parse");
        assert_eq!(public, PrivacyStatus::Public);
        assert_eq!(unlisted, PrivacyStatus::Unlisted);
    }

    #[test]
    fn test_privacy_status_default_is_private() {
        assert_eq!(PrivacyStatus::default(), PrivacyStatus::Private);
    }

    #[test]
    fn test_upload_status_default_is_processed() {
        assert_eq!(UploadStatus::default(), UploadStatus::Processed);
    }

    #[test]
    fn test_video_serialization_roundtrip() {
        let video = Video {
            id: "vid1".to_string(),
            title: "First upload".to_string(),
            duration: "PT4M13S".to_string(),
            statistics: VideoStatistics {
                view_count: 1000,
                like_count: 50,
                comment_count: 7,
            },
            privacy_status: PrivacyStatus::Public,
            upload_status: UploadStatus::Processed,
            tags: vec!["tag1".to_string(), "tag2".to_string()],
            ..Video::default()
        };

        let json = serde_json::to_string(&video).expect("Failed to serialize Video");
        let deserialized: Video = serde_json::from_str(&json).expect("Failed to deserialize Video");

        assert_eq!(deserialized, video);
    }

    #[test]
    fn test_channel_analytics_default_has_formatted_duration() {
        let analytics = ChannelAnalytics::default();
        assert_eq!(analytics.views, 0);
        assert_eq!(analytics.average_view_duration, "0:00");
        assert!((analytics.estimated_revenue - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_daily_analytics_roundtrip() {
        let day = DailyAnalytics {
            date: "2024-07-15".to_string(),
            views: 120,
            estimated_minutes_watched: 350,
            average_view_duration: 175.0,
            subscribers_gained: 3,
            subscribers_lost: 1,
            likes: 12,
            dislikes: 0,
            comments: 4,
            shares: 2,
            estimated_revenue: 1.23,
        };

        let json = serde_json::to_string(&day).expect("Failed to serialize DailyAnalytics");
        let deserialized: DailyAnalytics =
            serde_json::from_str(&json).expect("Failed to deserialize DailyAnalytics");

        assert_eq!(deserialized, day);
    }
}
