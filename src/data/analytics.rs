//! YouTube Analytics API reports
//!
//! The reports endpoint returns positional rows, not named fields: each row
//! is an array whose columns follow the order of the `metrics` parameter.
//! The metric lists here are fixed, so the index mapping next to each list
//! is the contract. An absent or empty `rows` field means no data for the
//! range and maps to zero-valued results, not an error.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::youtube::YouTubeClient;
use super::{ChannelAnalytics, DailyAnalytics};
use crate::data::YouTubeError;

/// Base URL for the YouTube Analytics API
const ANALYTICS_API_BASE: &str = "https://youtubeanalytics.googleapis.com/v2";

/// Metrics requested for channel-level reports, in column order:
/// views, estimatedMinutesWatched, averageViewDuration, subscribersGained,
/// subscribersLost, likes, dislikes, comments, shares, estimatedRevenue,
/// cpm, impressions, impressionsClickable
const CHANNEL_METRICS: &str = "views,estimatedMinutesWatched,averageViewDuration,\
subscribersGained,subscribersLost,likes,dislikes,comments,shares,\
estimatedRevenue,cpm,impressions,impressionsClickable";

/// Metrics for day-dimensioned reports; the `day` dimension prepends a date
/// column, so metric columns start at index 1
const DAILY_METRICS: &str = "views,estimatedMinutesWatched,averageViewDuration,\
subscribersGained,subscribersLost,likes,dislikes,comments,shares,estimatedRevenue";

/// Metrics for per-video reports; subscriber and impression metrics are not
/// available at video scope
const VIDEO_METRICS: &str =
    "views,estimatedMinutesWatched,averageViewDuration,likes,dislikes,comments,shares,\
estimatedRevenue";

/// Raw reports response; only the rows matter
#[derive(Debug, Deserialize)]
struct ReportResponse {
    #[serde(default)]
    rows: Option<Vec<Vec<Value>>>,
}

impl YouTubeClient {
    /// Fetches aggregate channel analytics for a date range (never cached)
    ///
    /// # Arguments
    /// * `channel_id` - Channel the report covers
    /// * `start_date` / `end_date` - Inclusive range, `YYYY-MM-DD`
    pub async fn fetch_channel_analytics(
        &self,
        channel_id: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<ChannelAnalytics, YouTubeError> {
        let params = [
            ("ids", format!("channel=={}", channel_id)),
            ("startDate", start_date.to_string()),
            ("endDate", end_date.to_string()),
            ("metrics", CHANNEL_METRICS.to_string()),
        ];

        let response: ReportResponse = self
            .request(&format!("{}/reports", ANALYTICS_API_BASE), &params)
            .await?;

        let rows = response.rows.unwrap_or_default();
        let Some(row) = rows.first() else {
            debug!(channel_id, "no analytics rows for range; returning zeros");
            return Ok(ChannelAnalytics::default());
        };

        Ok(map_channel_row(row))
    }

    /// Fetches per-day analytics for a date range (never cached)
    ///
    /// One [`DailyAnalytics`] per returned row; days the provider omits have
    /// no entry.
    pub async fn fetch_daily_analytics(
        &self,
        channel_id: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<DailyAnalytics>, YouTubeError> {
        let params = [
            ("ids", format!("channel=={}", channel_id)),
            ("startDate", start_date.to_string()),
            ("endDate", end_date.to_string()),
            ("dimensions", "day".to_string()),
            ("metrics", DAILY_METRICS.to_string()),
        ];

        let response: ReportResponse = self
            .request(&format!("{}/reports", ANALYTICS_API_BASE), &params)
            .await?;

        let rows = response.rows.unwrap_or_default();
        Ok(rows.iter().map(|row| map_daily_row(row)).collect())
    }

    /// Fetches aggregate analytics for a single video (never cached)
    ///
    /// Video-scoped reports expose fewer metrics than channel reports; the
    /// unavailable ones come back as zero.
    pub async fn fetch_video_analytics(
        &self,
        video_id: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<ChannelAnalytics, YouTubeError> {
        let params = [
            ("ids", format!("video=={}", video_id)),
            ("startDate", start_date.to_string()),
            ("endDate", end_date.to_string()),
            ("metrics", VIDEO_METRICS.to_string()),
        ];

        let response: ReportResponse = self
            .request(&format!("{}/reports", ANALYTICS_API_BASE), &params)
            .await?;

        let rows = response.rows.unwrap_or_default();
        let Some(row) = rows.first() else {
            debug!(video_id, "no analytics rows for range; returning zeros");
            return Ok(ChannelAnalytics::default());
        };

        Ok(map_video_row(row))
    }
}

/// Maps a channel report row by the CHANNEL_METRICS column order
fn map_channel_row(row: &[Value]) -> ChannelAnalytics {
    ChannelAnalytics {
        views: cell_u64(row, 0),
        estimated_minutes_watched: cell_u64(row, 1),
        average_view_duration: format_duration(cell_f64(row, 2)),
        subscribers_gained: cell_u64(row, 3),
        subscribers_lost: cell_u64(row, 4),
        likes: cell_u64(row, 5),
        dislikes: cell_u64(row, 6),
        comments: cell_u64(row, 7),
        shares: cell_u64(row, 8),
        estimated_revenue: cell_f64(row, 9),
        cpm: cell_f64(row, 10),
        // The reports API has no CTR metric
        ctr: 0.0,
        impressions: cell_u64(row, 11),
        impressions_clickable: cell_u64(row, 12),
    }
}

/// Maps a day-dimensioned row: column 0 is the date, metrics follow
fn map_daily_row(row: &[Value]) -> DailyAnalytics {
    DailyAnalytics {
        date: row
            .first()
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        views: cell_u64(row, 1),
        estimated_minutes_watched: cell_u64(row, 2),
        average_view_duration: cell_f64(row, 3),
        subscribers_gained: cell_u64(row, 4),
        subscribers_lost: cell_u64(row, 5),
        likes: cell_u64(row, 6),
        dislikes: cell_u64(row, 7),
        comments: cell_u64(row, 8),
        shares: cell_u64(row, 9),
        estimated_revenue: cell_f64(row, 10),
    }
}

/// Maps a video report row by the VIDEO_METRICS column order; metrics the
/// video scope does not support stay zero
fn map_video_row(row: &[Value]) -> ChannelAnalytics {
    ChannelAnalytics {
        views: cell_u64(row, 0),
        estimated_minutes_watched: cell_u64(row, 1),
        average_view_duration: format_duration(cell_f64(row, 2)),
        likes: cell_u64(row, 3),
        dislikes: cell_u64(row, 4),
        comments: cell_u64(row, 5),
        shares: cell_u64(row, 6),
        estimated_revenue: cell_f64(row, 7),
        ..ChannelAnalytics::default()
    }
}

/// Reads a numeric cell as u64; missing or non-numeric cells are 0
fn cell_u64(row: &[Value], index: usize) -> u64 {
    cell_f64(row, index) as u64
}

/// Reads a numeric cell as f64; missing or non-numeric cells are 0.0
fn cell_f64(row: &[Value], index: usize) -> f64 {
    row.get(index).and_then(Value::as_f64).unwrap_or(0.0)
}

/// Formats a duration in seconds as `M:SS`, or `H:MM:SS` above an hour
pub fn format_duration(seconds: f64) -> String {
    let total = seconds as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows_from(json: &str) -> Vec<Vec<Value>> {
        let response: ReportResponse =
            serde_json::from_str(json).expect("Failed to parse report response");
        response.rows.expect("Report should have rows")
    }

    #[test]
    fn test_channel_row_maps_all_columns() {
        let body = r#"{
            "kind": "youtubeAnalytics#resultTable",
            "rows": [[15000, 42000, 185.4, 320, 45, 1200, 30, 210, 88, 152.75, 4.2, 500000, 480000]]
        }"#;

        let rows = rows_from(body);
        let analytics = map_channel_row(&rows[0]);

        assert_eq!(analytics.views, 15_000);
        assert_eq!(analytics.estimated_minutes_watched, 42_000);
        assert_eq!(analytics.average_view_duration, "3:05");
        assert_eq!(analytics.subscribers_gained, 320);
        assert_eq!(analytics.subscribers_lost, 45);
        assert_eq!(analytics.likes, 1200);
        assert_eq!(analytics.dislikes, 30);
        assert_eq!(analytics.comments, 210);
        assert_eq!(analytics.shares, 88);
        assert!((analytics.estimated_revenue - 152.75).abs() < f64::EPSILON);
        assert!((analytics.cpm - 4.2).abs() < f64::EPSILON);
        assert!((analytics.ctr - 0.0).abs() < f64::EPSILON);
        assert_eq!(analytics.impressions, 500_000);
        assert_eq!(analytics.impressions_clickable, 480_000);
    }

    #[test]
    fn test_channel_row_short_row_defaults_trailing_columns() {
        let rows = rows_from(r#"{"rows": [[100, 250]]}"#);
        let analytics = map_channel_row(&rows[0]);

        assert_eq!(analytics.views, 100);
        assert_eq!(analytics.estimated_minutes_watched, 250);
        assert_eq!(analytics.average_view_duration, "0:00");
        assert_eq!(analytics.subscribers_gained, 0);
        assert_eq!(analytics.impressions, 0);
    }

    #[test]
    fn test_daily_rows_map_date_then_metrics() {
        let body = r#"{
            "rows": [
                ["2024-07-01", 120, 350, 175.0, 3, 1, 12, 0, 4, 2, 1.23],
                ["2024-07-02", 95, 210, 132.6, 1, 0, 8, 1, 2, 0, 0.87]
            ]
        }"#;

        let rows = rows_from(body);
        let daily: Vec<DailyAnalytics> = rows.iter().map(|row| map_daily_row(row)).collect();

        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].date, "2024-07-01");
        assert_eq!(daily[0].views, 120);
        assert_eq!(daily[0].estimated_minutes_watched, 350);
        assert!((daily[0].average_view_duration - 175.0).abs() < f64::EPSILON);
        assert_eq!(daily[1].date, "2024-07-02");
        assert_eq!(daily[1].subscribers_gained, 1);
        assert!((daily[1].estimated_revenue - 0.87).abs() < f64::EPSILON);
    }

    #[test]
    fn test_video_row_leaves_unsupported_metrics_zero() {
        let rows = rows_from(r#"{"rows": [[2400, 5100, 92.0, 310, 5, 42, 17, 12.5]]}"#);
        let analytics = map_video_row(&rows[0]);

        assert_eq!(analytics.views, 2400);
        assert_eq!(analytics.average_view_duration, "1:32");
        assert_eq!(analytics.likes, 310);
        assert_eq!(analytics.shares, 17);
        assert!((analytics.estimated_revenue - 12.5).abs() < f64::EPSILON);
        // Not available at video scope
        assert_eq!(analytics.subscribers_gained, 0);
        assert_eq!(analytics.subscribers_lost, 0);
        assert!((analytics.cpm - 0.0).abs() < f64::EPSILON);
        assert_eq!(analytics.impressions, 0);
    }

    #[test]
    fn test_missing_rows_field_means_empty() {
        let response: ReportResponse =
            serde_json::from_str(r#"{"kind": "youtubeAnalytics#resultTable"}"#)
                .expect("Should parse without rows");
        assert!(response.rows.is_none());
    }

    #[test]
    fn test_format_duration_under_an_hour() {
        assert_eq!(format_duration(0.0), "0:00");
        assert_eq!(format_duration(9.0), "0:09");
        assert_eq!(format_duration(65.0), "1:05");
        assert_eq!(format_duration(185.4), "3:05");
        assert_eq!(format_duration(599.0), "9:59");
    }

    #[test]
    fn test_format_duration_with_hours() {
        assert_eq!(format_duration(3600.0), "1:00:00");
        assert_eq!(format_duration(3661.0), "1:01:01");
        assert_eq!(format_duration(7325.0), "2:02:05");
    }

    #[test]
    fn test_metric_lists_match_row_mapping_widths() {
        assert_eq!(CHANNEL_METRICS.split(',').count(), 13);
        assert_eq!(DAILY_METRICS.split(',').count(), 10);
        assert_eq!(VIDEO_METRICS.split(',').count(), 8);
    }
}
