//! YouTube Data API client with token refresh and response caching
//!
//! Wraps authenticated GETs against the Data API: a 401 triggers exactly one
//! token refresh and one retry, quota exhaustion is surfaced as its own error
//! so callers can back off, and per-resource TTL caching keeps quota usage
//! down for data that changes slowly.

use chrono::Duration;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::future::Future;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, warn};

use super::{
    Channel, ChannelStatistics, PrivacyStatus, Thumbnails, UploadStatus, Video, VideoStatistics,
    VideoStats,
};
use crate::auth::{self, OauthConfig, TokenSet};
use crate::cache::CacheManager;

/// Base URL for the YouTube Data API
const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Channel metadata changes rarely; cache for an hour
const CHANNEL_CACHE_TTL_SECS: i64 = 60 * 60;

/// Recent video lists change more often; cache for 15 minutes
const VIDEOS_CACHE_TTL_SECS: i64 = 15 * 60;

/// The videos endpoint accepts at most 50 ids per call
const MAX_IDS_PER_BATCH: usize = 50;

/// Errors that can occur when talking to the YouTube APIs
#[derive(Debug, Error)]
pub enum YouTubeError {
    /// The access token is no longer valid and could not be refreshed;
    /// the account must be re-linked
    #[error("authentication expired; re-link the YouTube account")]
    AuthExpired,

    /// The daily API quota is exhausted; retry later rather than failing over
    #[error("YouTube API quota exceeded; retry later")]
    QuotaExceeded,

    /// Any other non-2xx response, with the raw body for diagnosis
    #[error("YouTube API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// Transport-level failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response contained no item for the requested resource
    #[error("{0} not found")]
    NotFound(&'static str),
}

/// Authenticated, caching client for the YouTube Data and Analytics APIs
///
/// Cheap to clone; the token set and cache are shared across clones, so a
/// refresh performed by one clone benefits all of them.
#[derive(Clone)]
pub struct YouTubeClient {
    http: Client,
    tokens: Arc<Mutex<TokenSet>>,
    cache: Option<Arc<CacheManager>>,
    oauth: OauthConfig,
    api_base: String,
}

impl YouTubeClient {
    /// Creates a client with the default cache location
    ///
    /// The cache is skipped entirely when no cache directory can be
    /// determined (e.g., no home directory).
    pub fn new(oauth: OauthConfig, tokens: TokenSet) -> Self {
        Self {
            http: Client::new(),
            tokens: Arc::new(Mutex::new(tokens)),
            cache: CacheManager::new().map(Arc::new),
            oauth,
            api_base: YOUTUBE_API_BASE.to_string(),
        }
    }

    /// Creates a client with a custom cache manager
    pub fn with_cache(oauth: OauthConfig, tokens: TokenSet, cache: CacheManager) -> Self {
        Self {
            http: Client::new(),
            tokens: Arc::new(Mutex::new(tokens)),
            cache: Some(Arc::new(cache)),
            oauth,
            api_base: YOUTUBE_API_BASE.to_string(),
        }
    }

    /// Overrides the Data API base URL (for testing)
    #[cfg(test)]
    fn with_base_url(mut self, base_url: String) -> Self {
        self.api_base = base_url;
        self
    }

    /// Current bearer token, cloned out of the shared credential
    pub(crate) fn access_token(&self) -> String {
        self.tokens
            .lock()
            .expect("token lock poisoned")
            .access_token
            .clone()
    }

    /// Shared HTTP client handle
    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    /// Drops every cached entry, in memory and on disk
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
    }

    /// Issues an authenticated GET and decodes the JSON response.
    ///
    /// On a 401 the stored credential is refreshed once and the request
    /// retried once with the new token; a second 401 surfaces as
    /// [`YouTubeError::AuthExpired`] without further calls. A 403 whose body
    /// reason is `quotaExceeded` becomes [`YouTubeError::QuotaExceeded`].
    /// No cache interaction happens here.
    pub(crate) async fn request<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, YouTubeError> {
        let response = self.send_get(url, params).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            debug!(url, "access token rejected; attempting refresh");
            self.refresh_tokens().await?;
            let retry = self.send_get(url, params).await?;
            return decode_response(retry).await;
        }

        decode_response(response).await
    }

    /// Sends one bearer-authenticated GET
    async fn send_get(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<reqwest::Response, YouTubeError> {
        Ok(self
            .http
            .get(url)
            .query(params)
            .bearer_auth(self.access_token())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?)
    }

    /// Renews the access token using the stored refresh token.
    ///
    /// Replaces the credential in place on success. Any failure (no refresh
    /// token, endpoint error) means the caller must re-authenticate, so it
    /// collapses to [`YouTubeError::AuthExpired`].
    async fn refresh_tokens(&self) -> Result<(), YouTubeError> {
        let refresh_token = self
            .tokens
            .lock()
            .expect("token lock poisoned")
            .refresh_token
            .clone();

        let Some(refresh_token) = refresh_token else {
            warn!("no refresh token stored; cannot renew access token");
            return Err(YouTubeError::AuthExpired);
        };

        match auth::refresh_access_token(&self.http, &self.oauth, &refresh_token).await {
            Ok(response) => {
                self.tokens
                    .lock()
                    .expect("token lock poisoned")
                    .apply(response);
                debug!("access token refreshed");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "token refresh failed");
                Err(YouTubeError::AuthExpired)
            }
        }
    }

    /// Cache-or-produce pattern backing every cached resource method.
    ///
    /// A fresh entry under `key` is returned as-is; an expired entry is
    /// evicted before `producer` runs. On success the produced value is
    /// stored in both cache levels. Producer errors propagate uncached.
    pub async fn cached<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        producer: F,
    ) -> Result<T, YouTubeError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, YouTubeError>>,
    {
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.read::<T>(key, ttl) {
                return Ok(hit.data);
            }
        }

        debug!(key, "cache miss; fetching from API");
        let value = producer().await?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.write(key, &value) {
                warn!(key, error = %e, "failed to persist cache entry");
            }
        }

        Ok(value)
    }

    /// Fetches channel metadata and statistics (cached for 1 hour)
    ///
    /// # Arguments
    /// * `channel_id` - Channel to fetch; `None` means the authenticated
    ///   user's own channel
    pub async fn fetch_channel(&self, channel_id: Option<&str>) -> Result<Channel, YouTubeError> {
        let cache_key = format!("channel_{}", channel_id.unwrap_or("mine"));

        let client = self.clone();
        let id = channel_id.map(String::from);
        self.cached(
            &cache_key,
            Duration::seconds(CHANNEL_CACHE_TTL_SECS),
            move || async move { client.channel_from_api(id.as_deref()).await },
        )
        .await
    }

    /// Fetches the authenticated user's most recent videos (cached for
    /// 15 minutes)
    ///
    /// Two dependent calls: a search by owner for video ids, then a batch
    /// detail lookup for statistics, status, and duration.
    pub async fn fetch_videos(&self, max_results: u32) -> Result<Vec<Video>, YouTubeError> {
        let cache_key = format!("videos_{}", max_results);

        let client = self.clone();
        self.cached(
            &cache_key,
            Duration::seconds(VIDEOS_CACHE_TTL_SECS),
            move || async move { client.videos_from_api(max_results).await },
        )
        .await
    }

    /// Fetches statistics for a single video (never cached)
    pub async fn fetch_video_statistics(&self, video_id: &str) -> Result<VideoStats, YouTubeError> {
        let params = [
            ("part", "statistics".to_string()),
            ("id", video_id.to_string()),
        ];

        let response: ApiListResponse<ApiVideoStatsItem> = self
            .request(&format!("{}/videos", self.api_base), &params)
            .await?;

        response
            .items
            .into_iter()
            .next()
            .map(ApiVideoStatsItem::into_domain)
            .ok_or(YouTubeError::NotFound("video"))
    }

    /// Fetches statistics for many videos in batches of up to 50 ids.
    ///
    /// Results keep the provider's per-batch order; ids the provider does
    /// not return simply have no entry. Any failure degrades the whole call
    /// to an empty list — callers must treat empty as "unavailable", not as
    /// a confirmed zero.
    pub async fn fetch_multiple_video_statistics(&self, video_ids: &[String]) -> Vec<VideoStats> {
        match self.multiple_statistics_from_api(video_ids).await {
            Ok(stats) => stats,
            Err(e) => {
                warn!(error = %e, "batch statistics lookup failed; returning empty set");
                Vec::new()
            }
        }
    }

    async fn multiple_statistics_from_api(
        &self,
        video_ids: &[String],
    ) -> Result<Vec<VideoStats>, YouTubeError> {
        let mut results = Vec::with_capacity(video_ids.len());

        for batch in video_ids.chunks(MAX_IDS_PER_BATCH) {
            let params = [
                ("part", "statistics".to_string()),
                ("id", batch.join(",")),
            ];

            let response: ApiListResponse<ApiVideoStatsItem> = self
                .request(&format!("{}/videos", self.api_base), &params)
                .await?;

            results.extend(
                response
                    .items
                    .into_iter()
                    .map(ApiVideoStatsItem::into_domain),
            );
        }

        Ok(results)
    }

    async fn channel_from_api(&self, channel_id: Option<&str>) -> Result<Channel, YouTubeError> {
        let mut params = vec![(
            "part",
            "snippet,statistics,brandingSettings".to_string(),
        )];
        // The API accepts either an explicit id or mine=true, never both
        match channel_id {
            Some(id) => params.push(("id", id.to_string())),
            None => params.push(("mine", "true".to_string())),
        }

        let response: ApiListResponse<ApiChannel> = self
            .request(&format!("{}/channels", self.api_base), &params)
            .await?;

        response
            .items
            .into_iter()
            .next()
            .map(ApiChannel::into_domain)
            .ok_or(YouTubeError::NotFound("channel"))
    }

    async fn videos_from_api(&self, max_results: u32) -> Result<Vec<Video>, YouTubeError> {
        // Step 1: search by owner to obtain the recent video ids
        let search_params = [
            ("part", "snippet".to_string()),
            ("forMine", "true".to_string()),
            ("type", "video".to_string()),
            ("maxResults", max_results.to_string()),
            ("order", "date".to_string()),
        ];

        let search: ApiListResponse<ApiSearchItem> = self
            .request(&format!("{}/search", self.api_base), &search_params)
            .await?;

        let ids: Vec<String> = search
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect();

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        // Step 2: batch detail lookup keyed by those ids
        let detail_params = [
            ("part", "snippet,statistics,status,contentDetails".to_string()),
            ("id", ids.join(",")),
        ];

        let detail: ApiListResponse<ApiVideo> = self
            .request(&format!("{}/videos", self.api_base), &detail_params)
            .await?;

        Ok(detail.items.into_iter().map(ApiVideo::into_domain).collect())
    }
}

/// Decodes a response, classifying non-2xx statuses into the error taxonomy
async fn decode_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, YouTubeError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    Err(classify_failure(status.as_u16(), &body))
}

/// Maps an HTTP failure status plus body onto the error taxonomy
///
/// 401 means the retried request was still unauthorized; 403 is a quota
/// error only when the body carries the `quotaExceeded` reason code.
pub(crate) fn classify_failure(status: u16, body: &str) -> YouTubeError {
    if status == 401 {
        return YouTubeError::AuthExpired;
    }
    if status == 403 && error_reason(body).as_deref() == Some("quotaExceeded") {
        return YouTubeError::QuotaExceeded;
    }
    YouTubeError::Api {
        status,
        body: body.to_string(),
    }
}

/// Extracts the first structured reason code from an API error body
fn error_reason(body: &str) -> Option<String> {
    let parsed: ApiErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .error
        .errors
        .into_iter()
        .next()
        .map(|detail| detail.reason)
}

/// Parses a numeric count the provider returns as a string; absent or
/// malformed values become 0
fn parse_count(value: Option<&str>) -> u64 {
    value.and_then(|v| v.parse().ok()).unwrap_or(0)
}

fn parse_privacy_status(value: Option<&str>) -> PrivacyStatus {
    match value {
        Some("public") => PrivacyStatus::Public,
        Some("unlisted") => PrivacyStatus::Unlisted,
        _ => PrivacyStatus::Private,
    }
}

fn parse_upload_status(value: Option<&str>) -> UploadStatus {
    match value {
        Some("uploaded") => UploadStatus::Uploaded,
        Some("failed") => UploadStatus::Failed,
        _ => UploadStatus::Processed,
    }
}

/// Structured error body the API attaches to non-2xx responses
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetailList,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetailList {
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    reason: String,
}

/// Generic list envelope every Data API endpoint returns
#[derive(Debug, Deserialize)]
struct ApiListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

/// Raw channel resource
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiChannel {
    #[serde(default)]
    id: String,
    #[serde(default)]
    snippet: ApiSnippet,
    #[serde(default)]
    statistics: ApiCountStatistics,
    #[serde(default)]
    branding_settings: ApiBrandingSettings,
}

impl ApiChannel {
    fn into_domain(self) -> Channel {
        Channel {
            id: self.id,
            title: self.snippet.title,
            description: self.snippet.description,
            custom_url: self.snippet.custom_url.unwrap_or_default(),
            published_at: self.snippet.published_at,
            thumbnails: self.snippet.thumbnails,
            statistics: ChannelStatistics {
                view_count: parse_count(self.statistics.view_count.as_deref()),
                subscriber_count: parse_count(self.statistics.subscriber_count.as_deref()),
                video_count: parse_count(self.statistics.video_count.as_deref()),
            },
            keywords: self
                .branding_settings
                .channel
                .map(|c| c.keywords)
                .unwrap_or_default(),
        }
    }
}

/// Raw snippet shared by channel, search, and video resources
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ApiSnippet {
    title: String,
    description: String,
    published_at: String,
    custom_url: Option<String>,
    thumbnails: Thumbnails,
    channel_id: String,
    channel_title: String,
    category_id: String,
    tags: Option<Vec<String>>,
}

/// Raw statistics block; the provider serializes every count as a string
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ApiCountStatistics {
    view_count: Option<String>,
    subscriber_count: Option<String>,
    video_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ApiBrandingSettings {
    channel: Option<ApiBrandingChannel>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ApiBrandingChannel {
    keywords: String,
}

/// Raw search result item; only the id matters here
#[derive(Debug, Deserialize)]
struct ApiSearchItem {
    #[serde(default)]
    id: ApiSearchId,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ApiSearchId {
    video_id: Option<String>,
}

/// Raw video resource from the batch detail call
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiVideo {
    #[serde(default)]
    id: String,
    #[serde(default)]
    snippet: ApiSnippet,
    #[serde(default)]
    statistics: ApiCountStatistics,
    #[serde(default)]
    status: ApiVideoStatus,
    #[serde(default)]
    content_details: ApiContentDetails,
}

impl ApiVideo {
    fn into_domain(self) -> Video {
        Video {
            id: self.id,
            title: self.snippet.title,
            description: self.snippet.description,
            published_at: self.snippet.published_at,
            duration: if self.content_details.duration.is_empty() {
                "PT0S".to_string()
            } else {
                self.content_details.duration
            },
            thumbnails: self.snippet.thumbnails,
            statistics: VideoStatistics {
                view_count: parse_count(self.statistics.view_count.as_deref()),
                like_count: parse_count(self.statistics.like_count.as_deref()),
                comment_count: parse_count(self.statistics.comment_count.as_deref()),
            },
            privacy_status: parse_privacy_status(self.status.privacy_status.as_deref()),
            upload_status: parse_upload_status(self.status.upload_status.as_deref()),
            channel_id: self.snippet.channel_id,
            channel_title: self.snippet.channel_title,
            category_id: self.snippet.category_id,
            tags: self.snippet.tags.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ApiVideoStatus {
    privacy_status: Option<String>,
    upload_status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ApiContentDetails {
    duration: String,
}

/// Raw statistics-only video item from the batch statistics call
#[derive(Debug, Deserialize)]
struct ApiVideoStatsItem {
    #[serde(default)]
    id: String,
    #[serde(default)]
    statistics: ApiCountStatistics,
}

impl ApiVideoStatsItem {
    fn into_domain(self) -> VideoStats {
        VideoStats {
            id: self.id,
            view_count: parse_count(self.statistics.view_count.as_deref()),
            like_count: parse_count(self.statistics.like_count.as_deref()),
            comment_count: parse_count(self.statistics.comment_count.as_deref()),
        }
    }
}
