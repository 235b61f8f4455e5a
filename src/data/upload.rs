//! Resumable upload session creation
//!
//! Only the session handshake lives here: a metadata POST whose `Location`
//! response header is the session URL the caller PUTs file bytes to. Byte
//! transfer and progress tracking are the caller's concern. Session creation
//! is a single attempt with the current access token; there is no
//! refresh-and-retry on this path.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::youtube::{classify_failure, YouTubeClient, YouTubeError};
use super::PrivacyStatus;

/// Base URL for resumable media uploads
const UPLOAD_API_BASE: &str = "https://www.googleapis.com/upload/youtube/v3";

/// Metadata sent when opening a video upload session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoUploadMetadata {
    /// Title, description, tags, and category
    pub snippet: UploadSnippet,
    /// Visibility and optional scheduled publish time
    pub status: UploadStatusRequest,
}

impl VideoUploadMetadata {
    /// Builds metadata for a private upload with no tags
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            snippet: UploadSnippet {
                title: title.into(),
                description: description.into(),
                tags: Vec::new(),
                category_id: "22".to_string(),
            },
            status: UploadStatusRequest {
                privacy_status: PrivacyStatus::Private,
                publish_at: None,
            },
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.snippet.tags = tags;
        self
    }

    pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
        self.snippet.category_id = category_id.into();
        self
    }

    pub fn with_privacy(mut self, privacy_status: PrivacyStatus) -> Self {
        self.status.privacy_status = privacy_status;
        self
    }

    /// Schedules the video to go public at the given RFC 3339 timestamp;
    /// forces the initial visibility to private as the API requires
    pub fn with_publish_at(mut self, publish_at: impl Into<String>) -> Self {
        self.status.publish_at = Some(publish_at.into());
        self.status.privacy_status = PrivacyStatus::Private;
        self
    }
}

/// Snippet block of the upload metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSnippet {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub category_id: String,
}

/// Status block of the upload metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadStatusRequest {
    pub privacy_status: PrivacyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_at: Option<String>,
}

/// An open resumable upload session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadSession {
    /// Session URL to PUT the media bytes to
    pub upload_url: String,
}

impl YouTubeClient {
    /// Opens a resumable upload session for a new video
    ///
    /// # Arguments
    /// * `metadata` - Video metadata recorded before any bytes are sent
    ///
    /// # Returns
    /// The session whose URL accepts the media bytes
    pub async fn start_video_upload(
        &self,
        metadata: &VideoUploadMetadata,
    ) -> Result<UploadSession, YouTubeError> {
        let url = format!(
            "{}/videos?uploadType=resumable&part=snippet,status",
            UPLOAD_API_BASE
        );

        debug!(title = %metadata.snippet.title, "opening video upload session");

        let response = self
            .http()
            .post(&url)
            .bearer_auth(self.access_token())
            .header("X-Upload-Content-Type", "video/*")
            .json(metadata)
            .send()
            .await?;

        session_from_response(response).await
    }

    /// Opens a resumable upload session for a video thumbnail
    ///
    /// # Arguments
    /// * `video_id` - Video the thumbnail belongs to
    /// * `mime_type` - Content type of the image that will be uploaded
    pub async fn start_thumbnail_upload(
        &self,
        video_id: &str,
        mime_type: &str,
    ) -> Result<UploadSession, YouTubeError> {
        let url = format!("{}/thumbnails/set", UPLOAD_API_BASE);

        debug!(video_id, "opening thumbnail upload session");

        let response = self
            .http()
            .post(&url)
            .query(&[("uploadType", "resumable"), ("videoId", video_id)])
            .bearer_auth(self.access_token())
            .header("X-Upload-Content-Type", mime_type)
            .send()
            .await?;

        session_from_response(response).await
    }
}

/// Extracts the session URL from the handshake response's Location header
async fn session_from_response(
    response: reqwest::Response,
) -> Result<UploadSession, YouTubeError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(classify_failure(status.as_u16(), &body));
    }

    let upload_url = response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or(YouTubeError::NotFound("upload session URL"))?;

    Ok(UploadSession { upload_url })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_defaults_to_private() {
        let metadata = VideoUploadMetadata::new("Spring haul", "What I bought");

        assert_eq!(metadata.snippet.title, "Spring haul");
        assert_eq!(metadata.snippet.category_id, "22");
        assert_eq!(metadata.status.privacy_status, PrivacyStatus::Private);
        assert!(metadata.status.publish_at.is_none());
        assert!(metadata.snippet.tags.is_empty());
    }

    #[test]
    fn test_metadata_serializes_to_provider_shape() {
        let metadata = VideoUploadMetadata::new("Title", "Desc")
            .with_tags(vec!["haul".to_string()])
            .with_category("26")
            .with_privacy(PrivacyStatus::Public);

        let json = serde_json::to_value(&metadata).expect("Failed to serialize metadata");

        assert_eq!(json["snippet"]["title"], "Title");
        assert_eq!(json["snippet"]["categoryId"], "26");
        assert_eq!(json["snippet"]["tags"][0], "haul");
        assert_eq!(json["status"]["privacyStatus"], "public");
        assert!(
            json["status"].get("publishAt").is_none(),
            "Unset publishAt must be omitted, not null"
        );
    }

    #[test]
    fn test_empty_tags_are_omitted() {
        let metadata = VideoUploadMetadata::new("Title", "Desc");
        let json = serde_json::to_value(&metadata).expect("Failed to serialize metadata");

        assert!(json["snippet"].get("tags").is_none());
    }

    #[test]
    fn test_publish_at_forces_private() {
        let metadata = VideoUploadMetadata::new("Title", "Desc")
            .with_privacy(PrivacyStatus::Public)
            .with_publish_at("2026-09-01T09:00:00Z");

        assert_eq!(metadata.status.privacy_status, PrivacyStatus::Private);
        assert_eq!(
            metadata.status.publish_at.as_deref(),
            Some("2026-09-01T09:00:00Z")
        );

        let json = serde_json::to_value(&metadata).expect("Failed to serialize metadata");
        assert_eq!(json["status"]["publishAt"], "2026-09-01T09:00:00Z");
        assert_eq!(json["status"]["privacyStatus"], "private");
    }
}
