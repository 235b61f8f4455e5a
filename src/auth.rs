//! Google OAuth flow for YouTube account linking
//!
//! Builds the consent URL, exchanges the authorization code for tokens, and
//! refreshes expired access tokens against the Google token endpoint. Token
//! persistence is the caller's concern; this module only produces and renews
//! credentials.

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Google OAuth consent endpoint
const AUTH_BASE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Google token endpoint (code exchange and refresh grants)
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Scopes requested for the dashboard: read channel/video data, analytics,
/// and upload management
const SCOPES: [&str; 5] = [
    "https://www.googleapis.com/auth/youtube.readonly",
    "https://www.googleapis.com/auth/youtube.force-ssl",
    "https://www.googleapis.com/auth/youtubepartner",
    "https://www.googleapis.com/auth/yt-analytics.readonly",
    "https://www.googleapis.com/auth/yt-analytics-monetary.readonly",
];

/// Errors that can occur during the OAuth flow
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required environment variable is not set
    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),

    /// No refresh token is available, so the access token cannot be renewed
    #[error("no refresh token available; re-link the YouTube account")]
    MissingRefreshToken,

    /// The token endpoint rejected the grant
    #[error("token endpoint error ({status}): {body}")]
    TokenEndpoint { status: u16, body: String },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// OAuth client configuration
#[derive(Debug, Clone)]
pub struct OauthConfig {
    /// OAuth client id issued by the Google console
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Redirect URI registered for the consent flow
    pub redirect_uri: String,
    /// Token endpoint; overridable for tests
    pub token_url: String,
}

impl OauthConfig {
    /// Creates a config from explicit values
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            token_url: TOKEN_URL.to_string(),
        }
    }

    /// Loads the config from environment variables.
    ///
    /// Reads `MUGUET_YT_CLIENT_ID`, `MUGUET_YT_CLIENT_SECRET`, and
    /// `MUGUET_YT_REDIRECT_URI` (the redirect defaults to the local
    /// dashboard callback when unset).
    pub fn from_env() -> Result<Self, AuthError> {
        let client_id = std::env::var("MUGUET_YT_CLIENT_ID")
            .map_err(|_| AuthError::MissingEnv("MUGUET_YT_CLIENT_ID"))?;
        let client_secret = std::env::var("MUGUET_YT_CLIENT_SECRET")
            .map_err(|_| AuthError::MissingEnv("MUGUET_YT_CLIENT_SECRET"))?;
        let redirect_uri = std::env::var("MUGUET_YT_REDIRECT_URI")
            .unwrap_or_else(|_| "http://localhost:3000/auth/youtube/callback".to_string());

        Ok(Self::new(client_id, client_secret, redirect_uri))
    }

    /// Builds the consent URL the user must visit to link their account
    ///
    /// # Arguments
    /// * `state` - Optional opaque value echoed back on the callback
    ///
    /// Requests offline access with a forced consent prompt so a refresh
    /// token is always issued.
    pub fn authorization_url(&self, state: Option<&str>) -> String {
        let scope = SCOPES.join(" ");
        let mut params = vec![
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", scope.as_str()),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ];
        if let Some(state) = state {
            params.push(("state", state));
        }

        // AUTH_BASE_URL is a valid literal, so parsing cannot fail
        reqwest::Url::parse_with_params(AUTH_BASE_URL, &params)
            .expect("static auth URL must parse")
            .to_string()
    }
}

/// Response from the token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// The new access token
    pub access_token: String,
    /// A refresh token, present on code exchange and sometimes on refresh
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime of the access token in seconds
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Token type, always "Bearer" in practice
    #[serde(default)]
    pub token_type: Option<String>,
}

/// The credential pair held by an authenticated client
///
/// Mutated in place when a refresh succeeds: the access token is always
/// replaced, the refresh token only when the endpoint issues a new one.
#[derive(Debug, Clone)]
pub struct TokenSet {
    /// Current bearer token for API calls
    pub access_token: String,
    /// Long-lived token used to renew the access token; absent when the
    /// consent flow did not grant offline access
    pub refresh_token: Option<String>,
}

impl TokenSet {
    /// Creates a token set from explicit values
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
        }
    }

    /// Loads tokens from `MUGUET_YT_ACCESS_TOKEN` / `MUGUET_YT_REFRESH_TOKEN`
    pub fn from_env() -> Result<Self, AuthError> {
        let access_token = std::env::var("MUGUET_YT_ACCESS_TOKEN")
            .map_err(|_| AuthError::MissingEnv("MUGUET_YT_ACCESS_TOKEN"))?;
        let refresh_token = std::env::var("MUGUET_YT_REFRESH_TOKEN").ok();

        Ok(Self {
            access_token,
            refresh_token,
        })
    }

    /// Applies a token endpoint response, replacing the access token and,
    /// when one was issued, the refresh token
    pub fn apply(&mut self, response: TokenResponse) {
        self.access_token = response.access_token;
        if let Some(refresh) = response.refresh_token {
            self.refresh_token = Some(refresh);
        }
    }
}

/// Exchanges an authorization code for a token pair
///
/// # Arguments
/// * `http` - The HTTP client to issue the POST with
/// * `config` - OAuth client configuration
/// * `code` - The authorization code from the consent callback
pub async fn exchange_code(
    http: &Client,
    config: &OauthConfig,
    code: &str,
) -> Result<TokenResponse, AuthError> {
    let form = [
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
        ("code", code),
        ("grant_type", "authorization_code"),
        ("redirect_uri", config.redirect_uri.as_str()),
    ];

    post_token_request(http, &config.token_url, &form).await
}

/// Renews an access token using a refresh token
pub async fn refresh_access_token(
    http: &Client,
    config: &OauthConfig,
    refresh_token: &str,
) -> Result<TokenResponse, AuthError> {
    debug!("refreshing access token");

    let form = [
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
        ("refresh_token", refresh_token),
        ("grant_type", "refresh_token"),
    ];

    post_token_request(http, &config.token_url, &form).await
}

/// Issues a form-encoded POST to the token endpoint and decodes the result
async fn post_token_request(
    http: &Client,
    token_url: &str,
    form: &[(&str, &str)],
) -> Result<TokenResponse, AuthError> {
    let response = http.post(token_url).form(form).send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AuthError::TokenEndpoint {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.json().await?)
}
