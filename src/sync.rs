use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use url::Url;

use crate::models::history::LoggedSet;

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

const DEFAULT_API_BASE: &str = "https://api.lift-log.app";
const TOKEN_REFRESH_BUFFER_MINUTES: i64 = 5;

/// Source key for sync_state rows belonging to this backend.
pub const SYNC_SOURCE: &str = "backend";

/// ---------------------------------------------------------------------------
/// Configuration
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SyncConfig {
  pub api_base: String,
  pub api_key: String,
  pub device_name: String,
}

impl SyncConfig {
  pub fn from_env() -> Result<Self, SyncError> {
    dotenvy::dotenv().ok();

    Ok(Self {
      api_base: env::var("LIFTLOG_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
      api_key: env::var("LIFTLOG_API_KEY")
        .map_err(|_| SyncError::MissingConfig("LIFTLOG_API_KEY".into()))?,
      device_name: env::var("LIFTLOG_DEVICE_NAME").unwrap_or_else(|_| "lift-log".to_string()),
    })
  }
}

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
  #[error("Missing configuration: {0}")]
  MissingConfig(String),

  #[error("HTTP request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("Backend error: {0}")]
  Api(String),

  #[error("Not authenticated with the backend")]
  NotAuthenticated,

  #[error("Database error: {0}")]
  Database(String),
}

impl Serialize for SyncError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Session Tokens
/// ---------------------------------------------------------------------------

/// Response from the backend session endpoints
#[allow(dead_code)]
#[derive(Debug, Deserialize)]
pub struct SessionResponse {
  pub access_token: String,
  pub refresh_token: String,
  /// Lifetime of the access token in seconds
  pub expires_in: i64,
  pub user_id: String,
}

/// Stored token state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncTokens {
  pub access_token: String,
  pub refresh_token: String,
  pub expires_at: DateTime<Utc>,
}

impl SyncTokens {
  pub fn from_response(resp: SessionResponse) -> Self {
    Self {
      access_token: resp.access_token,
      refresh_token: resp.refresh_token,
      expires_at: Utc::now() + Duration::seconds(resp.expires_in),
    }
  }

  pub fn needs_refresh(&self) -> bool {
    let buffer = Duration::minutes(TOKEN_REFRESH_BUFFER_MINUTES);
    Utc::now() + buffer >= self.expires_at
  }
}

/// ---------------------------------------------------------------------------
/// Sign-In and Refresh
/// ---------------------------------------------------------------------------

pub async fn sign_in(
  config: &SyncConfig,
  email: &str,
  password: &str,
) -> Result<SyncTokens, SyncError> {
  let client = Client::new();

  let response = client
    .post(format!("{}/v1/auth/sign-in", config.api_base))
    .header("x-api-key", &config.api_key)
    .json(&serde_json::json!({
      "email": email,
      "password": password,
      "device": config.device_name,
    }))
    .send()
    .await?;

  if !response.status().is_success() {
    let error_text = response.text().await.unwrap_or_default();
    return Err(SyncError::Api(format!("Sign-in failed: {}", error_text)));
  }

  let session: SessionResponse = response.json().await?;
  Ok(SyncTokens::from_response(session))
}

pub async fn refresh_session(
  config: &SyncConfig,
  refresh_token: &str,
) -> Result<SyncTokens, SyncError> {
  let client = Client::new();

  let response = client
    .post(format!("{}/v1/auth/refresh", config.api_base))
    .header("x-api-key", &config.api_key)
    .json(&serde_json::json!({ "refresh_token": refresh_token }))
    .send()
    .await?;

  if response.status() == reqwest::StatusCode::UNAUTHORIZED {
    return Err(SyncError::NotAuthenticated);
  }

  if !response.status().is_success() {
    let error_text = response.text().await.unwrap_or_default();
    return Err(SyncError::Api(format!("Token refresh failed: {}", error_text)));
  }

  let session: SessionResponse = response.json().await?;
  Ok(SyncTokens::from_response(session))
}

/// ---------------------------------------------------------------------------
/// Set Documents
/// ---------------------------------------------------------------------------

/// Logged-set document as exchanged with the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSet {
  /// Backend document id; None for sets that have never been pushed
  #[serde(default)]
  pub remote_id: Option<String>,
  pub exercise_id: i64,
  pub reps: i64,
  pub weight_kg: f64,
  pub performed_at: DateTime<Utc>,
}

impl From<&LoggedSet> for RemoteSet {
  fn from(set: &LoggedSet) -> Self {
    Self {
      remote_id: None,
      exercise_id: set.exercise_id,
      reps: set.reps,
      weight_kg: set.weight_kg,
      performed_at: set.performed_at,
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct PushReport {
  pub accepted: usize,
}

/// Push a batch of logged sets to the backend.
pub async fn push_sets(
  config: &SyncConfig,
  access_token: &str,
  sets: &[RemoteSet],
) -> Result<PushReport, SyncError> {
  let client = Client::new();

  let response = client
    .post(format!("{}/v1/sets/batch", config.api_base))
    .header("Authorization", format!("Bearer {}", access_token))
    .json(&sets)
    .send()
    .await?;

  if response.status() == reqwest::StatusCode::UNAUTHORIZED {
    return Err(SyncError::NotAuthenticated);
  }

  if !response.status().is_success() {
    let error_text = response.text().await.unwrap_or_default();
    return Err(SyncError::Api(format!("Failed to push sets: {}", error_text)));
  }

  let report: PushReport = response.json().await?;
  Ok(report)
}

/// Build the pull URL, optionally bounded to sets after `since`.
fn build_pull_url(
  config: &SyncConfig,
  since: Option<DateTime<Utc>>,
) -> Result<String, SyncError> {
  let mut url = Url::parse(&format!("{}/v1/sets", config.api_base))
    .map_err(|e| SyncError::Api(e.to_string()))?;

  if let Some(since) = since {
    url.query_pairs_mut().append_pair("since", &since.to_rfc3339());
  }

  Ok(url.to_string())
}

/// Fetch logged sets from the backend, newest last.
pub async fn pull_sets(
  config: &SyncConfig,
  access_token: &str,
  since: Option<DateTime<Utc>>,
) -> Result<Vec<RemoteSet>, SyncError> {
  let client = Client::new();
  let url = build_pull_url(config, since)?;

  let response = client
    .get(&url)
    .header("Authorization", format!("Bearer {}", access_token))
    .send()
    .await?;

  if response.status() == reqwest::StatusCode::UNAUTHORIZED {
    return Err(SyncError::NotAuthenticated);
  }

  if !response.status().is_success() {
    let error_text = response.text().await.unwrap_or_default();
    return Err(SyncError::Api(format!("Failed to pull sets: {}", error_text)));
  }

  let response_text = response.text().await?;

  let sets: Vec<RemoteSet> = serde_json::from_str(&response_text).map_err(|e| {
    eprintln!("Failed to parse pull response: {}", e);
    eprintln!(
      "Raw response (first 500 chars): {}",
      &response_text[..response_text.len().min(500)]
    );
    SyncError::Api(format!("Failed to parse sets: {}", e))
  })?;

  Ok(sets)
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
