use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Remote backend session bookkeeping, one row per source.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SyncState {
  pub id: i64,
  pub source: String,
  pub last_sync_at: Option<DateTime<Utc>>,
  /// performed_at of the most recent set the backend has acknowledged.
  pub last_set_at: Option<DateTime<Utc>>,
  pub access_token: Option<String>,
  pub refresh_token: Option<String>,
  pub token_expires_at: Option<DateTime<Utc>>,
}
