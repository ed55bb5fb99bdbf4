//! Thin persistence wrappers around the training log
//!
//! CRUD for logged sets, window queries feeding the engine, the single-row
//! user settings, and sync-state bookkeeping. Input validation happens here
//! at the boundary; the engine itself assumes well-formed history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::catalog::CatalogIndex;
use crate::coverage::{EngineWeights, TargetSettings, WeeklyTargets};
use crate::models::catalog::TrainingGoal;
use crate::models::history::{ExerciseAggregate, LoggedSet, NewLoggedSet, SetEntry};
use crate::models::sync::SyncState;
use crate::recommendation::{rank_exercises, suggest_exercises, ExerciseScore, ExerciseSuggestion};

/// Trailing history window the recommendation screens default to.
pub const DEFAULT_WINDOW_DAYS: i64 = 14;

/// ---------------------------------------------------------------------------
/// Logged Sets
/// ---------------------------------------------------------------------------

/// Insert one completed set. Negative reps or weight are rejected here so
/// the engine never sees malformed history.
pub async fn insert_logged_set(pool: &SqlitePool, set: &NewLoggedSet) -> Result<i64, String> {
  if set.reps < 0 {
    return Err(format!("Rejected set with negative reps: {}", set.reps));
  }
  if set.weight_kg < 0.0 || !set.weight_kg.is_finite() {
    return Err(format!("Rejected set with invalid weight: {}", set.weight_kg));
  }

  let result = sqlx::query(
    r#"
    INSERT INTO logged_sets (exercise_id, reps, weight_kg, performed_at)
    VALUES (?1, ?2, ?3, ?4)
    "#,
  )
  .bind(set.exercise_id)
  .bind(set.reps)
  .bind(set.weight_kg)
  .bind(set.performed_at)
  .execute(pool)
  .await
  .map_err(|e| format!("Failed to insert set: {}", e))?;

  Ok(result.last_insert_rowid())
}

pub async fn delete_logged_set(pool: &SqlitePool, id: i64) -> Result<(), String> {
  sqlx::query("DELETE FROM logged_sets WHERE id = ?1")
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| format!("Failed to delete set {}: {}", id, e))?;

  Ok(())
}

/// All sets inside a trailing window, most recent first.
pub async fn logged_sets_since(
  pool: &SqlitePool,
  window_days: i64,
) -> Result<Vec<LoggedSet>, String> {
  let sets: Vec<LoggedSet> = sqlx::query_as(
    r#"
    SELECT id, exercise_id, reps, weight_kg, performed_at, created_at
    FROM logged_sets
    WHERE performed_at >= datetime('now', ?1)
    ORDER BY performed_at DESC
    "#,
  )
  .bind(format!("-{} days", window_days))
  .fetch_all(pool)
  .await
  .map_err(|e| format!("Failed to fetch sets: {}", e))?;

  Ok(sets)
}

/// The minimal (exercise, reps, weight) rows the coverage calculator takes.
pub async fn set_entries_since(
  pool: &SqlitePool,
  window_days: i64,
) -> Result<Vec<SetEntry>, String> {
  let rows: Vec<(i64, i64, f64)> = sqlx::query_as(
    r#"
    SELECT exercise_id, reps, CAST(weight_kg AS REAL)
    FROM logged_sets
    WHERE performed_at >= datetime('now', ?1)
    "#,
  )
  .bind(format!("-{} days", window_days))
  .fetch_all(pool)
  .await
  .map_err(|e| format!("Failed to fetch set entries: {}", e))?;

  Ok(
    rows
      .into_iter()
      .map(|(exercise_id, reps, weight_kg)| SetEntry {
        exercise_id,
        reps,
        weight_kg,
      })
      .collect(),
  )
}

/// Pre-summarized per-exercise evidence over a trailing window.
pub async fn exercise_aggregates_since(
  pool: &SqlitePool,
  window_days: i64,
) -> Result<Vec<ExerciseAggregate>, String> {
  let rows: Vec<(i64, i64, i64, f64, String)> = sqlx::query_as(
    r#"
    SELECT
      exercise_id,
      COUNT(*),
      SUM(reps),
      CAST(SUM(reps * weight_kg) AS REAL),
      MAX(performed_at)
    FROM logged_sets
    WHERE performed_at >= datetime('now', ?1)
    GROUP BY exercise_id
    ORDER BY exercise_id
    "#,
  )
  .bind(format!("-{} days", window_days))
  .fetch_all(pool)
  .await
  .map_err(|e| format!("Failed to aggregate sets: {}", e))?;

  let aggregates = rows
    .into_iter()
    .filter_map(|(exercise_id, total_sets, total_reps, total_volume, last)| {
      Some(ExerciseAggregate {
        exercise_id,
        total_sets,
        total_reps,
        total_volume,
        last_performed_at: parse_timestamp(&last)?,
      })
    })
    .collect();

  Ok(aggregates)
}

/// Parse a timestamp column that may come back in RFC3339 or sqlite's
/// space-separated format.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(raw)
    .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%SZ"))
    .or_else(|_| DateTime::parse_from_str(&format!("{}+00:00", raw), "%Y-%m-%d %H:%M:%S%:z"))
    .ok()
    .map(|dt| dt.with_timezone(&Utc))
}

/// ---------------------------------------------------------------------------
/// User Settings
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSettings {
  pub training_goal: TrainingGoal,
  pub training_days_per_week: i64,
}

impl Default for UserSettings {
  fn default() -> Self {
    Self {
      training_goal: TrainingGoal::Hypertrophy,
      training_days_per_week: 4,
    }
  }
}

pub async fn get_user_settings(pool: &SqlitePool) -> Result<UserSettings, String> {
  let row: Option<(String, i64)> = sqlx::query_as(
    "SELECT training_goal, training_days_per_week FROM user_settings WHERE id = 1",
  )
  .fetch_optional(pool)
  .await
  .map_err(|e| format!("Failed to get settings: {}", e))?;

  match row {
    Some((goal, days)) => Ok(UserSettings {
      training_goal: goal.parse().unwrap_or(TrainingGoal::Hypertrophy),
      training_days_per_week: days,
    }),
    None => Ok(UserSettings::default()),
  }
}

pub async fn update_user_settings(
  pool: &SqlitePool,
  training_goal: Option<TrainingGoal>,
  training_days_per_week: Option<i64>,
) -> Result<(), String> {
  sqlx::query(
    r#"
    UPDATE user_settings SET
      training_goal = COALESCE(?1, training_goal),
      training_days_per_week = COALESCE(?2, training_days_per_week),
      updated_at = CURRENT_TIMESTAMP
    WHERE id = 1
    "#,
  )
  .bind(training_goal.map(|g| g.to_string()))
  .bind(training_days_per_week)
  .execute(pool)
  .await
  .map_err(|e| format!("Failed to update settings: {}", e))?;

  Ok(())
}

/// ---------------------------------------------------------------------------
/// Sync State
/// ---------------------------------------------------------------------------

pub async fn load_sync_state(
  pool: &SqlitePool,
  source: &str,
) -> Result<Option<SyncState>, String> {
  sqlx::query_as(
    r#"
    SELECT id, source, last_sync_at, last_set_at, access_token, refresh_token, token_expires_at
    FROM sync_state
    WHERE source = ?1
    "#,
  )
  .bind(source)
  .fetch_optional(pool)
  .await
  .map_err(|e| format!("Failed to load sync state: {}", e))
}

pub async fn save_sync_tokens(
  pool: &SqlitePool,
  source: &str,
  access_token: &str,
  refresh_token: &str,
  token_expires_at: DateTime<Utc>,
) -> Result<(), String> {
  sqlx::query(
    r#"
    INSERT INTO sync_state (source, access_token, refresh_token, token_expires_at)
    VALUES (?1, ?2, ?3, ?4)
    ON CONFLICT(source) DO UPDATE SET
      access_token = excluded.access_token,
      refresh_token = excluded.refresh_token,
      token_expires_at = excluded.token_expires_at
    "#,
  )
  .bind(source)
  .bind(access_token)
  .bind(refresh_token)
  .bind(token_expires_at)
  .execute(pool)
  .await
  .map_err(|e| format!("Failed to save sync tokens: {}", e))?;

  Ok(())
}

/// Record a completed sync pass.
pub async fn mark_synced(
  pool: &SqlitePool,
  source: &str,
  last_set_at: Option<DateTime<Utc>>,
) -> Result<(), String> {
  sqlx::query(
    r#"
    UPDATE sync_state SET
      last_sync_at = ?1,
      last_set_at = COALESCE(?2, last_set_at)
    WHERE source = ?3
    "#,
  )
  .bind(Utc::now())
  .bind(last_set_at)
  .bind(source)
  .execute(pool)
  .await
  .map_err(|e| format!("Failed to mark sync: {}", e))?;

  Ok(())
}

pub async fn clear_sync_state(pool: &SqlitePool, source: &str) -> Result<(), String> {
  sqlx::query("DELETE FROM sync_state WHERE source = ?1")
    .bind(source)
    .execute(pool)
    .await
    .map_err(|e| format!("Failed to clear sync state: {}", e))?;

  Ok(())
}

/// ---------------------------------------------------------------------------
/// Engine Wiring
/// ---------------------------------------------------------------------------

/// Deficit-ranked exercise list over a trailing window of logged sets.
pub async fn rank_for_window(
  pool: &SqlitePool,
  catalog: &CatalogIndex,
  window_days: i64,
  top_n: usize,
) -> Result<Vec<ExerciseScore>, String> {
  let history = set_entries_since(pool, window_days).await?;
  let targets = WeeklyTargets::compute_default(catalog, &TargetSettings::default());

  Ok(rank_exercises(
    catalog,
    &history,
    &targets,
    &EngineWeights::default(),
    top_n,
  ))
}

/// "What to train next" suggestions over a trailing window.
pub async fn suggest_for_window(
  pool: &SqlitePool,
  catalog: &CatalogIndex,
  window_days: i64,
  k: usize,
) -> Result<Vec<ExerciseSuggestion>, String> {
  let aggregates = exercise_aggregates_since(pool, window_days).await?;

  Ok(suggest_exercises(
    catalog,
    &aggregates,
    &EngineWeights::default(),
    k,
  ))
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assert_approx_eq;
  use crate::test_utils::{seed_test_sets, setup_test_db, teardown_test_db};
  use chrono::Duration;

  fn new_set(exercise_id: i64, reps: i64, weight_kg: f64, days_ago: i64) -> NewLoggedSet {
    NewLoggedSet {
      exercise_id,
      reps,
      weight_kg,
      performed_at: Utc::now() - Duration::days(days_ago),
    }
  }

  #[tokio::test]
  async fn test_insert_and_window_fetch() {
    let pool = setup_test_db().await;

    insert_logged_set(&pool, &new_set(100, 10, 60.0, 1))
      .await
      .expect("Should insert recent set");
    insert_logged_set(&pool, &new_set(100, 8, 60.0, 5))
      .await
      .expect("Should insert mid-window set");
    insert_logged_set(&pool, &new_set(100, 8, 55.0, 20))
      .await
      .expect("Should insert old set");

    let recent = logged_sets_since(&pool, 14).await.expect("Should fetch window");
    assert_eq!(recent.len(), 2, "20-day-old set must fall outside the window");

    // Most recent first
    assert_eq!(recent[0].reps, 10);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_insert_rejects_malformed_sets() {
    let pool = setup_test_db().await;

    let negative_reps = insert_logged_set(&pool, &new_set(100, -3, 60.0, 0)).await;
    assert!(negative_reps.is_err());

    let negative_weight = insert_logged_set(&pool, &new_set(100, 10, -1.0, 0)).await;
    assert!(negative_weight.is_err());

    // Nothing reached the table
    let all = logged_sets_since(&pool, 30).await.expect("Should fetch");
    assert!(all.is_empty());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_aggregates_math() {
    let pool = setup_test_db().await;

    insert_logged_set(&pool, &new_set(100, 10, 10.0, 1)).await.unwrap();
    insert_logged_set(&pool, &new_set(100, 10, 10.0, 2)).await.unwrap();
    insert_logged_set(&pool, &new_set(100, 5, 20.0, 3)).await.unwrap();
    insert_logged_set(&pool, &new_set(110, 8, 0.0, 1)).await.unwrap();

    let aggregates = exercise_aggregates_since(&pool, 14)
      .await
      .expect("Should aggregate");

    assert_eq!(aggregates.len(), 2);
    let bench = aggregates.iter().find(|a| a.exercise_id == 100).unwrap();
    assert_eq!(bench.total_sets, 3);
    assert_eq!(bench.total_reps, 25);
    assert_approx_eq!(bench.total_volume, 300.0, 1e-9);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_delete_logged_set() {
    let pool = setup_test_db().await;

    let id = insert_logged_set(&pool, &new_set(100, 10, 60.0, 1)).await.unwrap();
    delete_logged_set(&pool, id).await.expect("Should delete");

    let all = logged_sets_since(&pool, 30).await.unwrap();
    assert!(all.is_empty());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_user_settings_roundtrip() {
    let pool = setup_test_db().await;

    // Migration seeds the defaults row
    let settings = get_user_settings(&pool).await.expect("Should read settings");
    assert_eq!(settings.training_goal, TrainingGoal::Hypertrophy);
    assert_eq!(settings.training_days_per_week, 4);

    update_user_settings(&pool, Some(TrainingGoal::Strength), Some(5))
      .await
      .expect("Should update settings");

    let updated = get_user_settings(&pool).await.expect("Should re-read settings");
    assert_eq!(updated.training_goal, TrainingGoal::Strength);
    assert_eq!(updated.training_days_per_week, 5);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_sync_state_upsert_and_clear() {
    let pool = setup_test_db().await;

    assert!(load_sync_state(&pool, "backend").await.unwrap().is_none());

    save_sync_tokens(&pool, "backend", "token-a", "refresh-a", Utc::now())
      .await
      .expect("Should save tokens");
    save_sync_tokens(&pool, "backend", "token-b", "refresh-b", Utc::now())
      .await
      .expect("Upsert should replace tokens");

    let state = load_sync_state(&pool, "backend")
      .await
      .unwrap()
      .expect("State should exist");
    assert_eq!(state.access_token.as_deref(), Some("token-b"));

    mark_synced(&pool, "backend", Some(Utc::now()))
      .await
      .expect("Should mark synced");
    let synced = load_sync_state(&pool, "backend").await.unwrap().unwrap();
    assert!(synced.last_sync_at.is_some());
    assert!(synced.last_set_at.is_some());

    clear_sync_state(&pool, "backend").await.expect("Should clear");
    assert!(load_sync_state(&pool, "backend").await.unwrap().is_none());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_rank_for_window_with_seeded_catalog() {
    let pool = setup_test_db().await;
    crate::catalog::seed_builtin_catalog(&pool).await.expect("Should seed catalog");
    let catalog = crate::catalog::load_catalog(&pool).await.expect("Should load catalog");

    // No history: every exercise with targets addresses some deficit
    let ranked = rank_for_window(&pool, &catalog, DEFAULT_WINDOW_DAYS, 5)
      .await
      .expect("Should rank");
    assert_eq!(ranked.len(), 5);
    assert!(ranked[0].score > 0.0);

    // Log heavy chest work; bench press should drop down or out
    seed_test_sets(&pool, 100, 20, 10, 100.0).await;
    let after = rank_for_window(&pool, &catalog, DEFAULT_WINDOW_DAYS, 50)
      .await
      .expect("Should re-rank");
    let bench_before = ranked.iter().position(|s| s.exercise_id == 100);
    let bench_after = after.iter().position(|s| s.exercise_id == 100);
    match (bench_before, bench_after) {
      (Some(b), Some(a)) => assert!(a >= b, "bench should not improve after chest volume"),
      (Some(_), None) => {} // fully covered and filtered out
      _ => {}
    }

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_suggest_for_window_empty_history_falls_back() {
    let pool = setup_test_db().await;
    crate::catalog::seed_builtin_catalog(&pool).await.expect("Should seed catalog");
    let catalog = crate::catalog::load_catalog(&pool).await.expect("Should load catalog");

    let suggestions = suggest_for_window(&pool, &catalog, DEFAULT_WINDOW_DAYS, 4)
      .await
      .expect("Should suggest");

    assert_eq!(suggestions.len(), 4);

    teardown_test_db(pool).await;
  }
}
