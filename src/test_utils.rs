//! Test utilities and helpers for integration and unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Mock data factories
//! - Test fixtures
//! - Helper assertions

use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;

use crate::catalog::CatalogIndex;
use crate::models::catalog::{
  Exercise, ExerciseTarget, Muscle, MuscleGroup, MovementPattern, TargetRole,
};
use crate::models::history::{ExerciseAggregate, SetEntry};

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  // Run migrations
  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// Seed the database with logged sets for one exercise, spread over the last
/// week. Returns the IDs of created sets.
pub async fn seed_test_sets(
  pool: &SqlitePool,
  exercise_id: i64,
  count: usize,
  reps: i64,
  weight_kg: f64,
) -> Vec<i64> {
  let mut set_ids = Vec::new();

  for i in 0..count {
    let days_ago = (i % 7) as i64;
    let performed_at = Utc::now() - Duration::days(days_ago);

    let result = sqlx::query(
      r#"
      INSERT INTO logged_sets (exercise_id, reps, weight_kg, performed_at)
      VALUES (?1, ?2, ?3, ?4)
      "#,
    )
    .bind(exercise_id)
    .bind(reps)
    .bind(weight_kg)
    .bind(performed_at)
    .execute(pool)
    .await
    .expect("Failed to insert test set");

    set_ids.push(result.last_insert_rowid());
  }

  set_ids
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// A minimal catalog for engine tests: two canonical muscles (1, 2), one
/// headed muscle (3 -> parent 2), and four exercises:
/// - 100: targets muscle 1, weight 1.0, primary
/// - 101: targets muscle 2, weight 1.0, primary
/// - 102: targets muscle 3 (the head), weight 0.5, secondary
/// - 103: same targets as 100 (for tie-break and penalty tests)
pub fn mock_catalog() -> CatalogIndex {
  let groups = vec![MuscleGroup { id: 1, name: "Test".to_string() }];

  let muscles = vec![
    Muscle { id: 1, group_id: 1, name: "A".to_string(), parent_id: None },
    Muscle { id: 2, group_id: 1, name: "B".to_string(), parent_id: None },
    Muscle { id: 3, group_id: 1, name: "B Head".to_string(), parent_id: Some(2) },
  ];

  let exercise = |id: i64, name: &str, pattern: MovementPattern, targets: Vec<ExerciseTarget>| {
    Exercise {
      id,
      name: name.to_string(),
      pattern,
      rep_ranges: std::collections::HashMap::new(),
      contraindications: vec![],
      targets,
    }
  };

  let exercises = vec![
    exercise(
      100,
      "E1",
      MovementPattern::Press,
      vec![ExerciseTarget { muscle_id: 1, weight: 1.0, role: TargetRole::Primary }],
    ),
    exercise(
      101,
      "E2",
      MovementPattern::Pull,
      vec![ExerciseTarget { muscle_id: 2, weight: 1.0, role: TargetRole::Primary }],
    ),
    exercise(
      102,
      "E3",
      MovementPattern::Extension,
      vec![ExerciseTarget { muscle_id: 3, weight: 0.5, role: TargetRole::Secondary }],
    ),
    exercise(
      103,
      "E4",
      MovementPattern::Press,
      vec![ExerciseTarget { muscle_id: 1, weight: 1.0, role: TargetRole::Primary }],
    ),
  ];

  CatalogIndex::new(groups, muscles, exercises).expect("mock catalog is valid")
}

/// Create a raw history entry for the coverage path
pub fn mock_set(exercise_id: i64, reps: i64, weight_kg: f64) -> SetEntry {
  SetEntry { exercise_id, reps, weight_kg }
}

/// Create a pre-aggregated history row for the load/suggestion path
pub fn mock_aggregate(exercise_id: i64, total_volume: f64, days_ago: i64) -> ExerciseAggregate {
  ExerciseAggregate {
    exercise_id,
    total_sets: 3,
    total_reps: 30,
    total_volume,
    last_performed_at: datetime_days_ago(days_ago),
  }
}

/// ---------------------------------------------------------------------------
/// Time Helpers
/// ---------------------------------------------------------------------------

/// Create a DateTime N days ago from now
pub fn datetime_days_ago(days: i64) -> DateTime<Utc> {
  Utc::now() - Duration::days(days)
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------
