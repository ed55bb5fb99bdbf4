use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One completed set as stored in the log.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LoggedSet {
  pub id: i64,
  pub exercise_id: i64,
  pub reps: i64,
  pub weight_kg: f64,
  pub performed_at: DateTime<Utc>,
  pub created_at: Option<DateTime<Utc>>,
}

/// For inserting new sets (without id, created_at)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLoggedSet {
  pub exercise_id: i64,
  pub reps: i64,
  pub weight_kg: f64,
  pub performed_at: DateTime<Utc>,
}

/// The minimal (exercise, reps, weight) triple the coverage calculator
/// consumes. Volume for one set is reps * weight_kg.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SetEntry {
  pub exercise_id: i64,
  pub reps: i64,
  pub weight_kg: f64,
}

impl SetEntry {
  pub fn volume(&self) -> f64 {
    self.reps as f64 * self.weight_kg
  }
}

impl From<&LoggedSet> for SetEntry {
  fn from(set: &LoggedSet) -> Self {
    Self {
      exercise_id: set.exercise_id,
      reps: set.reps,
      weight_kg: set.weight_kg,
    }
  }
}

/// Pre-summarized training evidence for one exercise over a time window.
/// Individual set detail is deliberately discarded.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ExerciseAggregate {
  pub exercise_id: i64,
  pub total_sets: i64,
  pub total_reps: i64,
  /// Sum of reps * weight_kg across the window.
  pub total_volume: f64,
  pub last_performed_at: DateTime<Utc>,
}
