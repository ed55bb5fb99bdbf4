//! Exercise scoring and ranking
//!
//! Upper half of the recommendation engine. Two independent ranking paths
//! back two different screens:
//! - deficit-based: rank by how much each exercise closes the gap between
//!   accumulated load and the weekly targets (`rank_exercises`)
//! - need/focus-based: "what to train next" from per-muscle load alone,
//!   with a repetition penalty for recently performed exercises
//!   (`suggest_exercises`)
//!
//! They overlap but are deliberately kept separate operations.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::catalog::CatalogIndex;
use crate::coverage::{compute_muscle_loads, EngineWeights, MuscleCoverage, WeeklyTargets};
use crate::models::history::{ExerciseAggregate, SetEntry};

/// ---------------------------------------------------------------------------
/// Scoring Constants
/// ---------------------------------------------------------------------------

/// How many of the least-loaded muscles count as the current focus set.
pub const FOCUS_MUSCLE_COUNT: usize = 4;

/// Score multiplier for targets outside the focus set.
pub const OFF_FOCUS_FACTOR: f64 = 0.6;

/// Flat penalty for exercises already present in the recent history window.
pub const REPEAT_PENALTY: f64 = 0.7;

/// ---------------------------------------------------------------------------
/// Deficit-Based Scoring
/// ---------------------------------------------------------------------------

/// Score plus the per-muscle deficits the exercise addresses (the deficits
/// map is for UI explanation; ranking uses only the score).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseScore {
  pub exercise_id: i64,
  pub name: String,
  pub score: f64,
  /// Canonical muscle id -> deficit in [0, 1] this exercise addresses.
  /// Last write wins when two targets resolve to the same canonical muscle.
  pub deficits: HashMap<i64, f64>,
}

/// Score one exercise against a coverage snapshot.
///
/// Muscles absent from the coverage map count as fully covered, so an
/// exercise touching only unknown or satisfied muscles scores 0. Unknown
/// exercise ids score 0 with empty deficits rather than failing.
pub fn score_exercise(
  catalog: &CatalogIndex,
  exercise_id: i64,
  coverage: &MuscleCoverage,
  weights: &EngineWeights,
) -> ExerciseScore {
  let name = catalog
    .exercise_by_id(exercise_id)
    .map(|e| e.name.clone())
    .unwrap_or_default();

  let mut total = 0.0;
  let mut deficits: HashMap<i64, f64> = HashMap::new();

  for target in catalog.targets_for(exercise_id) {
    let canonical = catalog.canonical_of(target.muscle_id);
    let cov = coverage.ratio(canonical).unwrap_or(1.0);
    let deficit = (1.0 - cov).max(0.0);
    if deficit > 0.0 {
      total += deficit * target.weight * weights.role_factor(target.role);
      deficits.insert(canonical, deficit);
    }
  }

  ExerciseScore {
    exercise_id,
    name,
    score: total,
    deficits,
  }
}

/// Rank every catalog exercise by deficit score.
///
/// Fully covered or irrelevant exercises (score 0) are excluded, not sorted
/// last. Ties break by ascending exercise id so the output is deterministic.
pub fn rank_exercises(
  catalog: &CatalogIndex,
  history: &[SetEntry],
  targets: &WeeklyTargets,
  weights: &EngineWeights,
  top_n: usize,
) -> Vec<ExerciseScore> {
  let coverage = MuscleCoverage::compute(catalog, history, targets, weights);

  let mut scored: Vec<ExerciseScore> = catalog
    .all_exercises()
    .iter()
    .map(|e| score_exercise(catalog, e.id, &coverage, weights))
    .filter(|s| s.score > 0.0)
    .collect();

  scored.sort_by(|a, b| {
    b.score
      .total_cmp(&a.score)
      .then(a.exercise_id.cmp(&b.exercise_id))
  });
  scored.truncate(top_n);
  scored
}

/// ---------------------------------------------------------------------------
/// Need/Focus-Based Suggestions
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseSuggestion {
  pub exercise_id: i64,
  pub name: String,
  pub score: f64,
}

/// Suggest what to train next from recent aggregates alone.
///
/// Loads stay keyed by raw muscle ids (no canonicalization on this path).
/// The least-loaded muscles of the window form the focus set; targets whose
/// muscle carries no load yet contribute nothing, so an empty window produces
/// an empty score list and falls back to one exercise per movement pattern.
pub fn suggest_exercises(
  catalog: &CatalogIndex,
  aggregates: &[ExerciseAggregate],
  weights: &EngineWeights,
  k: usize,
) -> Vec<ExerciseSuggestion> {
  let loads = compute_muscle_loads(catalog, aggregates, weights);
  let focus = focus_muscles(&loads);
  let recent: HashSet<i64> = aggregates.iter().map(|a| a.exercise_id).collect();

  let mut scored: Vec<ExerciseSuggestion> = Vec::new();
  for exercise in catalog.all_exercises() {
    let mut score = 0.0;
    for target in &exercise.targets {
      let load = match loads.get(&target.muscle_id) {
        Some(&load) => load,
        None => continue,
      };
      let focus_bonus = if focus.contains(&target.muscle_id) {
        1.0
      } else {
        OFF_FOCUS_FACTOR
      };
      score += (1.0 / (1.0 + load))
        * weights.role_factor(target.role)
        * focus_bonus
        * target.weight;
    }

    if recent.contains(&exercise.id) {
      score *= REPEAT_PENALTY;
    }

    if score > 0.0 {
      scored.push(ExerciseSuggestion {
        exercise_id: exercise.id,
        name: exercise.name.clone(),
        score,
      });
    }
  }

  scored.sort_by(|a, b| {
    b.score
      .total_cmp(&a.score)
      .then(a.exercise_id.cmp(&b.exercise_id))
  });

  // Distinct ids in descending-score order
  let mut seen: HashSet<i64> = HashSet::new();
  let mut suggestions: Vec<ExerciseSuggestion> = scored
    .into_iter()
    .filter(|s| seen.insert(s.exercise_id))
    .take(k)
    .collect();

  if suggestions.is_empty() {
    suggestions = pattern_fallback(catalog, k);
  }

  suggestions
}

/// The `FOCUS_MUSCLE_COUNT` least-loaded muscle ids of the window, ties
/// broken by ascending muscle id.
fn focus_muscles(loads: &HashMap<i64, f64>) -> HashSet<i64> {
  let mut by_load: Vec<(i64, f64)> = loads.iter().map(|(&id, &load)| (id, load)).collect();
  by_load.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
  by_load
    .into_iter()
    .take(FOCUS_MUSCLE_COUNT)
    .map(|(id, _)| id)
    .collect()
}

/// With no usable history: one exercise per distinct movement pattern, in
/// catalog order, up to `k`.
fn pattern_fallback(catalog: &CatalogIndex, k: usize) -> Vec<ExerciseSuggestion> {
  let mut seen_patterns = HashSet::new();
  catalog
    .all_exercises()
    .iter()
    .filter(|e| seen_patterns.insert(e.pattern))
    .take(k)
    .map(|e| ExerciseSuggestion {
      exercise_id: e.id,
      name: e.name.clone(),
      score: 0.0,
    })
    .collect()
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
