//! Muscle load and coverage engine
//!
//! Deterministic lower half of the recommendation engine: weekly per-muscle
//! volume targets, accumulated load from logged history, and the coverage
//! ratio between the two. Every function here is a pure transformation of
//! in-memory snapshots; callers re-run it when history changes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::catalog::CatalogIndex;
use crate::models::catalog::TargetRole;
use crate::models::history::{ExerciseAggregate, SetEntry};

/// ---------------------------------------------------------------------------
/// Engine Configuration (explicit values, no global state)
/// ---------------------------------------------------------------------------

pub const DEFAULT_PRIMARY_WEIGHT: f64 = 1.0;
pub const DEFAULT_SECONDARY_WEIGHT: f64 = 0.5;

/// Role weighting applied when converting exercise volume into muscle load.
/// Secondary involvement counts at half effective volume by default.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EngineWeights {
  pub primary: f64,
  pub secondary: f64,
}

impl Default for EngineWeights {
  fn default() -> Self {
    Self {
      primary: DEFAULT_PRIMARY_WEIGHT,
      secondary: DEFAULT_SECONDARY_WEIGHT,
    }
  }
}

impl EngineWeights {
  /// The one weighting function shared by the pre-aggregated and raw-history
  /// accumulation paths.
  pub fn role_factor(&self, role: TargetRole) -> f64 {
    match role {
      TargetRole::Primary => self.primary,
      TargetRole::Secondary => self.secondary,
    }
  }
}

/// Weekly volume budget (kg * reps) per muscle group.
///
/// A design constant table, not user-tunable; carried as an explicit value so
/// tests can substitute alternate budgets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetSettings {
  pub group_weekly_volume: HashMap<i64, f64>,
  /// Budget for groups absent from the table.
  pub fallback_weekly_volume: f64,
}

impl Default for TargetSettings {
  fn default() -> Self {
    // Keyed by the built-in catalog's group ids.
    let group_weekly_volume = HashMap::from([
      (1, 6000.0),  // Chest
      (2, 9000.0),  // Back
      (3, 6000.0),  // Shoulders
      (4, 5000.0),  // Arms
      (5, 12000.0), // Legs
      (6, 4000.0),  // Core
    ]);
    Self {
      group_weekly_volume,
      fallback_weekly_volume: 5000.0,
    }
  }
}

impl TargetSettings {
  pub fn group_budget(&self, group_id: i64) -> f64 {
    self
      .group_weekly_volume
      .get(&group_id)
      .copied()
      .unwrap_or(self.fallback_weekly_volume)
  }
}

/// ---------------------------------------------------------------------------
/// Weekly Targets
/// ---------------------------------------------------------------------------

/// Weekly training-volume target per canonical muscle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyTargets {
  pub targets: HashMap<i64, f64>,
}

impl WeeklyTargets {
  /// Derive targets by splitting each group's weekly budget evenly across
  /// the group's canonical muscles. Every canonical muscle in the catalog
  /// receives a target; a group with no canonical muscles contributes none
  /// (the divisor is floored at 1, so it never divides by zero either way).
  pub fn compute_default(catalog: &CatalogIndex, settings: &TargetSettings) -> Self {
    let mut by_group: HashMap<i64, Vec<i64>> = HashMap::new();
    for muscle in catalog.all_canonical_muscles() {
      by_group.entry(muscle.group_id).or_default().push(muscle.id);
    }

    let mut targets = HashMap::new();
    for group in catalog.groups() {
      let members = by_group.get(&group.id).map_or(&[][..], |v| v.as_slice());
      let per_muscle = settings.group_budget(group.id) / members.len().max(1) as f64;
      for &muscle_id in members {
        targets.insert(muscle_id, per_muscle);
      }
    }

    Self { targets }
  }

  pub fn get(&self, muscle_id: i64) -> Option<f64> {
    self.targets.get(&muscle_id).copied()
  }

  pub fn len(&self) -> usize {
    self.targets.len()
  }

  pub fn is_empty(&self) -> bool {
    self.targets.is_empty()
  }
}

/// ---------------------------------------------------------------------------
/// Muscle Load Aggregation (pre-aggregated path)
/// ---------------------------------------------------------------------------

/// Accumulated load per muscle id from pre-aggregated history rows.
///
/// Loads are keyed by the raw target muscle id; canonicalization happens in
/// the coverage path, not here. Unknown exercise ids contribute nothing.
pub fn compute_muscle_loads(
  catalog: &CatalogIndex,
  aggregates: &[ExerciseAggregate],
  weights: &EngineWeights,
) -> HashMap<i64, f64> {
  let mut loads: HashMap<i64, f64> = HashMap::new();

  for aggregate in aggregates {
    for target in catalog.targets_for(aggregate.exercise_id) {
      let delta = aggregate.total_volume * weights.role_factor(target.role) * target.weight;
      *loads.entry(target.muscle_id).or_insert(0.0) += delta;
    }
  }

  loads
}

/// ---------------------------------------------------------------------------
/// Coverage
/// ---------------------------------------------------------------------------

/// Ratio of accumulated volume to weekly target per canonical muscle.
/// 1.0 = target exactly met; unbounded above.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MuscleCoverage {
  pub ratios: HashMap<i64, f64>,
}

impl MuscleCoverage {
  /// Accumulate raw sets under canonical muscle ids and divide by the weekly
  /// target. The output domain is exactly the domain of `targets`; a target
  /// of zero (or less) counts as fully covered.
  pub fn compute(
    catalog: &CatalogIndex,
    history: &[SetEntry],
    targets: &WeeklyTargets,
    weights: &EngineWeights,
  ) -> Self {
    let mut accumulated: HashMap<i64, f64> = HashMap::new();

    for set in history {
      let volume = set.volume();
      for target in catalog.targets_for(set.exercise_id) {
        let add = volume * target.weight * weights.role_factor(target.role);
        *accumulated
          .entry(catalog.canonical_of(target.muscle_id))
          .or_insert(0.0) += add;
      }
    }

    let mut ratios = HashMap::with_capacity(targets.targets.len());
    for (&muscle_id, &target) in &targets.targets {
      let ratio = if target <= 0.0 {
        1.0
      } else {
        accumulated.get(&muscle_id).copied().unwrap_or(0.0) / target
      };
      ratios.insert(muscle_id, ratio);
    }

    Self { ratios }
  }

  pub fn ratio(&self, muscle_id: i64) -> Option<f64> {
    self.ratios.get(&muscle_id).copied()
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assert_approx_eq;
  use crate::test_utils::{mock_aggregate, mock_catalog, mock_set};

  #[test]
  fn test_default_targets_equal_split() {
    let catalog = CatalogIndex::builtin();
    let targets = WeeklyTargets::compute_default(&catalog, &TargetSettings::default());

    // Chest has one canonical muscle (pectorals) carrying the whole budget
    assert_approx_eq!(targets.get(10).unwrap(), 6000.0, 1e-9);
    // Back splits 9000 across lats, traps, spinal erectors
    assert_approx_eq!(targets.get(20).unwrap(), 3000.0, 1e-9);
    assert_approx_eq!(targets.get(21).unwrap(), 3000.0, 1e-9);
    assert_approx_eq!(targets.get(22).unwrap(), 3000.0, 1e-9);
    // Headed muscles get no target of their own
    assert!(targets.get(43).is_none());

    // Every canonical muscle received one
    assert_eq!(targets.len(), catalog.all_canonical_muscles().len());
  }

  #[test]
  fn test_default_targets_empty_group_is_safe() {
    use crate::models::catalog::MuscleGroup;

    // A group with no canonical muscles must not divide by zero
    let groups = vec![
      MuscleGroup { id: 1, name: "Arms".to_string() },
      MuscleGroup { id: 2, name: "Empty".to_string() },
    ];
    let muscles = vec![crate::models::catalog::Muscle {
      id: 1,
      group_id: 1,
      name: "Biceps".to_string(),
      parent_id: None,
    }];
    let catalog = CatalogIndex::new(groups, muscles, vec![]).unwrap();

    let targets = WeeklyTargets::compute_default(&catalog, &TargetSettings::default());
    assert_eq!(targets.len(), 1);
    assert!(targets.get(1).unwrap() >= 0.0);
  }

  #[test]
  fn test_muscle_loads_role_weighting() {
    let catalog = mock_catalog();
    let weights = EngineWeights::default();

    // E3 (id 102) targets the headed muscle 3 at weight 0.5 secondary
    let aggregates = vec![mock_aggregate(102, 200.0, 1)];
    let loads = compute_muscle_loads(&catalog, &aggregates, &weights);

    // 200 * 0.5 (secondary) * 0.5 (weight), keyed by the RAW muscle id
    assert_approx_eq!(loads.get(&3).copied().unwrap(), 50.0, 1e-9);
    assert!(loads.get(&2).is_none(), "loads must not be canonicalized");
  }

  #[test]
  fn test_muscle_loads_unknown_exercise_contributes_nothing() {
    let catalog = mock_catalog();
    let aggregates = vec![mock_aggregate(9999, 500.0, 1)];
    let loads = compute_muscle_loads(&catalog, &aggregates, &EngineWeights::default());
    assert!(loads.is_empty());
  }

  #[test]
  fn test_coverage_basic_scenario() {
    // Two canonical muscles A=1 (target 100) and B=2 (target 100);
    // one set of E1 (targets A, weight 1.0, primary) at 10 reps x 10 kg.
    let catalog = mock_catalog();
    let targets = WeeklyTargets {
      targets: HashMap::from([(1, 100.0), (2, 100.0)]),
    };
    let history = vec![mock_set(100, 10, 10.0)];

    let coverage = MuscleCoverage::compute(&catalog, &history, &targets, &EngineWeights::default());

    assert_approx_eq!(coverage.ratio(1).unwrap(), 1.0, 1e-9);
    assert_approx_eq!(coverage.ratio(2).unwrap(), 0.0, 1e-9);
  }

  #[test]
  fn test_coverage_canonicalizes_headed_muscles() {
    // E3 (id 102) targets muscle 3, a head whose parent is muscle 2
    let catalog = mock_catalog();
    let targets = WeeklyTargets {
      targets: HashMap::from([(2, 100.0)]),
    };
    let history = vec![mock_set(102, 10, 20.0)]; // volume 200

    let coverage = MuscleCoverage::compute(&catalog, &history, &targets, &EngineWeights::default());

    // 200 * 0.5 (weight) * 0.5 (secondary) = 50 on canonical muscle 2
    assert_approx_eq!(coverage.ratio(2).unwrap(), 0.5, 1e-9);
    // Output domain is exactly the targets' domain
    assert!(coverage.ratio(3).is_none());
  }

  #[test]
  fn test_coverage_zero_target_counts_as_covered() {
    let catalog = mock_catalog();
    let targets = WeeklyTargets {
      targets: HashMap::from([(1, 0.0), (2, 100.0)]),
    };

    let coverage = MuscleCoverage::compute(&catalog, &[], &targets, &EngineWeights::default());

    assert_approx_eq!(coverage.ratio(1).unwrap(), 1.0, 1e-9);
    assert_approx_eq!(coverage.ratio(2).unwrap(), 0.0, 1e-9);
  }

  #[test]
  fn test_coverage_monotonic_in_set_weight() {
    let catalog = mock_catalog();
    let targets = WeeklyTargets {
      targets: HashMap::from([(1, 100.0)]),
    };
    let weights = EngineWeights::default();

    let light = vec![mock_set(100, 10, 5.0)];
    let heavy = vec![mock_set(100, 10, 8.0)];

    let cov_light = MuscleCoverage::compute(&catalog, &light, &targets, &weights);
    let cov_heavy = MuscleCoverage::compute(&catalog, &heavy, &targets, &weights);

    assert!(cov_heavy.ratio(1).unwrap() > cov_light.ratio(1).unwrap());
  }

  #[test]
  fn test_round_trip_default_targets_zero_history() {
    let catalog = CatalogIndex::builtin();
    let targets = WeeklyTargets::compute_default(&catalog, &TargetSettings::default());

    let coverage = MuscleCoverage::compute(&catalog, &[], &targets, &EngineWeights::default());

    for (&muscle_id, &target) in &targets.targets {
      let ratio = coverage.ratio(muscle_id).unwrap();
      if target > 0.0 {
        assert_approx_eq!(ratio, 0.0, 1e-9);
      } else {
        assert_approx_eq!(ratio, 1.0, 1e-9);
      }
    }
  }

  #[test]
  fn test_both_paths_share_role_weighting() {
    // The same volume fed through the aggregate path and the raw-set path
    // must land identically on a canonical muscle with no heads involved.
    let catalog = mock_catalog();
    let weights = EngineWeights::default();

    let aggregates = vec![mock_aggregate(100, 300.0, 1)];
    let loads = compute_muscle_loads(&catalog, &aggregates, &weights);

    let targets = WeeklyTargets {
      targets: HashMap::from([(1, 300.0)]),
    };
    // 3 sets of 10 x 10kg = 300 volume
    let history = vec![
      mock_set(100, 10, 10.0),
      mock_set(100, 10, 10.0),
      mock_set(100, 10, 10.0),
    ];
    let coverage = MuscleCoverage::compute(&catalog, &history, &targets, &weights);

    assert_approx_eq!(loads.get(&1).copied().unwrap(), 300.0, 1e-9);
    assert_approx_eq!(coverage.ratio(1).unwrap(), 1.0, 1e-9);
  }
}
