//! Exercise/muscle catalog index
//!
//! Read-only reference data the recommendation engine runs against. The index
//! is built once (from the built-in dataset or the database), validated, and
//! then answers per-target lookups in the engine's hot loops with plain hash
//! lookups.

use sqlx::SqlitePool;
use std::collections::HashMap;

use crate::models::catalog::{
  Exercise, ExerciseTarget, Muscle, MuscleGroup, MovementPattern, RepRange, TargetRole,
  TrainingGoal,
};

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
  #[error("Duplicate muscle id: {0}")]
  DuplicateMuscle(i64),

  #[error("Duplicate exercise id: {0}")]
  DuplicateExercise(i64),

  #[error("Muscle {muscle} references unknown group {group}")]
  UnknownGroup { muscle: i64, group: i64 },

  #[error("Muscle {muscle} references unknown parent {parent}")]
  UnknownParent { muscle: i64, parent: i64 },

  #[error("Muscle {0} has a parent chain deeper than one level")]
  NestedParent(i64),

  #[error("Exercise {exercise} targets unknown muscle {muscle}")]
  UnknownTargetMuscle { exercise: i64, muscle: i64 },

  #[error("Exercise {exercise} has target weight {weight} outside (0, 1]")]
  TargetWeightOutOfRange { exercise: i64, weight: f64 },

  #[error("Corrupt catalog row: {0}")]
  Parse(String),

  #[error("Database error: {0}")]
  Database(String),
}

impl serde::Serialize for CatalogError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Catalog Index
/// ---------------------------------------------------------------------------

const NO_TARGETS: &[ExerciseTarget] = &[];

/// Immutable index over the catalog. All lookups are O(1).
#[derive(Debug, Clone)]
pub struct CatalogIndex {
  groups: Vec<MuscleGroup>,
  muscles: HashMap<i64, Muscle>,
  /// Precomputed muscle id -> canonical muscle id (single-level resolution).
  canonical: HashMap<i64, i64>,
  /// Exercises in catalog order.
  exercises: Vec<Exercise>,
  exercise_index: HashMap<i64, usize>,
}

impl CatalogIndex {
  /// Build and validate an index.
  ///
  /// Parent chains deeper than one level, dangling ids, and target weights
  /// outside (0, 1] are rejected here so the engine never has to defend
  /// against them.
  pub fn new(
    groups: Vec<MuscleGroup>,
    muscles: Vec<Muscle>,
    exercises: Vec<Exercise>,
  ) -> Result<Self, CatalogError> {
    let group_ids: HashMap<i64, ()> = groups.iter().map(|g| (g.id, ())).collect();

    let mut muscle_map: HashMap<i64, Muscle> = HashMap::with_capacity(muscles.len());
    for muscle in muscles {
      if !group_ids.contains_key(&muscle.group_id) {
        return Err(CatalogError::UnknownGroup {
          muscle: muscle.id,
          group: muscle.group_id,
        });
      }
      let muscle_id = muscle.id;
      if muscle_map.insert(muscle_id, muscle).is_some() {
        return Err(CatalogError::DuplicateMuscle(muscle_id));
      }
    }

    // Single-level parent invariant: a parent must exist and must itself be
    // canonical.
    let mut canonical: HashMap<i64, i64> = HashMap::with_capacity(muscle_map.len());
    for muscle in muscle_map.values() {
      match muscle.parent_id {
        None => {
          canonical.insert(muscle.id, muscle.id);
        }
        Some(parent_id) => {
          let parent = muscle_map.get(&parent_id).ok_or(CatalogError::UnknownParent {
            muscle: muscle.id,
            parent: parent_id,
          })?;
          if parent.parent_id.is_some() {
            return Err(CatalogError::NestedParent(muscle.id));
          }
          canonical.insert(muscle.id, parent_id);
        }
      }
    }

    let mut exercise_index: HashMap<i64, usize> = HashMap::with_capacity(exercises.len());
    for (idx, exercise) in exercises.iter().enumerate() {
      if exercise_index.insert(exercise.id, idx).is_some() {
        return Err(CatalogError::DuplicateExercise(exercise.id));
      }
      for target in &exercise.targets {
        if !muscle_map.contains_key(&target.muscle_id) {
          return Err(CatalogError::UnknownTargetMuscle {
            exercise: exercise.id,
            muscle: target.muscle_id,
          });
        }
        if target.weight <= 0.0 || target.weight > 1.0 {
          return Err(CatalogError::TargetWeightOutOfRange {
            exercise: exercise.id,
            weight: target.weight,
          });
        }
      }
    }

    Ok(Self {
      groups,
      muscles: muscle_map,
      canonical,
      exercises,
      exercise_index,
    })
  }

  /// Index over the built-in catalog.
  pub fn builtin() -> Self {
    let (groups, muscles, exercises) = builtin_catalog();
    Self::new(groups, muscles, exercises).expect("built-in catalog is valid")
  }

  pub fn groups(&self) -> &[MuscleGroup] {
    &self.groups
  }

  pub fn muscle_by_id(&self, muscle_id: i64) -> Option<&Muscle> {
    self.muscles.get(&muscle_id)
  }

  /// Resolve a muscle to its canonical muscle: the parent id if present,
  /// else the muscle id itself. Unknown ids pass through unchanged.
  pub fn canonical_of(&self, muscle_id: i64) -> i64 {
    self.canonical.get(&muscle_id).copied().unwrap_or(muscle_id)
  }

  /// Targets for an exercise; empty for unknown ids, never an error.
  pub fn targets_for(&self, exercise_id: i64) -> &[ExerciseTarget] {
    self
      .exercise_index
      .get(&exercise_id)
      .map_or(NO_TARGETS, |&idx| self.exercises[idx].targets.as_slice())
  }

  pub fn exercise_by_id(&self, exercise_id: i64) -> Option<&Exercise> {
    self.exercise_index.get(&exercise_id).map(|&idx| &self.exercises[idx])
  }

  /// All exercises in catalog order.
  pub fn all_exercises(&self) -> &[Exercise] {
    &self.exercises
  }

  /// Muscles with no parent, ordered by id.
  pub fn all_canonical_muscles(&self) -> Vec<&Muscle> {
    let mut canonical: Vec<&Muscle> =
      self.muscles.values().filter(|m| m.is_canonical()).collect();
    canonical.sort_by_key(|m| m.id);
    canonical
  }
}

/// ---------------------------------------------------------------------------
/// Built-in Catalog Data
/// ---------------------------------------------------------------------------

fn target(muscle_id: i64, weight: f64, role: TargetRole) -> ExerciseTarget {
  ExerciseTarget {
    muscle_id,
    weight,
    role,
  }
}

fn rep_ranges(
  hypertrophy: (u32, u32),
  strength: (u32, u32),
  endurance: (u32, u32),
) -> HashMap<TrainingGoal, RepRange> {
  let mut map = HashMap::new();
  map.insert(
    TrainingGoal::Hypertrophy,
    RepRange { min: hypertrophy.0, max: hypertrophy.1 },
  );
  map.insert(
    TrainingGoal::Strength,
    RepRange { min: strength.0, max: strength.1 },
  );
  map.insert(
    TrainingGoal::Endurance,
    RepRange { min: endurance.0, max: endurance.1 },
  );
  map
}

/// The default exercise/muscle reference dataset.
///
/// Muscle ids are grouped by decade (10s chest, 20s back, 30s shoulders,
/// 40s arms, 50s legs, 60s core); exercise ids start at 100.
pub fn builtin_catalog() -> (Vec<MuscleGroup>, Vec<Muscle>, Vec<Exercise>) {
  use MovementPattern::*;
  use TargetRole::{Primary, Secondary};

  let groups = vec![
    MuscleGroup { id: 1, name: "Chest".to_string() },
    MuscleGroup { id: 2, name: "Back".to_string() },
    MuscleGroup { id: 3, name: "Shoulders".to_string() },
    MuscleGroup { id: 4, name: "Arms".to_string() },
    MuscleGroup { id: 5, name: "Legs".to_string() },
    MuscleGroup { id: 6, name: "Core".to_string() },
  ];

  let muscle = |id: i64, group_id: i64, name: &str, parent_id: Option<i64>| Muscle {
    id,
    group_id,
    name: name.to_string(),
    parent_id,
  };

  let muscles = vec![
    muscle(10, 1, "Pectorals", None),
    muscle(20, 2, "Lats", None),
    muscle(21, 2, "Traps", None),
    muscle(22, 2, "Spinal Erectors", None),
    muscle(30, 3, "Deltoids", None),
    muscle(31, 3, "Anterior Deltoid", Some(30)),
    muscle(32, 3, "Lateral Deltoid", Some(30)),
    muscle(33, 3, "Posterior Deltoid", Some(30)),
    muscle(40, 4, "Biceps", None),
    muscle(41, 4, "Triceps", None),
    muscle(42, 4, "Forearms", None),
    muscle(43, 4, "Triceps Long Head", Some(41)),
    muscle(44, 4, "Triceps Lateral Head", Some(41)),
    muscle(50, 5, "Quadriceps", None),
    muscle(51, 5, "Hamstrings", None),
    muscle(52, 5, "Glutes", None),
    muscle(53, 5, "Calves", None),
    muscle(60, 6, "Abdominals", None),
    muscle(61, 6, "Obliques", None),
  ];

  let exercise = |id: i64,
                  name: &str,
                  pattern: MovementPattern,
                  ranges: HashMap<TrainingGoal, RepRange>,
                  contraindications: &[&str],
                  targets: Vec<ExerciseTarget>| Exercise {
    id,
    name: name.to_string(),
    pattern,
    rep_ranges: ranges,
    contraindications: contraindications.iter().map(|s| s.to_string()).collect(),
    targets,
  };

  let exercises = vec![
    exercise(
      100,
      "Barbell Bench Press",
      Press,
      rep_ranges((8, 12), (3, 6), (15, 20)),
      &["shoulder_impingement"],
      vec![
        target(10, 0.8, Primary),
        target(31, 0.4, Secondary),
        target(44, 0.3, Secondary),
      ],
    ),
    exercise(
      101,
      "Incline Dumbbell Press",
      Press,
      rep_ranges((8, 12), (4, 6), (15, 20)),
      &["shoulder_impingement"],
      vec![
        target(10, 0.7, Primary),
        target(31, 0.3, Primary),
        target(44, 0.3, Secondary),
      ],
    ),
    exercise(
      102,
      "Overhead Press",
      Press,
      rep_ranges((8, 12), (3, 6), (12, 15)),
      &["shoulder_impingement", "lower_back"],
      vec![
        target(31, 0.6, Primary),
        target(32, 0.4, Primary),
        target(43, 0.4, Secondary),
        target(21, 0.2, Secondary),
      ],
    ),
    exercise(
      103,
      "Push-Up",
      Press,
      rep_ranges((10, 20), (6, 10), (20, 30)),
      &[],
      vec![
        target(10, 0.7, Primary),
        target(44, 0.3, Secondary),
        target(60, 0.2, Secondary),
      ],
    ),
    exercise(
      110,
      "Pull-Up",
      Pull,
      rep_ranges((6, 12), (3, 6), (12, 20)),
      &["shoulder_impingement"],
      vec![
        target(20, 0.8, Primary),
        target(40, 0.4, Secondary),
        target(21, 0.2, Secondary),
      ],
    ),
    exercise(
      111,
      "Barbell Row",
      Pull,
      rep_ranges((8, 12), (4, 6), (15, 20)),
      &["lower_back"],
      vec![
        target(20, 0.6, Primary),
        target(21, 0.4, Primary),
        target(40, 0.3, Secondary),
        target(22, 0.2, Secondary),
      ],
    ),
    exercise(
      112,
      "Lat Pulldown",
      Pull,
      rep_ranges((8, 12), (5, 8), (15, 20)),
      &[],
      vec![target(20, 0.8, Primary), target(40, 0.3, Secondary)],
    ),
    exercise(
      113,
      "Face Pull",
      Pull,
      rep_ranges((12, 15), (8, 12), (15, 25)),
      &[],
      vec![target(33, 0.6, Primary), target(21, 0.4, Secondary)],
    ),
    exercise(
      120,
      "Back Squat",
      Squat,
      rep_ranges((6, 10), (3, 5), (12, 20)),
      &["knee", "lower_back"],
      vec![
        target(50, 0.7, Primary),
        target(52, 0.3, Primary),
        target(51, 0.2, Secondary),
        target(22, 0.2, Secondary),
      ],
    ),
    exercise(
      121,
      "Front Squat",
      Squat,
      rep_ranges((6, 10), (3, 5), (10, 15)),
      &["knee"],
      vec![
        target(50, 0.8, Primary),
        target(52, 0.3, Secondary),
        target(60, 0.3, Secondary),
      ],
    ),
    exercise(
      122,
      "Romanian Deadlift",
      Hinge,
      rep_ranges((8, 12), (4, 6), (12, 15)),
      &["lower_back"],
      vec![
        target(51, 0.6, Primary),
        target(52, 0.4, Primary),
        target(22, 0.3, Secondary),
      ],
    ),
    exercise(
      123,
      "Conventional Deadlift",
      Hinge,
      rep_ranges((5, 8), (2, 5), (10, 12)),
      &["lower_back"],
      vec![
        target(51, 0.5, Primary),
        target(52, 0.4, Primary),
        target(22, 0.4, Secondary),
        target(21, 0.2, Secondary),
        target(42, 0.2, Secondary),
      ],
    ),
    exercise(
      124,
      "Walking Lunge",
      Lunge,
      rep_ranges((10, 14), (6, 8), (16, 24)),
      &["knee"],
      vec![
        target(50, 0.6, Primary),
        target(52, 0.4, Primary),
        target(51, 0.2, Secondary),
      ],
    ),
    exercise(
      125,
      "Standing Calf Raise",
      Raise,
      rep_ranges((10, 15), (6, 10), (20, 30)),
      &[],
      vec![target(53, 1.0, Primary)],
    ),
    exercise(
      130,
      "Barbell Curl",
      Curl,
      rep_ranges((8, 12), (5, 8), (15, 20)),
      &[],
      vec![target(40, 1.0, Primary), target(42, 0.3, Secondary)],
    ),
    exercise(
      131,
      "Hammer Curl",
      Curl,
      rep_ranges((8, 12), (6, 8), (15, 20)),
      &[],
      vec![target(40, 0.7, Primary), target(42, 0.3, Primary)],
    ),
    exercise(
      132,
      "Cable Triceps Pushdown",
      Extension,
      rep_ranges((10, 15), (6, 10), (15, 25)),
      &[],
      vec![target(44, 0.6, Primary), target(43, 0.4, Primary)],
    ),
    exercise(
      133,
      "Overhead Triceps Extension",
      Extension,
      rep_ranges((10, 12), (6, 10), (15, 20)),
      &["elbow"],
      vec![target(43, 0.8, Primary), target(44, 0.2, Secondary)],
    ),
    exercise(
      134,
      "Lateral Raise",
      Raise,
      rep_ranges((12, 15), (8, 12), (15, 25)),
      &[],
      vec![target(32, 1.0, Primary)],
    ),
    exercise(
      140,
      "Plank",
      Core,
      rep_ranges((1, 3), (1, 3), (3, 5)),
      &[],
      vec![target(60, 0.8, Primary), target(61, 0.4, Secondary)],
    ),
    exercise(
      141,
      "Hanging Leg Raise",
      Core,
      rep_ranges((8, 12), (6, 10), (12, 20)),
      &[],
      vec![
        target(60, 0.8, Primary),
        target(61, 0.3, Secondary),
        target(42, 0.2, Secondary),
      ],
    ),
    exercise(
      142,
      "Farmer's Carry",
      Carry,
      rep_ranges((1, 3), (1, 3), (3, 6)),
      &[],
      vec![
        target(42, 0.6, Primary),
        target(21, 0.4, Primary),
        target(60, 0.3, Secondary),
      ],
    ),
  ];

  (groups, muscles, exercises)
}

/// ---------------------------------------------------------------------------
/// Database Operations
/// ---------------------------------------------------------------------------

/// Load the catalog from the database and build a validated index.
pub async fn load_catalog(pool: &SqlitePool) -> Result<CatalogIndex, CatalogError> {
  let groups: Vec<MuscleGroup> =
    sqlx::query_as("SELECT id, name FROM muscle_groups ORDER BY id")
      .fetch_all(pool)
      .await
      .map_err(|e| CatalogError::Database(format!("Failed to load muscle groups: {}", e)))?;

  let muscles: Vec<Muscle> =
    sqlx::query_as("SELECT id, group_id, name, parent_id FROM muscles ORDER BY id")
      .fetch_all(pool)
      .await
      .map_err(|e| CatalogError::Database(format!("Failed to load muscles: {}", e)))?;

  let exercise_rows: Vec<(i64, String, String, String, String)> = sqlx::query_as(
    r#"
    SELECT id, name, pattern, rep_ranges_json, contraindications_json
    FROM exercises
    ORDER BY id
    "#,
  )
  .fetch_all(pool)
  .await
  .map_err(|e| CatalogError::Database(format!("Failed to load exercises: {}", e)))?;

  let target_rows: Vec<(i64, i64, f64, String)> = sqlx::query_as(
    r#"
    SELECT exercise_id, muscle_id, weight, role
    FROM exercise_targets
    ORDER BY exercise_id, position
    "#,
  )
  .fetch_all(pool)
  .await
  .map_err(|e| CatalogError::Database(format!("Failed to load exercise targets: {}", e)))?;

  let mut targets_by_exercise: HashMap<i64, Vec<ExerciseTarget>> = HashMap::new();
  for (exercise_id, muscle_id, weight, role) in target_rows {
    let role: TargetRole = role.parse().map_err(CatalogError::Parse)?;
    targets_by_exercise
      .entry(exercise_id)
      .or_default()
      .push(ExerciseTarget { muscle_id, weight, role });
  }

  let mut exercises = Vec::with_capacity(exercise_rows.len());
  for (id, name, pattern, rep_ranges_json, contraindications_json) in exercise_rows {
    let pattern: MovementPattern = pattern.parse().map_err(CatalogError::Parse)?;
    let rep_ranges: HashMap<TrainingGoal, RepRange> = serde_json::from_str(&rep_ranges_json)
      .map_err(|e| CatalogError::Parse(format!("rep ranges for exercise {}: {}", id, e)))?;
    let contraindications: Vec<String> = serde_json::from_str(&contraindications_json)
      .map_err(|e| CatalogError::Parse(format!("contraindications for exercise {}: {}", id, e)))?;

    exercises.push(Exercise {
      id,
      name,
      pattern,
      rep_ranges,
      contraindications,
      targets: targets_by_exercise.remove(&id).unwrap_or_default(),
    });
  }

  CatalogIndex::new(groups, muscles, exercises)
}

/// Insert the built-in catalog if the exercise table is empty.
/// Returns the number of exercises inserted (0 when already seeded).
pub async fn seed_builtin_catalog(pool: &SqlitePool) -> Result<usize, CatalogError> {
  let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM exercises")
    .fetch_one(pool)
    .await
    .map_err(|e| CatalogError::Database(format!("Failed to count exercises: {}", e)))?;

  if existing > 0 {
    return Ok(0);
  }

  let (groups, muscles, exercises) = builtin_catalog();

  for group in &groups {
    sqlx::query("INSERT INTO muscle_groups (id, name) VALUES (?1, ?2)")
      .bind(group.id)
      .bind(&group.name)
      .execute(pool)
      .await
      .map_err(|e| CatalogError::Database(format!("Failed to seed muscle group: {}", e)))?;
  }

  for muscle in &muscles {
    sqlx::query("INSERT INTO muscles (id, group_id, name, parent_id) VALUES (?1, ?2, ?3, ?4)")
      .bind(muscle.id)
      .bind(muscle.group_id)
      .bind(&muscle.name)
      .bind(muscle.parent_id)
      .execute(pool)
      .await
      .map_err(|e| CatalogError::Database(format!("Failed to seed muscle: {}", e)))?;
  }

  for ex in &exercises {
    let rep_ranges_json = serde_json::to_string(&ex.rep_ranges)
      .map_err(|e| CatalogError::Parse(e.to_string()))?;
    let contraindications_json = serde_json::to_string(&ex.contraindications)
      .map_err(|e| CatalogError::Parse(e.to_string()))?;

    sqlx::query(
      r#"
      INSERT INTO exercises (id, name, pattern, rep_ranges_json, contraindications_json)
      VALUES (?1, ?2, ?3, ?4, ?5)
      "#,
    )
    .bind(ex.id)
    .bind(&ex.name)
    .bind(ex.pattern.to_string())
    .bind(&rep_ranges_json)
    .bind(&contraindications_json)
    .execute(pool)
    .await
    .map_err(|e| CatalogError::Database(format!("Failed to seed exercise: {}", e)))?;

    for (position, target) in ex.targets.iter().enumerate() {
      sqlx::query(
        r#"
        INSERT INTO exercise_targets (exercise_id, position, muscle_id, weight, role)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
      )
      .bind(ex.id)
      .bind(position as i64)
      .bind(target.muscle_id)
      .bind(target.weight)
      .bind(target.role.to_string())
      .execute(pool)
      .await
      .map_err(|e| CatalogError::Database(format!("Failed to seed exercise target: {}", e)))?;
    }
  }

  Ok(exercises.len())
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  fn group(id: i64, name: &str) -> MuscleGroup {
    MuscleGroup { id, name: name.to_string() }
  }

  fn muscle(id: i64, group_id: i64, name: &str, parent_id: Option<i64>) -> Muscle {
    Muscle { id, group_id, name: name.to_string(), parent_id }
  }

  #[test]
  fn test_builtin_catalog_validates() {
    let index = CatalogIndex::builtin();

    assert_eq!(index.groups().len(), 6);
    assert!(!index.all_exercises().is_empty());

    // Every canonical muscle really has no parent
    for m in index.all_canonical_muscles() {
      assert!(m.parent_id.is_none());
    }
  }

  #[test]
  fn test_canonical_of_single_level() {
    let index = CatalogIndex::builtin();

    // Triceps long head rolls up to triceps
    assert_eq!(index.canonical_of(43), 41);
    // Canonical muscles resolve to themselves
    assert_eq!(index.canonical_of(41), 41);
    // Unknown ids pass through
    assert_eq!(index.canonical_of(9999), 9999);
  }

  #[test]
  fn test_targets_for_unknown_exercise_is_empty() {
    let index = CatalogIndex::builtin();
    assert!(index.targets_for(9999).is_empty());
  }

  #[test]
  fn test_nested_parent_rejected() {
    let groups = vec![group(1, "Arms")];
    let muscles = vec![
      muscle(1, 1, "Triceps", None),
      muscle(2, 1, "Long Head", Some(1)),
      muscle(3, 1, "Deep Fibers", Some(2)), // two levels deep
    ];

    let result = CatalogIndex::new(groups, muscles, vec![]);
    assert!(matches!(result, Err(CatalogError::NestedParent(3))));
  }

  #[test]
  fn test_unknown_parent_rejected() {
    let groups = vec![group(1, "Arms")];
    let muscles = vec![muscle(2, 1, "Long Head", Some(99))];

    let result = CatalogIndex::new(groups, muscles, vec![]);
    assert!(matches!(
      result,
      Err(CatalogError::UnknownParent { muscle: 2, parent: 99 })
    ));
  }

  #[test]
  fn test_target_weight_out_of_range_rejected() {
    let groups = vec![group(1, "Arms")];
    let muscles = vec![muscle(1, 1, "Biceps", None)];
    let exercises = vec![Exercise {
      id: 100,
      name: "Curl".to_string(),
      pattern: MovementPattern::Curl,
      rep_ranges: HashMap::new(),
      contraindications: vec![],
      targets: vec![ExerciseTarget {
        muscle_id: 1,
        weight: 1.5,
        role: TargetRole::Primary,
      }],
    }];

    let result = CatalogIndex::new(groups, muscles, exercises);
    assert!(matches!(
      result,
      Err(CatalogError::TargetWeightOutOfRange { exercise: 100, .. })
    ));
  }

  #[test]
  fn test_unknown_target_muscle_rejected() {
    let groups = vec![group(1, "Arms")];
    let muscles = vec![muscle(1, 1, "Biceps", None)];
    let exercises = vec![Exercise {
      id: 100,
      name: "Curl".to_string(),
      pattern: MovementPattern::Curl,
      rep_ranges: HashMap::new(),
      contraindications: vec![],
      targets: vec![ExerciseTarget {
        muscle_id: 77,
        weight: 1.0,
        role: TargetRole::Primary,
      }],
    }];

    let result = CatalogIndex::new(groups, muscles, exercises);
    assert!(matches!(
      result,
      Err(CatalogError::UnknownTargetMuscle { exercise: 100, muscle: 77 })
    ));
  }

  #[tokio::test]
  async fn test_seed_and_load_roundtrip() {
    // Arrange
    let pool = crate::test_utils::setup_test_db().await;

    // Act: seed, then load
    let inserted = seed_builtin_catalog(&pool).await.expect("Should seed catalog");
    let index = load_catalog(&pool).await.expect("Should load catalog");

    // Assert: loaded index matches the built-in dataset
    let builtin = CatalogIndex::builtin();
    assert_eq!(inserted, builtin.all_exercises().len());
    assert_eq!(index.groups().len(), builtin.groups().len());
    assert_eq!(
      index.all_canonical_muscles().len(),
      builtin.all_canonical_muscles().len()
    );

    // Target order is preserved through the position column
    let bench = index.exercise_by_id(100).expect("Bench press should exist");
    assert_eq!(bench.targets[0].muscle_id, 10);
    assert_eq!(bench.targets[0].role, TargetRole::Primary);
    assert_eq!(bench.rep_range_for(TrainingGoal::Hypertrophy).unwrap().min, 8);

    // Re-seeding is a no-op
    let again = seed_builtin_catalog(&pool).await.expect("Should skip seeding");
    assert_eq!(again, 0);

    crate::test_utils::teardown_test_db(pool).await;
  }
}
