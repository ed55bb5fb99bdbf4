use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// ---------------------------------------------------------------------------
/// Muscle Groups and Muscles
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MuscleGroup {
  pub id: i64,
  pub name: String,
}

/// A muscle with no parent is canonical: the unit weekly targets and coverage
/// are tracked at. A muscle with a parent is a specific head/portion whose
/// training effect rolls up to the canonical parent. Parent chains are at
/// most one level deep; the catalog index rejects anything deeper at load.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Muscle {
  pub id: i64,
  pub group_id: i64,
  pub name: String,
  pub parent_id: Option<i64>,
}

impl Muscle {
  pub fn is_canonical(&self) -> bool {
    self.parent_id.is_none()
  }
}

/// ---------------------------------------------------------------------------
/// Exercise Targets
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetRole {
  Primary,
  Secondary,
}

impl std::fmt::Display for TargetRole {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Primary => write!(f, "primary"),
      Self::Secondary => write!(f, "secondary"),
    }
  }
}

impl std::str::FromStr for TargetRole {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "primary" => Ok(Self::Primary),
      "secondary" => Ok(Self::Secondary),
      _ => Err(format!("Unknown target role: {}", s)),
    }
  }
}

/// How much and how directly an exercise trains one muscle.
///
/// Weights are independent multipliers in (0, 1]; they are not required to
/// sum to 1 across an exercise's targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseTarget {
  pub muscle_id: i64,
  pub weight: f64,
  pub role: TargetRole,
}

/// ---------------------------------------------------------------------------
/// Movement Patterns and Rep Ranges
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementPattern {
  Press,
  Pull,
  Squat,
  Hinge,
  Lunge,
  Curl,
  Extension,
  Raise,
  Carry,
  Core,
}

impl std::fmt::Display for MovementPattern {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let s = match self {
      Self::Press => "press",
      Self::Pull => "pull",
      Self::Squat => "squat",
      Self::Hinge => "hinge",
      Self::Lunge => "lunge",
      Self::Curl => "curl",
      Self::Extension => "extension",
      Self::Raise => "raise",
      Self::Carry => "carry",
      Self::Core => "core",
    };
    write!(f, "{}", s)
  }
}

impl std::str::FromStr for MovementPattern {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "press" => Ok(Self::Press),
      "pull" => Ok(Self::Pull),
      "squat" => Ok(Self::Squat),
      "hinge" => Ok(Self::Hinge),
      "lunge" => Ok(Self::Lunge),
      "curl" => Ok(Self::Curl),
      "extension" => Ok(Self::Extension),
      "raise" => Ok(Self::Raise),
      "carry" => Ok(Self::Carry),
      "core" => Ok(Self::Core),
      _ => Err(format!("Unknown movement pattern: {}", s)),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingGoal {
  Hypertrophy,
  Strength,
  Endurance,
}

impl std::fmt::Display for TrainingGoal {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Hypertrophy => write!(f, "hypertrophy"),
      Self::Strength => write!(f, "strength"),
      Self::Endurance => write!(f, "endurance"),
    }
  }
}

impl std::str::FromStr for TrainingGoal {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "hypertrophy" => Ok(Self::Hypertrophy),
      "strength" => Ok(Self::Strength),
      "endurance" => Ok(Self::Endurance),
      _ => Err(format!("Unknown training goal: {}", s)),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepRange {
  pub min: u32,
  pub max: u32,
}

/// ---------------------------------------------------------------------------
/// Exercises
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
  pub id: i64,
  pub name: String,
  pub pattern: MovementPattern,
  /// Recommended rep ranges per training goal; catalog contract only, not
  /// consumed by scoring.
  pub rep_ranges: HashMap<TrainingGoal, RepRange>,
  /// Free-form caution tags (e.g. "lower_back", "shoulder_impingement").
  pub contraindications: Vec<String>,
  pub targets: Vec<ExerciseTarget>,
}

impl Exercise {
  /// Rep-range recommendation for a goal, if the catalog authored one.
  pub fn rep_range_for(&self, goal: TrainingGoal) -> Option<RepRange> {
    self.rep_ranges.get(&goal).copied()
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_role_string_roundtrip() {
    for role in [TargetRole::Primary, TargetRole::Secondary] {
      let parsed: TargetRole = role.to_string().parse().unwrap();
      assert_eq!(parsed, role);
    }
    assert!("tertiary".parse::<TargetRole>().is_err());
  }

  #[test]
  fn test_pattern_string_roundtrip() {
    let patterns = [
      MovementPattern::Press,
      MovementPattern::Pull,
      MovementPattern::Squat,
      MovementPattern::Hinge,
      MovementPattern::Lunge,
      MovementPattern::Curl,
      MovementPattern::Extension,
      MovementPattern::Raise,
      MovementPattern::Carry,
      MovementPattern::Core,
    ];
    for pattern in patterns {
      let parsed: MovementPattern = pattern.to_string().parse().unwrap();
      assert_eq!(parsed, pattern);
    }
  }

  #[test]
  fn test_rep_ranges_json_roundtrip() {
    let mut rep_ranges = HashMap::new();
    rep_ranges.insert(TrainingGoal::Hypertrophy, RepRange { min: 8, max: 12 });
    rep_ranges.insert(TrainingGoal::Strength, RepRange { min: 3, max: 6 });

    let json = serde_json::to_string(&rep_ranges).unwrap();
    let parsed: HashMap<TrainingGoal, RepRange> = serde_json::from_str(&json).unwrap();

    assert_eq!(
      parsed.get(&TrainingGoal::Hypertrophy),
      Some(&RepRange { min: 8, max: 12 })
    );
    assert_eq!(
      parsed.get(&TrainingGoal::Strength),
      Some(&RepRange { min: 3, max: 6 })
    );
  }

  #[test]
  fn test_canonical_check() {
    let canonical = Muscle {
      id: 1,
      group_id: 1,
      name: "Triceps".to_string(),
      parent_id: None,
    };
    let head = Muscle {
      id: 2,
      group_id: 1,
      name: "Triceps Long Head".to_string(),
      parent_id: Some(1),
    };
    assert!(canonical.is_canonical());
    assert!(!head.is_canonical());
  }
}
