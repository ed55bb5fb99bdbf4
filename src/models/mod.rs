pub mod catalog;
pub mod history;
pub mod sync;

pub use catalog::{Exercise, ExerciseTarget, Muscle, MuscleGroup, TargetRole};
pub use history::{ExerciseAggregate, LoggedSet, SetEntry};
pub use sync::SyncState;
