//! Enrollment — the join record of a user's participation in a subject.
//!
//! Enrollments are created only through the bulk-import path and destroyed
//! in batch by user identity; their identity is the store-assigned row id.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::role::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
  pub id:         i64,
  pub user_id:    Uuid,
  pub subject_id: Uuid,
  pub role:       Role,
  /// Aggregate grade; `None` until the first recalculation.
  pub grade:      Option<Grade>,
}

/// The persisted aggregate grade of an enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grade {
  pub score: f64,
  pub max:   f64,
}

/// A scored unit of work belonging to one enrollment. Read-only input to
/// grade aggregation; recalculation never writes back to these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetReport {
  pub id:            i64,
  pub enrollment_id: i64,
  pub score:         f64,
  pub max_score:     f64,
}
