//! The `GradeCalculator` collaborator contract.
//!
//! Grade aggregation is external to the import pipeline: the service hands
//! an enrollment to a calculator and persists whatever comes back. It never
//! recomputes scores itself and never fabricates a fallback on failure.

use std::future::Future;

use crate::enrollment::Enrollment;

/// The aggregate outcome for one enrollment: total score achieved, maximum
/// achievable, and the label of the role the aggregation was made under.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeOutcome {
  pub score:      f64,
  pub max:        f64,
  pub role_label: String,
}

/// Computes aggregate grades from an enrollment's scored items.
pub trait GradeCalculator {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Aggregate the given enrollment. Returns exactly one
  /// [`GradeOutcome`] per enrollment submitted, in order.
  fn calculate_grade<'a>(
    &'a self,
    enrollment: &'a Enrollment,
  ) -> impl Future<Output = Result<Vec<GradeOutcome>, Self::Error>> + Send + 'a;
}
