//! Error type for `rollbook-service`.

use thiserror::Error;

/// An error surfaced by the import/recalculation pipeline. Store and
/// calculator failures are boxed and propagated unmodified; the service
/// performs no retries and no local recovery.
#[derive(Debug, Error)]
pub enum Error {
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("grade calculator error: {0}")]
  Calculator(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// `create`/`destroy` called on a service constructed for an enrollment.
  #[error("operation requires a subject-mode service")]
  SubjectModeRequired,

  /// `update_grade` called on a service constructed for subjects.
  #[error("operation requires an enrollment-mode service")]
  EnrollmentModeRequired,

  /// The calculator returned a different number of outcomes than
  /// enrollments submitted.
  #[error("calculator returned {got} outcomes for {want} enrollment(s)")]
  OutcomeCount { want: usize, got: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
