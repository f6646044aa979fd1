//! Error types for `rollbook-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("space not found: {0}")]
  SpaceNotFound(Uuid),

  #[error("subject not found: {0}")]
  SubjectNotFound(Uuid),

  #[error("enrollment not found: {0}")]
  EnrollmentNotFound(i64),

  #[error("unknown role: {0:?}")]
  UnknownRole(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
