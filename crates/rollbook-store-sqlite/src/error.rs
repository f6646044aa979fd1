//! Error type for `rollbook-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] rollbook_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A bulk-insert row whose width does not match the target's column list.
  #[error("row width {got} does not match {table} column count {want}")]
  RowWidth {
    table: &'static str,
    want:  usize,
    got:   usize,
  },

  #[error("space not found: {0}")]
  SpaceNotFound(uuid::Uuid),

  #[error("enrollment not found: {0}")]
  EnrollmentNotFound(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
