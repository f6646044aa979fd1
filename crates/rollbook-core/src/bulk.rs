//! Bulk-insert vocabulary shared between the service layer and storage
//! backends.
//!
//! A batch is an ordered sequence of fixed-width rows of [`ColumnValue`]
//! scalars; each row's positions correspond 1:1 to the columns of a
//! [`BulkTarget`]. Backends must turn one batch into one store round trip.

use uuid::Uuid;

// ─── Scalar values ───────────────────────────────────────────────────────────

/// A scalar cell of a bulk-insert row.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
  Uuid(Uuid),
  Text(String),
  Integer(i64),
  Real(f64),
  Null,
}

impl From<Uuid> for ColumnValue {
  fn from(v: Uuid) -> Self { ColumnValue::Uuid(v) }
}

impl From<&str> for ColumnValue {
  fn from(v: &str) -> Self { ColumnValue::Text(v.to_owned()) }
}

impl From<String> for ColumnValue {
  fn from(v: String) -> Self { ColumnValue::Text(v) }
}

impl From<i64> for ColumnValue {
  fn from(v: i64) -> Self { ColumnValue::Integer(v) }
}

impl From<f64> for ColumnValue {
  fn from(v: f64) -> Self { ColumnValue::Real(v) }
}

// ─── Insert options ──────────────────────────────────────────────────────────

/// How a backend resolves a uniqueness-constraint collision during a bulk
/// insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
  /// Surface the constraint violation; nothing in the batch is retried.
  #[default]
  Fail,
  /// Drop colliding rows, keep the rest of the batch.
  Ignore,
  /// Overwrite the non-key columns of the existing row.
  Upsert,
}

/// Per-call insert configuration. Unset fields fall back to the mapper's
/// defaults via [`InsertOptions::merged_over`]; per-call values win.
#[derive(Debug, Clone, Copy, Default)]
pub struct InsertOptions {
  pub conflict: Option<ConflictPolicy>,
}

impl InsertOptions {
  pub fn with_conflict(conflict: ConflictPolicy) -> Self {
    Self { conflict: Some(conflict) }
  }

  /// Layer `self` over `defaults`: any option set on `self` takes
  /// precedence, unset options inherit the default.
  pub fn merged_over(self, defaults: InsertOptions) -> InsertOptions {
    InsertOptions { conflict: self.conflict.or(defaults.conflict) }
  }

  /// The effective conflict policy after merging.
  pub fn conflict(&self) -> ConflictPolicy {
    self.conflict.unwrap_or_default()
  }
}

// ─── Targets ─────────────────────────────────────────────────────────────────

/// Static descriptor of a bulk-insert target: the table, the ordered column
/// list every row must supply, and the key columns an
/// [`Upsert`](ConflictPolicy::Upsert) resolves conflicts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkTarget {
  pub table:         &'static str,
  pub columns:       &'static [&'static str],
  pub conflict_keys: &'static [&'static str],
}

/// The enrollments join table — the only target the import pipeline writes.
pub const ENROLLMENTS: BulkTarget = BulkTarget {
  table:         "enrollments",
  columns:       &["user_id", "subject_id", "role"],
  conflict_keys: &["user_id", "subject_id"],
};
