//! The `EnrollmentStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `rollbook-store-sqlite`). Higher layers (`rollbook-service`,
//! `rollbook-cli`) depend on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  bulk::{BulkTarget, ColumnValue, InsertOptions},
  enrollment::{AssetReport, Enrollment, Grade},
  role::Role,
  space::{Space, SpaceMembership},
  subject::Subject,
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// One entry of a space's roster, as returned by
/// [`EnrollmentStore::space_roster`]: a plain (user, role) pair with no
/// object-graph attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterPair {
  pub user_id: Uuid,
  pub role:    Role,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Rollbook storage backend.
///
/// Enrollment rows are written only through [`bulk_insert`] and removed only
/// through [`delete_enrollments`]; there is no row-at-a-time enrollment
/// write. Backend errors propagate unmodified — no method retries or
/// swallows a failure.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
///
/// [`bulk_insert`]: EnrollmentStore::bulk_insert
/// [`delete_enrollments`]: EnrollmentStore::delete_enrollments
pub trait EnrollmentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Bulk writes ───────────────────────────────────────────────────────

  /// Insert `rows` into `target` in exactly one store round trip,
  /// regardless of batch size. Each row's positions correspond 1:1 to
  /// `target.columns`. Returns the number of rows actually inserted.
  ///
  /// An empty batch is a no-op returning 0, never an error. Constraint
  /// violations under [`ConflictPolicy::Fail`](crate::bulk::ConflictPolicy)
  /// propagate unmodified.
  fn bulk_insert(
    &self,
    target: BulkTarget,
    rows: Vec<Vec<ColumnValue>>,
    options: InsertOptions,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Remove every enrollment whose user is in `user_ids` AND whose subject
  /// is in `subject_ids`, in one store round trip. Returns the count
  /// removed; empty sets remove nothing.
  fn delete_enrollments(
    &self,
    user_ids: Vec<Uuid>,
    subject_ids: Vec<Uuid>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Spaces and subjects ───────────────────────────────────────────────

  /// Create and persist a new space.
  fn add_space(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Space, Self::Error>> + Send + '_;

  /// Create and persist a subject inside an existing space.
  fn add_subject(
    &self,
    space_id: Uuid,
    title: String,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  /// Retrieve a subject by id. Returns `None` if not found.
  fn get_subject(
    &self,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + '_;

  /// Record a (user, role) membership of a space. Unique per (space, user).
  fn add_space_member(
    &self,
    space_id: Uuid,
    user_id: Uuid,
    role: Role,
  ) -> impl Future<Output = Result<SpaceMembership, Self::Error>> + Send + '_;

  /// The read-only roster of a space: plain (user, role) pairs in
  /// deterministic insertion order.
  fn space_roster(
    &self,
    space_id: Uuid,
  ) -> impl Future<Output = Result<Vec<RosterPair>, Self::Error>> + Send + '_;

  // ── Enrollments ───────────────────────────────────────────────────────

  /// All enrollments of a subject, in insertion order.
  fn enrollments_of_subject(
    &self,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Enrollment>, Self::Error>> + Send + '_;

  /// Retrieve an enrollment by row id. Returns `None` if not found.
  fn get_enrollment(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Enrollment>, Self::Error>> + Send + '_;

  /// Overwrite the aggregate grade columns of one enrollment. Touches
  /// nothing else — in particular, never an asset report.
  fn write_grade(
    &self,
    enrollment_id: i64,
    grade: Grade,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Asset reports ─────────────────────────────────────────────────────

  /// Record a scored item under an enrollment.
  fn add_asset_report(
    &self,
    enrollment_id: i64,
    score: f64,
    max_score: f64,
  ) -> impl Future<Output = Result<AssetReport, Self::Error>> + Send + '_;

  /// All asset reports of an enrollment, in insertion order.
  fn asset_reports(
    &self,
    enrollment_id: i64,
  ) -> impl Future<Output = Result<Vec<AssetReport>, Self::Error>> + Send + '_;
}
