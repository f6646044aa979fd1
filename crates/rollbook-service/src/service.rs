//! [`EnrollmentEntityService`] — translates declarative enrollment intents
//! into row-level import instructions and manages grade recalculation.

use std::collections::HashSet;

use rollbook_core::{
  bulk::{ColumnValue, InsertOptions, ENROLLMENTS},
  enrollment::{Enrollment, Grade},
  grade::GradeCalculator,
  role::Role,
  store::EnrollmentStore,
  subject::Subject,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{bulk::BulkMapper, Error, Result};

// ─── Construction target ─────────────────────────────────────────────────────

/// What the service was constructed over. The two modes are mutually
/// exclusive by construction; each operation requires one of them.
enum Target {
  Subjects(Vec<Subject>),
  Enrollment(Enrollment),
}

// ─── User selection ──────────────────────────────────────────────────────────

/// Argument type for [`EnrollmentEntityService::destroy`]: one user or an
/// ordered sequence of users, accepted interchangeably.
#[derive(Debug, Clone)]
pub enum UserSelection {
  One(Uuid),
  Many(Vec<Uuid>),
}

impl UserSelection {
  fn into_vec(self) -> Vec<Uuid> {
    match self {
      UserSelection::One(id) => vec![id],
      UserSelection::Many(ids) => ids,
    }
  }
}

impl From<Uuid> for UserSelection {
  fn from(id: Uuid) -> Self { UserSelection::One(id) }
}

impl From<Vec<Uuid>> for UserSelection {
  fn from(ids: Vec<Uuid>) -> Self { UserSelection::Many(ids) }
}

impl From<&[Uuid]> for UserSelection {
  fn from(ids: &[Uuid]) -> Self { UserSelection::Many(ids.to_vec()) }
}

// ─── Service ─────────────────────────────────────────────────────────────────

/// Entity service over the enrollments join table.
///
/// Constructed either for a set of subjects (`create`/`destroy` available)
/// or for one existing enrollment (`update_grade` available). Instances are
/// stateless beyond this construction-time configuration; each is single-use
/// per logical operation set and safe to discard afterward. Concurrent calls
/// against overlapping subject/user sets are not coordinated here — the
/// backing store's transactional semantics are the only safety net.
pub struct EnrollmentEntityService<'a, S: EnrollmentStore> {
  store:  &'a S,
  target: Target,
  mapper: BulkMapper<'a, S>,
}

impl<'a, S: EnrollmentStore> EnrollmentEntityService<'a, S> {
  /// Service over a set of subjects; enables `create` and `destroy`.
  pub fn for_subjects(store: &'a S, subjects: Vec<Subject>) -> Self {
    Self {
      store,
      target: Target::Subjects(subjects),
      mapper: BulkMapper::new(store, ENROLLMENTS, InsertOptions::default()),
    }
  }

  /// Service over one existing enrollment; enables `update_grade`.
  pub fn for_enrollment(store: &'a S, enrollment: Enrollment) -> Self {
    Self {
      store,
      target: Target::Enrollment(enrollment),
      mapper: BulkMapper::new(store, ENROLLMENTS, InsertOptions::default()),
    }
  }

  /// The mapper that performs this service's batched inserts.
  pub fn mapper(&self) -> &BulkMapper<'a, S> { &self.mapper }

  /// Uniform enrollment accessor: the configured enrollment as a
  /// one-element slice in enrollment mode, empty in subject mode.
  pub fn enrollments(&self) -> &[Enrollment] {
    match &self.target {
      Target::Enrollment(e) => std::slice::from_ref(e),
      Target::Subjects(_) => &[],
    }
  }

  fn subjects(&self) -> Result<&[Subject]> {
    match &self.target {
      Target::Subjects(subjects) => Ok(subjects),
      Target::Enrollment(_) => Err(Error::SubjectModeRequired),
    }
  }

  // ── create ────────────────────────────────────────────────────────────

  /// Bulk-create enrollments on the configured subjects.
  ///
  /// With no `pairs`, every subject inherits the (user, role) pairs of its
  /// space's roster, each row using the membership's own role. With
  /// explicit `pairs`, the cartesian product of pairs × subjects is
  /// emitted, each row using the pair's role.
  ///
  /// A (user, subject) pair appears at most once per batch; the first
  /// occurrence wins. Empty subjects or pairs yield a no-op insert.
  pub async fn create(&self, pairs: Option<&[(Uuid, Role)]>) -> Result<()> {
    let subjects = self.subjects()?;

    let mut seen: HashSet<(Uuid, Uuid)> = HashSet::new();
    let mut rows: Vec<Vec<ColumnValue>> = Vec::new();

    match pairs {
      None => {
        for subject in subjects {
          let roster = self
            .store
            .space_roster(subject.space_id)
            .await
            .map_err(|e| Error::Store(Box::new(e)))?;
          for entry in roster {
            if seen.insert((entry.user_id, subject.subject_id)) {
              rows.push(vec![
                entry.user_id.into(),
                subject.subject_id.into(),
                entry.role.as_str().into(),
              ]);
            }
          }
        }
      }
      Some(pairs) => {
        for subject in subjects {
          for &(user_id, role) in pairs {
            if seen.insert((user_id, subject.subject_id)) {
              rows.push(vec![
                user_id.into(),
                subject.subject_id.into(),
                role.as_str().into(),
              ]);
            }
          }
        }
      }
    }

    debug!(
      subjects = subjects.len(),
      rows = rows.len(),
      explicit = pairs.is_some(),
      "enrollment import"
    );

    self.mapper.insert(rows, InsertOptions::default()).await?;
    Ok(())
  }

  // ── destroy ───────────────────────────────────────────────────────────

  /// Remove every enrollment of the given user(s) on the configured
  /// subjects, in one bulk delete. Enrollments on other subjects, and
  /// other users' enrollments, are untouched. Returns the count removed;
  /// users with no matching enrollments simply contribute zero.
  pub async fn destroy(&self, users: impl Into<UserSelection>) -> Result<u64> {
    let subjects = self.subjects()?;
    let user_ids = users.into().into_vec();

    if user_ids.is_empty() || subjects.is_empty() {
      return Ok(0);
    }

    let subject_ids = subjects.iter().map(|s| s.subject_id).collect();
    let removed = self
      .store
      .delete_enrollments(user_ids, subject_ids)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;

    info!(removed, "destroyed enrollments");
    Ok(removed)
  }

  // ── update_grade ──────────────────────────────────────────────────────

  /// Recalculate and persist the aggregate grade of the configured
  /// enrollment. The calculator is invoked exactly once per enrollment;
  /// its `(score, max)` outcome is written to the enrollment's grade
  /// columns. Asset reports are never touched.
  pub async fn update_grade<C: GradeCalculator>(&self, calculator: &C) -> Result<()> {
    if matches!(self.target, Target::Subjects(_)) {
      return Err(Error::EnrollmentModeRequired);
    }

    for enrollment in self.enrollments() {
      let outcomes = calculator
        .calculate_grade(enrollment)
        .await
        .map_err(|e| Error::Calculator(Box::new(e)))?;

      if outcomes.len() != 1 {
        return Err(Error::OutcomeCount { want: 1, got: outcomes.len() });
      }
      let outcome = &outcomes[0];

      self
        .store
        .write_grade(enrollment.id, Grade { score: outcome.score, max: outcome.max })
        .await
        .map_err(|e| Error::Store(Box::new(e)))?;

      debug!(
        enrollment = enrollment.id,
        score = outcome.score,
        max = outcome.max,
        "grade updated"
      );
    }

    Ok(())
  }
}
