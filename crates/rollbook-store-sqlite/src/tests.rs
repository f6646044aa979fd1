//! Integration tests for `SqliteStore` against an in-memory database,
//! driven through the service layer for the import and grade paths.

use rollbook_core::{
  bulk::{ColumnValue, ConflictPolicy, InsertOptions, ENROLLMENTS},
  enrollment::Grade,
  role::Role,
  store::EnrollmentStore,
  subject::Subject,
};
use rollbook_service::{EnrollmentEntityService, ReportCalculator};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn space_with_subjects(s: &SqliteStore, count: usize) -> (Uuid, Vec<Subject>) {
  let space = s.add_space("a space".into()).await.unwrap();
  let mut subjects = Vec::with_capacity(count);
  for i in 0..count {
    subjects.push(
      s.add_subject(space.space_id, format!("subject {i}"))
        .await
        .unwrap(),
    );
  }
  (space.space_id, subjects)
}

async fn enroll(s: &SqliteStore, subjects: &[Subject], pairs: &[(Uuid, Role)]) {
  EnrollmentEntityService::for_subjects(s, subjects.to_vec())
    .create(Some(pairs))
    .await
    .unwrap();
}

fn row(user: Uuid, subject: Uuid, role: Role) -> Vec<ColumnValue> {
  vec![user.into(), subject.into(), role.as_str().into()]
}

// ─── Bulk insert ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn bulk_insert_empty_batch_is_a_noop() {
  let s = store().await;
  let inserted = s
    .bulk_insert(ENROLLMENTS, Vec::new(), InsertOptions::default())
    .await
    .unwrap();
  assert_eq!(inserted, 0);
}

#[tokio::test]
async fn bulk_insert_rejects_mismatched_row_width() {
  let s = store().await;
  let err = s
    .bulk_insert(
      ENROLLMENTS,
      vec![vec![Uuid::new_v4().into()]],
      InsertOptions::default(),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::RowWidth { want: 3, got: 1, .. }));
}

#[tokio::test]
async fn bulk_insert_duplicate_pair_fails_by_default() {
  let s = store().await;
  let (_, subjects) = space_with_subjects(&s, 1).await;
  let user = Uuid::new_v4();

  let first = vec![row(user, subjects[0].subject_id, Role::Member)];
  s.bulk_insert(ENROLLMENTS, first.clone(), InsertOptions::default())
    .await
    .unwrap();

  // Same (user, subject) pair again: the UNIQUE constraint surfaces.
  let err = s
    .bulk_insert(ENROLLMENTS, first, InsertOptions::default())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Database(_)));
}

#[tokio::test]
async fn conflict_ignore_keeps_the_existing_row() {
  let s = store().await;
  let (_, subjects) = space_with_subjects(&s, 1).await;
  let user = Uuid::new_v4();
  let subject_id = subjects[0].subject_id;

  s.bulk_insert(
    ENROLLMENTS,
    vec![row(user, subject_id, Role::Member)],
    InsertOptions::default(),
  )
  .await
  .unwrap();

  let inserted = s
    .bulk_insert(
      ENROLLMENTS,
      vec![row(user, subject_id, Role::Teacher)],
      InsertOptions::with_conflict(ConflictPolicy::Ignore),
    )
    .await
    .unwrap();
  assert_eq!(inserted, 0);

  let enrollments = s.enrollments_of_subject(subject_id).await.unwrap();
  assert_eq!(enrollments.len(), 1);
  assert_eq!(enrollments[0].role, Role::Member);
}

#[tokio::test]
async fn conflict_upsert_overwrites_non_key_columns() {
  let s = store().await;
  let (_, subjects) = space_with_subjects(&s, 1).await;
  let user = Uuid::new_v4();
  let subject_id = subjects[0].subject_id;

  s.bulk_insert(
    ENROLLMENTS,
    vec![row(user, subject_id, Role::Member)],
    InsertOptions::default(),
  )
  .await
  .unwrap();

  s.bulk_insert(
    ENROLLMENTS,
    vec![row(user, subject_id, Role::Teacher)],
    InsertOptions::with_conflict(ConflictPolicy::Upsert),
  )
  .await
  .unwrap();

  let enrollments = s.enrollments_of_subject(subject_id).await.unwrap();
  assert_eq!(enrollments.len(), 1);
  assert_eq!(enrollments[0].role, Role::Teacher);
}

// ─── create, end to end ──────────────────────────────────────────────────────

#[tokio::test]
async fn create_default_mode_enrolls_the_space_roster() {
  let s = store().await;
  let (space_id, subjects) = space_with_subjects(&s, 2).await;

  let (u1, u2) = (Uuid::new_v4(), Uuid::new_v4());
  s.add_space_member(space_id, u1, Role::Member).await.unwrap();
  s.add_space_member(space_id, u2, Role::Teacher).await.unwrap();

  EnrollmentEntityService::for_subjects(&s, subjects.clone())
    .create(None)
    .await
    .unwrap();

  for subject in &subjects {
    let enrollments = s.enrollments_of_subject(subject.subject_id).await.unwrap();
    assert_eq!(enrollments.len(), 2);
    assert_eq!(enrollments[0].user_id, u1);
    assert_eq!(enrollments[0].role, Role::Member);
    assert_eq!(enrollments[1].user_id, u2);
    assert_eq!(enrollments[1].role, Role::Teacher);
    assert!(enrollments.iter().all(|e| e.grade.is_none()));
  }
}

#[tokio::test]
async fn create_explicit_pairs_enrolls_the_cartesian_product() {
  let s = store().await;
  let (_, subjects) = space_with_subjects(&s, 3).await;

  let pairs = vec![
    (Uuid::new_v4(), Role::Member),
    (Uuid::new_v4(), Role::Tutor),
  ];
  enroll(&s, &subjects, &pairs).await;

  for subject in &subjects {
    let enrollments = s.enrollments_of_subject(subject.subject_id).await.unwrap();
    assert_eq!(enrollments.len(), pairs.len());
    for (user_id, role) in &pairs {
      assert!(
        enrollments
          .iter()
          .any(|e| e.user_id == *user_id && e.role == *role),
      );
    }
  }
}

// ─── destroy, end to end ─────────────────────────────────────────────────────

#[tokio::test]
async fn destroy_removes_exactly_the_matching_enrollments() {
  let s = store().await;
  let (_, subjects) = space_with_subjects(&s, 2).await;

  let users: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
  let pairs: Vec<(Uuid, Role)> = users.iter().map(|&u| (u, Role::Member)).collect();
  enroll(&s, &subjects, &pairs).await;

  let removed = EnrollmentEntityService::for_subjects(&s, subjects.clone())
    .destroy(users.clone())
    .await
    .unwrap();
  assert_eq!(removed, (users.len() * subjects.len()) as u64);

  for subject in &subjects {
    assert!(s.enrollments_of_subject(subject.subject_id).await.unwrap().is_empty());
  }
}

#[tokio::test]
async fn destroy_leaves_unconfigured_subjects_untouched() {
  let s = store().await;
  let (_, subjects) = space_with_subjects(&s, 2).await;
  let (configured, other) = (subjects[0].clone(), subjects[1].clone());

  let user = Uuid::new_v4();
  enroll(&s, &subjects, &[(user, Role::Member)]).await;

  let removed = EnrollmentEntityService::for_subjects(&s, vec![configured.clone()])
    .destroy(user)
    .await
    .unwrap();
  assert_eq!(removed, 1);

  assert!(s.enrollments_of_subject(configured.subject_id).await.unwrap().is_empty());
  let remaining = s.enrollments_of_subject(other.subject_id).await.unwrap();
  assert_eq!(remaining.len(), 1);
  assert_eq!(remaining[0].user_id, user);
}

#[tokio::test]
async fn destroy_leaves_other_users_untouched() {
  let s = store().await;
  let (_, subjects) = space_with_subjects(&s, 1).await;

  let (doomed, kept) = (Uuid::new_v4(), Uuid::new_v4());
  enroll(&s, &subjects, &[(doomed, Role::Member), (kept, Role::Member)]).await;

  EnrollmentEntityService::for_subjects(&s, subjects.clone())
    .destroy(doomed)
    .await
    .unwrap();

  let remaining = s.enrollments_of_subject(subjects[0].subject_id).await.unwrap();
  assert_eq!(remaining.len(), 1);
  assert_eq!(remaining[0].user_id, kept);
}

#[tokio::test]
async fn destroy_of_unenrolled_user_removes_nothing() {
  let s = store().await;
  let (_, subjects) = space_with_subjects(&s, 1).await;

  let removed = EnrollmentEntityService::for_subjects(&s, subjects)
    .destroy(Uuid::new_v4())
    .await
    .unwrap();
  assert_eq!(removed, 0);
}

// ─── update_grade, end to end ────────────────────────────────────────────────

#[tokio::test]
async fn update_grade_persists_the_asset_report_aggregate() {
  let s = store().await;
  let (_, subjects) = space_with_subjects(&s, 1).await;
  let user = Uuid::new_v4();
  enroll(&s, &subjects, &[(user, Role::Member)]).await;

  let enrollment = s
    .enrollments_of_subject(subjects[0].subject_id)
    .await
    .unwrap()
    .remove(0);

  for score in [5.0, 3.0, 3.0] {
    s.add_asset_report(enrollment.id, score, score).await.unwrap();
  }

  let service = EnrollmentEntityService::for_enrollment(&s, enrollment.clone());
  service.update_grade(&ReportCalculator::new(&s)).await.unwrap();

  let reloaded = s.get_enrollment(enrollment.id).await.unwrap().unwrap();
  assert_eq!(reloaded.grade, Some(Grade { score: 11.0, max: 11.0 }));

  // Recalculation reads asset reports, never rewrites them.
  let reports = s.asset_reports(enrollment.id).await.unwrap();
  assert_eq!(reports.len(), 3);
  assert_eq!(reports.iter().map(|r| r.score).sum::<f64>(), 11.0);
}

#[tokio::test]
async fn write_grade_on_missing_enrollment_errors() {
  let s = store().await;
  let err = s
    .write_grade(999, Grade { score: 1.0, max: 1.0 })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::EnrollmentNotFound(999)));
}

// ─── Roster and fixtures ─────────────────────────────────────────────────────

#[tokio::test]
async fn space_roster_preserves_insertion_order() {
  let s = store().await;
  let space = s.add_space("ordered".into()).await.unwrap();

  let users: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
  for &user in &users {
    s.add_space_member(space.space_id, user, Role::Member).await.unwrap();
  }

  let roster = s.space_roster(space.space_id).await.unwrap();
  assert_eq!(roster.iter().map(|p| p.user_id).collect::<Vec<_>>(), users);
}

#[tokio::test]
async fn add_subject_to_missing_space_errors() {
  let s = store().await;
  let missing = Uuid::new_v4();
  let err = s.add_subject(missing, "orphan".into()).await.unwrap_err();
  assert!(matches!(err, Error::SpaceNotFound(id) if id == missing));
}

#[tokio::test]
async fn get_subject_missing_returns_none() {
  let s = store().await;
  assert!(s.get_subject(Uuid::new_v4()).await.unwrap().is_none());
}
