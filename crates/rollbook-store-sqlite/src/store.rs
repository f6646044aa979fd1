//! [`SqliteStore`] — the SQLite implementation of [`EnrollmentStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use rollbook_core::{
  bulk::{BulkTarget, ColumnValue, ConflictPolicy, InsertOptions},
  enrollment::{AssetReport, Enrollment, Grade},
  role::Role,
  space::{Space, SpaceMembership},
  store::{EnrollmentStore, RosterPair},
  subject::Subject,
};

use crate::{
  encode::{
    decode_role, encode_dt, encode_role, encode_uuid, to_sql_value,
    RawEnrollment, RawSubject,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Rollbook enrollment store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn space_exists(&self, space_id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(space_id);
    let exists: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM spaces WHERE space_id = ?1",
              rusqlite::params![id_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(exists)
  }
}

// ─── SQL assembly ────────────────────────────────────────────────────────────

/// The full multi-row INSERT statement for one batch against `target`.
fn bulk_insert_sql(target: BulkTarget, row_count: usize, conflict: ConflictPolicy) -> String {
  let verb = match conflict {
    ConflictPolicy::Ignore => "INSERT OR IGNORE INTO",
    ConflictPolicy::Fail | ConflictPolicy::Upsert => "INSERT INTO",
  };

  let group = format!(
    "({})",
    std::iter::repeat("?")
      .take(target.columns.len())
      .collect::<Vec<_>>()
      .join(", "),
  );
  let placeholders = std::iter::repeat(group.as_str())
    .take(row_count)
    .collect::<Vec<_>>()
    .join(", ");

  let mut sql = format!(
    "{verb} {} ({}) VALUES {placeholders}",
    target.table,
    target.columns.join(", "),
  );

  if conflict == ConflictPolicy::Upsert {
    let updates = target
      .columns
      .iter()
      .filter(|c| !target.conflict_keys.contains(c))
      .map(|c| format!("{c} = excluded.{c}"))
      .collect::<Vec<_>>()
      .join(", ");
    sql.push_str(&format!(
      " ON CONFLICT({}) DO UPDATE SET {updates}",
      target.conflict_keys.join(", "),
    ));
  }

  sql
}

/// `?`-placeholder list of length `n`, for IN clauses.
fn placeholder_list(n: usize) -> String {
  std::iter::repeat("?").take(n).collect::<Vec<_>>().join(", ")
}

// ─── EnrollmentStore impl ────────────────────────────────────────────────────

impl EnrollmentStore for SqliteStore {
  type Error = Error;

  // ── Bulk writes ───────────────────────────────────────────────────────────

  async fn bulk_insert(
    &self,
    target: BulkTarget,
    rows: Vec<Vec<ColumnValue>>,
    options: InsertOptions,
  ) -> Result<u64> {
    if rows.is_empty() {
      return Ok(0);
    }

    let width = target.columns.len();
    if let Some(bad) = rows.iter().find(|r| r.len() != width) {
      return Err(Error::RowWidth {
        table: target.table,
        want:  width,
        got:   bad.len(),
      });
    }

    let sql = bulk_insert_sql(target, rows.len(), options.conflict());
    let params: Vec<rusqlite::types::Value> =
      rows.into_iter().flatten().map(to_sql_value).collect();

    let inserted = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(&sql, rusqlite::params_from_iter(params))?;
        Ok(changed as u64)
      })
      .await?;

    Ok(inserted)
  }

  async fn delete_enrollments(
    &self,
    user_ids: Vec<Uuid>,
    subject_ids: Vec<Uuid>,
  ) -> Result<u64> {
    if user_ids.is_empty() || subject_ids.is_empty() {
      return Ok(0);
    }

    let sql = format!(
      "DELETE FROM enrollments
       WHERE user_id IN ({}) AND subject_id IN ({})",
      placeholder_list(user_ids.len()),
      placeholder_list(subject_ids.len()),
    );

    let params: Vec<String> = user_ids
      .into_iter()
      .chain(subject_ids)
      .map(encode_uuid)
      .collect();

    let removed = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(&sql, rusqlite::params_from_iter(params))?;
        Ok(changed as u64)
      })
      .await?;

    Ok(removed)
  }

  // ── Spaces and subjects ───────────────────────────────────────────────────

  async fn add_space(&self, name: String) -> Result<Space> {
    let space = Space {
      space_id:   Uuid::new_v4(),
      name,
      created_at: Utc::now(),
    };

    let id_str   = encode_uuid(space.space_id);
    let name_str = space.name.clone();
    let at_str   = encode_dt(space.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO spaces (space_id, name, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, name_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(space)
  }

  async fn add_subject(&self, space_id: Uuid, title: String) -> Result<Subject> {
    if !self.space_exists(space_id).await? {
      return Err(Error::SpaceNotFound(space_id));
    }

    let subject = Subject {
      subject_id: Uuid::new_v4(),
      space_id,
      title,
      created_at: Utc::now(),
    };

    let id_str    = encode_uuid(subject.subject_id);
    let space_str = encode_uuid(space_id);
    let title_str = subject.title.clone();
    let at_str    = encode_dt(subject.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subjects (subject_id, space_id, title, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, space_str, title_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(subject)
  }

  async fn get_subject(&self, subject_id: Uuid) -> Result<Option<Subject>> {
    let id_str = encode_uuid(subject_id);

    let raw: Option<RawSubject> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT subject_id, space_id, title, created_at
               FROM subjects WHERE subject_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawSubject {
                  subject_id: row.get(0)?,
                  space_id:   row.get(1)?,
                  title:      row.get(2)?,
                  created_at: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubject::into_subject).transpose()
  }

  async fn add_space_member(
    &self,
    space_id: Uuid,
    user_id: Uuid,
    role: Role,
  ) -> Result<SpaceMembership> {
    if !self.space_exists(space_id).await? {
      return Err(Error::SpaceNotFound(space_id));
    }

    let space_str = encode_uuid(space_id);
    let user_str  = encode_uuid(user_id);
    let role_str  = encode_role(role).to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO space_memberships (space_id, user_id, role)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![space_str, user_str, role_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(SpaceMembership { space_id, user_id, role })
  }

  async fn space_roster(&self, space_id: Uuid) -> Result<Vec<RosterPair>> {
    let id_str = encode_uuid(space_id);

    let raws: Vec<(String, String)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT user_id, role FROM space_memberships
           WHERE space_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok((row.get(0)?, row.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(user, role)| {
        Ok(RosterPair {
          user_id: Uuid::parse_str(&user)?,
          role:    decode_role(&role)?,
        })
      })
      .collect()
  }

  // ── Enrollments ───────────────────────────────────────────────────────────

  async fn enrollments_of_subject(&self, subject_id: Uuid) -> Result<Vec<Enrollment>> {
    let id_str = encode_uuid(subject_id);

    let raws: Vec<RawEnrollment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, user_id, subject_id, role, grade_score, grade_max
           FROM enrollments WHERE subject_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawEnrollment {
              id:          row.get(0)?,
              user_id:     row.get(1)?,
              subject_id:  row.get(2)?,
              role:        row.get(3)?,
              grade_score: row.get(4)?,
              grade_max:   row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEnrollment::into_enrollment).collect()
  }

  async fn get_enrollment(&self, id: i64) -> Result<Option<Enrollment>> {
    let raw: Option<RawEnrollment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, user_id, subject_id, role, grade_score, grade_max
               FROM enrollments WHERE id = ?1",
              rusqlite::params![id],
              |row| {
                Ok(RawEnrollment {
                  id:          row.get(0)?,
                  user_id:     row.get(1)?,
                  subject_id:  row.get(2)?,
                  role:        row.get(3)?,
                  grade_score: row.get(4)?,
                  grade_max:   row.get(5)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEnrollment::into_enrollment).transpose()
  }

  async fn write_grade(&self, enrollment_id: i64, grade: Grade) -> Result<()> {
    let changed = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE enrollments SET grade_score = ?1, grade_max = ?2 WHERE id = ?3",
          rusqlite::params![grade.score, grade.max, enrollment_id],
        )?;
        Ok(changed)
      })
      .await?;

    if changed == 0 {
      return Err(Error::EnrollmentNotFound(enrollment_id));
    }
    Ok(())
  }

  // ── Asset reports ─────────────────────────────────────────────────────────

  async fn add_asset_report(
    &self,
    enrollment_id: i64,
    score: f64,
    max_score: f64,
  ) -> Result<AssetReport> {
    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO asset_reports (enrollment_id, score, max_score)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![enrollment_id, score, max_score],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(AssetReport { id, enrollment_id, score, max_score })
  }

  async fn asset_reports(&self, enrollment_id: i64) -> Result<Vec<AssetReport>> {
    let reports: Vec<AssetReport> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, enrollment_id, score, max_score
           FROM asset_reports WHERE enrollment_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![enrollment_id], |row| {
            Ok(AssetReport {
              id:            row.get(0)?,
              enrollment_id: row.get(1)?,
              score:         row.get(2)?,
              max_score:     row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(reports)
  }
}
