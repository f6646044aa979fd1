//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Roles are stored as their
//! canonical snake_case string. UUIDs are stored as hyphenated lowercase
//! strings.

use chrono::{DateTime, Utc};
use rollbook_core::{
  bulk::ColumnValue,
  enrollment::{Enrollment, Grade},
  role::Role,
  subject::Subject,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Role ────────────────────────────────────────────────────────────────────

pub fn encode_role(role: Role) -> &'static str { role.as_str() }

pub fn decode_role(s: &str) -> Result<Role> {
  Ok(s.parse().map_err(Error::Core)?)
}

// ─── Scalar values ───────────────────────────────────────────────────────────

/// Lower a bulk-insert scalar into the owned value rusqlite binds.
pub fn to_sql_value(v: ColumnValue) -> rusqlite::types::Value {
  use rusqlite::types::Value;
  match v {
    ColumnValue::Uuid(id) => Value::Text(encode_uuid(id)),
    ColumnValue::Text(s) => Value::Text(s),
    ColumnValue::Integer(i) => Value::Integer(i),
    ColumnValue::Real(r) => Value::Real(r),
    ColumnValue::Null => Value::Null,
  }
}

// ─── Raw row structs ─────────────────────────────────────────────────────────

/// A `subjects` row as read from SQLite, before decoding.
pub struct RawSubject {
  pub subject_id: String,
  pub space_id:   String,
  pub title:      String,
  pub created_at: String,
}

impl RawSubject {
  pub fn into_subject(self) -> Result<Subject> {
    Ok(Subject {
      subject_id: decode_uuid(&self.subject_id)?,
      space_id:   decode_uuid(&self.space_id)?,
      title:      self.title,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// An `enrollments` row as read from SQLite, before decoding.
pub struct RawEnrollment {
  pub id:          i64,
  pub user_id:     String,
  pub subject_id:  String,
  pub role:        String,
  pub grade_score: Option<f64>,
  pub grade_max:   Option<f64>,
}

impl RawEnrollment {
  pub fn into_enrollment(self) -> Result<Enrollment> {
    let grade = match (self.grade_score, self.grade_max) {
      (Some(score), Some(max)) => Some(Grade { score, max }),
      _ => None,
    };
    Ok(Enrollment {
      id: self.id,
      user_id: decode_uuid(&self.user_id)?,
      subject_id: decode_uuid(&self.subject_id)?,
      role: decode_role(&self.role)?,
      grade,
    })
  }
}
