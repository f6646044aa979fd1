//! Subject — a course unit within a space that users enroll into.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
  pub subject_id: Uuid,
  pub space_id:   Uuid,
  pub title:      String,
  pub created_at: DateTime<Utc>,
}
