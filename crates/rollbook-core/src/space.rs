//! Space — the grouping context that holds user-role memberships.
//!
//! Subjects belong to a space and, by default, inherit its memberships when
//! enrollments are bulk-created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::role::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Space {
  pub space_id:   Uuid,
  pub name:       String,
  pub created_at: DateTime<Utc>,
}

/// One (user, role) membership of a space. Unique per (space, user).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaceMembership {
  pub space_id: Uuid,
  pub user_id:  Uuid,
  pub role:     Role,
}
