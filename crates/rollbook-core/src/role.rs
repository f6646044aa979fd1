//! Role — the closed set of membership roles a user can hold in a space or
//! an enrollment.
//!
//! The storage layer persists the canonical snake_case string from
//! [`Role::as_str`], never a numeric discriminant or a display form.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
  Member,
  Tutor,
  Teacher,
  EnvironmentAdmin,
  Admin,
}

impl Role {
  /// The canonical string stored in the `role` column.
  pub fn as_str(self) -> &'static str {
    match self {
      Role::Member => "member",
      Role::Tutor => "tutor",
      Role::Teacher => "teacher",
      Role::EnvironmentAdmin => "environment_admin",
      Role::Admin => "admin",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Role {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "member" => Ok(Role::Member),
      "tutor" => Ok(Role::Tutor),
      "teacher" => Ok(Role::Teacher),
      "environment_admin" => Ok(Role::EnvironmentAdmin),
      "admin" => Ok(Role::Admin),
      other => Err(Error::UnknownRole(other.to_owned())),
    }
  }
}
