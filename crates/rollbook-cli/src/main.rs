//! `rollbook` — admin CLI for the enrollment store.
//!
//! Imports are administrator-triggered and low-frequency; this binary is
//! that administrative surface. It reads `rollbook.toml` (or the path given
//! with `--config`), opens the SQLite store, and runs one operation per
//! invocation.
//!
//! # Examples
//!
//! ```
//! rollbook add-space --name "Calculus 101"
//! rollbook enroll --subject <uuid> --subject <uuid>            # space roster
//! rollbook enroll --subject <uuid> --user <uuid> --role tutor  # explicit
//! rollbook unenroll --subject <uuid> --user <uuid>
//! rollbook recalc --enrollment 42
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context as _};
use clap::{Parser, Subcommand};
use rollbook_core::{role::Role, store::EnrollmentStore, subject::Subject};
use rollbook_service::{EnrollmentEntityService, ReportCalculator};
use rollbook_store_sqlite::SqliteStore;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "rollbook", about = "Rollbook enrollment administration")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "rollbook.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Create the store file and schema, then exit.
  Init,

  /// Create a space.
  AddSpace {
    #[arg(long)]
    name: String,
  },

  /// Create a subject inside a space.
  AddSubject {
    #[arg(long)]
    space: Uuid,
    #[arg(long)]
    title: String,
  },

  /// Add a (user, role) membership to a space.
  AddMember {
    #[arg(long)]
    space: Uuid,
    #[arg(long)]
    user: Uuid,
    #[arg(long, default_value = "member", value_parser = parse_role)]
    role: Role,
  },

  /// Bulk-enroll into subjects: the space roster by default, or the given
  /// users under one role.
  Enroll {
    #[arg(long = "subject", required = true)]
    subjects: Vec<Uuid>,
    #[arg(long = "user")]
    users: Vec<Uuid>,
    #[arg(long, default_value = "member", value_parser = parse_role)]
    role: Role,
  },

  /// Bulk-remove the given users' enrollments on the given subjects.
  Unenroll {
    #[arg(long = "subject", required = true)]
    subjects: Vec<Uuid>,
    #[arg(long = "user", required = true)]
    users: Vec<Uuid>,
  },

  /// Recalculate and persist one enrollment's aggregate grade.
  Recalc {
    #[arg(long)]
    enrollment: i64,
  },

  /// Print a subject's enrollments as JSON lines.
  Roster {
    #[arg(long)]
    subject: Uuid,
  },
}

fn parse_role(s: &str) -> Result<Role, String> {
  s.parse().map_err(|e: rollbook_core::Error| e.to_string())
}

// ─── Config file ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CliConfig {
  /// Path of the SQLite store file.
  #[serde(default = "default_store_path")]
  store_path: String,
}

fn default_store_path() -> String { "rollbook.db".into() }

// ─── Main ─────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config.clone()).required(false))
    .add_source(config::Environment::with_prefix("ROLLBOOK"))
    .build()
    .context("failed to read config file")?;

  let cfg: CliConfig = settings
    .try_deserialize()
    .context("failed to deserialise configuration")?;

  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;

  match cli.command {
    Command::Init => {
      println!("store ready at {}", cfg.store_path);
    }

    Command::AddSpace { name } => {
      let space = store.add_space(name).await?;
      println!("{}", space.space_id);
    }

    Command::AddSubject { space, title } => {
      let subject = store.add_subject(space, title).await?;
      println!("{}", subject.subject_id);
    }

    Command::AddMember { space, user, role } => {
      store.add_space_member(space, user, role).await?;
      println!("{user} is {role} of {space}");
    }

    Command::Enroll { subjects, users, role } => {
      let subjects = fetch_subjects(&store, &subjects).await?;
      let service = EnrollmentEntityService::for_subjects(&store, subjects);

      if users.is_empty() {
        service.create(None).await?;
      } else {
        let pairs: Vec<(Uuid, Role)> = users.into_iter().map(|u| (u, role)).collect();
        service.create(Some(&pairs)).await?;
      }
    }

    Command::Unenroll { subjects, users } => {
      let subjects = fetch_subjects(&store, &subjects).await?;
      let removed = EnrollmentEntityService::for_subjects(&store, subjects)
        .destroy(users)
        .await?;
      println!("removed {removed} enrollment(s)");
    }

    Command::Recalc { enrollment } => {
      let enrollment = store
        .get_enrollment(enrollment)
        .await?
        .with_context(|| format!("no enrollment with id {enrollment}"))?;

      let service = EnrollmentEntityService::for_enrollment(&store, enrollment);
      service.update_grade(&ReportCalculator::new(&store)).await?;
    }

    Command::Roster { subject } => {
      for enrollment in store.enrollments_of_subject(subject).await? {
        println!("{}", serde_json::to_string(&enrollment)?);
      }
    }
  }

  Ok(())
}

/// Resolve subject ids against the store, failing on the first unknown id.
async fn fetch_subjects(store: &SqliteStore, ids: &[Uuid]) -> anyhow::Result<Vec<Subject>> {
  let mut subjects = Vec::with_capacity(ids.len());
  for &id in ids {
    match store.get_subject(id).await? {
      Some(subject) => subjects.push(subject),
      None => bail!("no subject with id {id}"),
    }
  }
  Ok(subjects)
}
