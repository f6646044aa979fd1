//! SQL schema for the Rollbook SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS spaces (
    space_id    TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS subjects (
    subject_id  TEXT PRIMARY KEY,
    space_id    TEXT NOT NULL REFERENCES spaces(space_id),
    title       TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

-- One (user, role) membership per space; subjects inherit these on import.
CREATE TABLE IF NOT EXISTS space_memberships (
    space_id    TEXT NOT NULL REFERENCES spaces(space_id),
    user_id     TEXT NOT NULL,
    role        TEXT NOT NULL,   -- canonical Role string
    UNIQUE (space_id, user_id)
);

-- Rows are created only through bulk inserts and removed only through bulk
-- deletes; identity is the SQLite rowid.
CREATE TABLE IF NOT EXISTS enrollments (
    id          INTEGER PRIMARY KEY,
    user_id     TEXT NOT NULL,
    subject_id  TEXT NOT NULL REFERENCES subjects(subject_id),
    role        TEXT NOT NULL,   -- canonical Role string
    grade_score REAL,            -- aggregate grade; NULL until recalculated
    grade_max   REAL,
    UNIQUE (user_id, subject_id)
);

-- Read-only input to grade aggregation; never written by recalculation.
CREATE TABLE IF NOT EXISTS asset_reports (
    id            INTEGER PRIMARY KEY,
    enrollment_id INTEGER NOT NULL REFERENCES enrollments(id),
    score         REAL NOT NULL,
    max_score     REAL NOT NULL
);

CREATE INDEX IF NOT EXISTS subjects_space_idx        ON subjects(space_id);
CREATE INDEX IF NOT EXISTS memberships_space_idx     ON space_memberships(space_id);
CREATE INDEX IF NOT EXISTS enrollments_subject_idx   ON enrollments(subject_id);
CREATE INDEX IF NOT EXISTS enrollments_user_idx      ON enrollments(user_id);
CREATE INDEX IF NOT EXISTS asset_reports_enroll_idx  ON asset_reports(enrollment_id);

PRAGMA user_version = 1;
";
