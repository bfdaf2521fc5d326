//! SQLite schema for the slate store.
//!
//! - `courses` is the pool, keyed by course id
//! - `semesters` holds semester metadata, keyed by semester id
//! - `semester_courses` is the join table; `order_index` rebuilds each
//!   semester's sequence on load
//! - `requirement_groups` is saved as a whole list, independently
//! - `store_meta` tracks schema version and flush bookkeeping

/// Migration v1: the four data tables plus store metadata.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS courses (
    id TEXT PRIMARY KEY CHECK (length(trim(id)) > 0),
    code TEXT NOT NULL,
    name TEXT NOT NULL,
    credits INTEGER NOT NULL DEFAULT 0,
    completed INTEGER NOT NULL DEFAULT 0 CHECK (completed IN (0, 1)),
    category TEXT,
    requirements TEXT,
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS semesters (
    id TEXT PRIMARY KEY CHECK (length(trim(id)) > 0),
    name TEXT NOT NULL,
    kind TEXT NOT NULL,
    year INTEGER NOT NULL,
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS semester_courses (
    semester_id TEXT NOT NULL REFERENCES semesters(id) ON DELETE CASCADE,
    course_id TEXT NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
    order_index INTEGER NOT NULL CHECK (order_index >= 0),
    PRIMARY KEY (semester_id, order_index),
    UNIQUE (course_id)
);

CREATE TABLE IF NOT EXISTS requirement_groups (
    id TEXT PRIMARY KEY CHECK (length(trim(id)) > 0),
    name TEXT NOT NULL,
    color TEXT NOT NULL,
    display_order INTEGER NOT NULL,
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS store_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    schema_version INTEGER NOT NULL,
    last_flush_at_us INTEGER NOT NULL DEFAULT 0,
    flush_count INTEGER NOT NULL DEFAULT 0
);

INSERT OR IGNORE INTO store_meta (
    id,
    schema_version,
    last_flush_at_us,
    flush_count
) VALUES (1, 1, 0, 0);
";

/// Migration v2: explicit pool order plus read-path indexes.
///
/// Existing rows get their insertion order as `pool_index`.
pub const MIGRATION_V2_SQL: &str = r"
ALTER TABLE courses ADD COLUMN pool_index INTEGER NOT NULL DEFAULT 0;

UPDATE courses SET pool_index = rowid;

CREATE INDEX IF NOT EXISTS idx_courses_pool_index
    ON courses(pool_index);

CREATE INDEX IF NOT EXISTS idx_semester_courses_course
    ON semester_courses(course_id);

CREATE INDEX IF NOT EXISTS idx_requirement_groups_order
    ON requirement_groups(display_order, id);
";

/// Indexes expected after all migrations.
pub const REQUIRED_INDEXES: &[&str] = &[
    "idx_courses_pool_index",
    "idx_semester_courses_course",
    "idx_requirement_groups_order",
];

/// Tables expected after all migrations.
pub const REQUIRED_TABLES: &[&str] = &[
    "courses",
    "semesters",
    "semester_courses",
    "requirement_groups",
    "store_meta",
];
