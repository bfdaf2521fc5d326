//! [`PlanStore`] backed by SQLite.

use anyhow::{Context, Result};
use rusqlite::{Connection, Transaction, params};
use std::collections::HashMap;
use std::path::Path;

use crate::model::RequirementGroup;
use crate::snapshot::{StoredCourse, StoredPlacement, StoredPlan, StoredSemester};
use crate::sync::PlanStore;

use super::{configure_connection, migrations, open_store};

/// Bookkeeping row kept alongside the data tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreMeta {
    pub schema_version: u32,
    pub last_flush_at_us: i64,
    pub flush_count: i64,
}

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

fn now_us() -> i64 {
    chrono::Utc::now().timestamp_micros()
}

/// `id -> created_at_us` for every row of `table`.
fn created_at_map(tx: &Transaction<'_>, table: &str) -> rusqlite::Result<HashMap<String, i64>> {
    let mut stmt = tx.prepare(&format!("SELECT id, created_at_us FROM {table}"))?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    rows.collect()
}

fn touch_meta(tx: &Transaction<'_>, now: i64) -> rusqlite::Result<()> {
    tx.execute(
        "UPDATE store_meta
         SET last_flush_at_us = ?1, flush_count = flush_count + 1
         WHERE id = 1",
        [now],
    )?;
    Ok(())
}

impl SqliteStore {
    /// Open (or create) the store at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            conn: open_store(path)?,
        })
    }

    /// A fresh, fully migrated in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if configuring or migrating the connection fails.
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory().context("open in-memory store")?;
        configure_connection(&conn).context("configure sqlite pragmas")?;
        migrations::migrate(&mut conn).context("apply store migrations")?;
        Ok(Self { conn })
    }

    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Read the `store_meta` row.
    ///
    /// # Errors
    ///
    /// Returns an error if the row cannot be read.
    pub fn meta(&self) -> Result<StoreMeta> {
        let (version, last_flush_at_us, flush_count): (i64, i64, i64) = self
            .conn
            .query_row(
                "SELECT schema_version, last_flush_at_us, flush_count FROM store_meta WHERE id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .context("read store_meta")?;
        Ok(StoreMeta {
            schema_version: u32::try_from(version).context("schema_version out of range")?,
            last_flush_at_us,
            flush_count,
        })
    }

    /// `(created_at_us, updated_at_us)` of a course row.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn course_timestamps(&self, id: &str) -> Result<Option<(i64, i64)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT created_at_us, updated_at_us FROM courses WHERE id = ?1")?;
        let mut rows = stmt.query_map([id], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.next().transpose().context("read course timestamps")
    }

    fn read_courses(&self) -> rusqlite::Result<Vec<StoredCourse>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, code, name, credits, completed, category, requirements, pool_index
             FROM courses
             ORDER BY pool_index, rowid",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(StoredCourse {
                id: row.get(0)?,
                code: row.get(1)?,
                name: row.get(2)?,
                credits: row.get(3)?,
                completed: row.get(4)?,
                category: row.get(5)?,
                requirements: row.get(6)?,
                pool_index: row.get(7)?,
            })
        })?;
        rows.collect()
    }

    fn read_semesters(&self) -> rusqlite::Result<Vec<StoredSemester>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, kind, year FROM semesters ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| {
            Ok(StoredSemester {
                id: row.get(0)?,
                name: row.get(1)?,
                kind: row.get(2)?,
                year: row.get(3)?,
            })
        })?;
        rows.collect()
    }

    fn read_placements(&self) -> rusqlite::Result<Vec<StoredPlacement>> {
        let mut stmt = self.conn.prepare(
            "SELECT semester_id, course_id, order_index
             FROM semester_courses
             ORDER BY semester_id, order_index",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(StoredPlacement {
                semester_id: row.get(0)?,
                course_id: row.get(1)?,
                order_index: row.get(2)?,
            })
        })?;
        rows.collect()
    }
}

fn write_plan(tx: &Transaction<'_>, plan: &StoredPlan, now: i64) -> rusqlite::Result<()> {
    let course_created = created_at_map(tx, "courses")?;
    let semester_created = created_at_map(tx, "semesters")?;

    tx.execute("DELETE FROM semester_courses", [])?;
    tx.execute("DELETE FROM courses", [])?;
    tx.execute("DELETE FROM semesters", [])?;

    {
        let mut insert = tx.prepare(
            "INSERT INTO courses (
                id, code, name, credits, completed, category, requirements,
                pool_index, created_at_us, updated_at_us
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;
        for course in &plan.courses {
            let created = course_created.get(&course.id).copied().unwrap_or(now);
            insert.execute(params![
                course.id,
                course.code,
                course.name,
                course.credits,
                course.completed,
                course.category,
                course.requirements,
                course.pool_index,
                created,
                now,
            ])?;
        }
    }

    {
        let mut insert = tx.prepare(
            "INSERT INTO semesters (id, name, kind, year, created_at_us, updated_at_us)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for semester in &plan.semesters {
            let created = semester_created.get(&semester.id).copied().unwrap_or(now);
            insert.execute(params![
                semester.id,
                semester.name,
                semester.kind,
                semester.year,
                created,
                now,
            ])?;
        }
    }

    {
        let mut insert = tx.prepare(
            "INSERT INTO semester_courses (semester_id, course_id, order_index)
             VALUES (?1, ?2, ?3)",
        )?;
        for placement in &plan.placements {
            insert.execute(params![
                placement.semester_id,
                placement.course_id,
                placement.order_index,
            ])?;
        }
    }

    touch_meta(tx, now)
}

fn write_groups(tx: &Transaction<'_>, groups: &[RequirementGroup], now: i64) -> rusqlite::Result<()> {
    let created_at = created_at_map(tx, "requirement_groups")?;
    tx.execute("DELETE FROM requirement_groups", [])?;
    {
        let mut insert = tx.prepare(
            "INSERT INTO requirement_groups (
                id, name, color, display_order, created_at_us, updated_at_us
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for group in groups {
            let created = created_at.get(&group.id).copied().unwrap_or(now);
            insert.execute(params![
                group.id,
                group.name,
                group.color,
                group.display_order,
                created,
                now,
            ])?;
        }
    }
    touch_meta(tx, now)
}

impl PlanStore for SqliteStore {
    fn load_plan(&mut self) -> Result<StoredPlan> {
        Ok(StoredPlan {
            courses: self.read_courses().context("read courses")?,
            semesters: self.read_semesters().context("read semesters")?,
            placements: self.read_placements().context("read semester_courses")?,
        })
    }

    fn load_requirements(&mut self) -> Result<Vec<RequirementGroup>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, color, display_order
             FROM requirement_groups
             ORDER BY display_order, id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(RequirementGroup {
                id: row.get(0)?,
                name: row.get(1)?,
                color: row.get(2)?,
                display_order: row.get(3)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("read requirement_groups")
    }

    fn save_plan(&mut self, plan: &StoredPlan) -> Result<()> {
        let now = now_us();
        let tx = self.conn.transaction().context("begin plan transaction")?;
        write_plan(&tx, plan, now).context("write plan rows")?;
        tx.commit().context("commit plan transaction")
    }

    fn save_requirements(&mut self, groups: &[RequirementGroup]) -> Result<()> {
        let now = now_us();
        let tx = self
            .conn
            .transaction()
            .context("begin requirement transaction")?;
        write_groups(&tx, groups, now).context("write requirement_groups rows")?;
        tx.commit().context("commit requirement transaction")
    }
}
