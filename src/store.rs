use crate::model::{Coaching, MembershipPlan, Student, StudentFields, StudentStatus};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use std::rc::Rc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("student not found: {0}")]
    NotFound(String),
    /// Raised by non-SQLite backends when the remote side is unreachable.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Opaque position after the last row of a fetched page. The id breaks ties
/// between equal creation timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    created_at: DateTime<Utc>,
    id: String,
}

impl Cursor {
    pub fn after(student: &Student) -> Option<Self> {
        Some(Self {
            created_at: student.created_at?,
            id: student.id.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Paged read ordered by creation time. Records without a creation time are
/// not part of the ordering and are never returned.
#[derive(Debug, Clone, PartialEq)]
pub struct PageQuery {
    pub direction: SortDirection,
    pub start_after: Option<Cursor>,
    pub limit: usize,
}

impl PageQuery {
    pub fn newest_first(start_after: Option<Cursor>, limit: usize) -> Self {
        Self {
            direction: SortDirection::Descending,
            start_after,
            limit,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountFilter {
    pub status: Option<StudentStatus>,
    pub coaching: Option<Coaching>,
    /// Half-open `[from, to)` range on membership end.
    pub membership_end_between: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl CountFilter {
    pub fn all() -> Self {
        Self::default()
    }
}

pub trait DocumentStore {
    fn insert(&self, fields: &StudentFields, created_at: DateTime<Utc>) -> Result<String, StoreError>;
    fn update(&self, id: &str, fields: &StudentFields, updated_at: DateTime<Utc>) -> Result<(), StoreError>;
    /// Deleting an id that does not exist succeeds.
    fn delete(&self, id: &str) -> Result<(), StoreError>;
    fn query_page(&self, query: &PageQuery) -> Result<Vec<Student>, StoreError>;
    /// Ids of records whose creation time is absent, blank or unreadable.
    fn scan_missing_created_at(&self) -> Result<Vec<String>, StoreError>;
    /// Returns false when the record already had a creation time (or is gone).
    fn set_created_at_if_missing(&self, id: &str, at: DateTime<Utc>) -> Result<bool, StoreError>;
}

pub trait CountService {
    fn count(&self, filter: &CountFilter) -> Result<u64, StoreError>;
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(raw: Option<String>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    let t = raw.trim();
    if t.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(t).ok().map(|d| d.to_utc())
}

const STUDENT_COLUMNS: &str = "id, name, age, email, coaching, status, plan, \
     membership_start, membership_end, created_at, updated_at";

fn student_from_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    let coaching: Option<String> = row.get(4)?;
    let status: Option<String> = row.get(5)?;
    let plan: Option<String> = row.get(6)?;
    Ok(Student {
        id: row.get(0)?,
        name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        age: row.get(2)?,
        email: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        coaching: coaching
            .as_deref()
            .and_then(Coaching::parse)
            .unwrap_or(Coaching::Coach),
        status: status
            .as_deref()
            .and_then(StudentStatus::parse)
            .unwrap_or(StudentStatus::Inactive),
        plan: MembershipPlan::from_label(plan.as_deref().unwrap_or_default()),
        membership_start: parse_timestamp(row.get(7)?),
        membership_end: parse_timestamp(row.get(8)?),
        created_at: parse_timestamp(row.get(9)?),
        updated_at: parse_timestamp(row.get(10)?),
    })
}

/// Roster collection backed by the workspace SQLite database.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Rc<Connection>,
}

impl SqliteStore {
    pub fn new(conn: Rc<Connection>) -> Self {
        Self { conn }
    }
}

impl DocumentStore for SqliteStore {
    fn insert(&self, fields: &StudentFields, created_at: DateTime<Utc>) -> Result<String, StoreError> {
        let student_id = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO students(
               id,
               name,
               age,
               email,
               coaching,
               status,
               plan,
               membership_start,
               membership_end,
               created_at,
               updated_at
             ) VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NULL)",
            (
                &student_id,
                &fields.name,
                fields.age,
                &fields.email,
                fields.coaching.label(),
                fields.status.label(),
                fields.plan.label(),
                format_timestamp(fields.membership_start),
                format_timestamp(fields.membership_end),
                format_timestamp(created_at),
            ),
        )?;
        Ok(student_id)
    }

    fn update(&self, id: &str, fields: &StudentFields, updated_at: DateTime<Utc>) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE students SET
               name = ?,
               age = ?,
               email = ?,
               coaching = ?,
               status = ?,
               plan = ?,
               membership_start = ?,
               membership_end = ?,
               updated_at = ?
             WHERE id = ?",
            (
                &fields.name,
                fields.age,
                &fields.email,
                fields.coaching.label(),
                fields.status.label(),
                fields.plan.label(),
                format_timestamp(fields.membership_start),
                format_timestamp(fields.membership_end),
                format_timestamp(updated_at),
                id,
            ),
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.conn.execute("DELETE FROM students WHERE id = ?", [id])?;
        Ok(())
    }

    fn query_page(&self, query: &PageQuery) -> Result<Vec<Student>, StoreError> {
        let (order, cmp) = match query.direction {
            SortDirection::Descending => ("DESC", "<"),
            SortDirection::Ascending => ("ASC", ">"),
        };
        let mut bind: Vec<Value> = Vec::new();
        let mut sql = format!(
            "SELECT {} FROM students WHERE created_at IS NOT NULL AND trim(created_at) <> ''",
            STUDENT_COLUMNS
        );
        if let Some(cursor) = &query.start_after {
            let at = format_timestamp(cursor.created_at);
            sql.push_str(&format!(
                " AND (created_at {cmp} ? OR (created_at = ? AND id {cmp} ?))"
            ));
            bind.push(Value::Text(at.clone()));
            bind.push(Value::Text(at));
            bind.push(Value::Text(cursor.id.clone()));
        }
        sql.push_str(&format!(" ORDER BY created_at {order}, id {order} LIMIT ?"));
        bind.push(Value::Integer(i64::try_from(query.limit).unwrap_or(i64::MAX)));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(bind), student_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn scan_missing_created_at(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, created_at FROM students ORDER BY rowid")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows
            .into_iter()
            .filter(|(_, raw)| parse_timestamp(raw.clone()).is_none())
            .map(|(id, _)| id)
            .collect())
    }

    fn set_created_at_if_missing(&self, id: &str, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let current: Option<Option<String>> = self
            .conn
            .query_row("SELECT created_at FROM students WHERE id = ?", [id], |r| r.get(0))
            .optional()?;
        let Some(current) = current else {
            return Ok(false);
        };
        if parse_timestamp(current.clone()).is_some() {
            return Ok(false);
        }
        // Only overwrite the exact value that was judged missing.
        let changed = self.conn.execute(
            "UPDATE students SET created_at = ? WHERE id = ? AND created_at IS ?",
            (format_timestamp(at), id, current),
        )?;
        Ok(changed > 0)
    }
}

impl CountService for SqliteStore {
    fn count(&self, filter: &CountFilter) -> Result<u64, StoreError> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut bind: Vec<Value> = Vec::new();
        if let Some(status) = filter.status {
            clauses.push("status = ?");
            bind.push(Value::Text(status.label().to_string()));
        }
        if let Some(coaching) = filter.coaching {
            clauses.push("coaching = ?");
            bind.push(Value::Text(coaching.label().to_string()));
        }
        if let Some((from, to)) = filter.membership_end_between {
            clauses.push("membership_end >= ? AND membership_end < ?");
            bind.push(Value::Text(format_timestamp(from)));
            bind.push(Value::Text(format_timestamp(to)));
        }

        let mut sql = "SELECT COUNT(*) FROM students".to_string();
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        let n: i64 = self
            .conn
            .query_row(&sql, params_from_iter(bind), |r| r.get(0))?;
        Ok(u64::try_from(n).unwrap_or(0))
    }
}
