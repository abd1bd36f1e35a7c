use rusqlite::Connection;
use std::path::Path;

pub const DB_FILE: &str = "roster.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(db_path)?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> anyhow::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS students(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            age INTEGER,
            email TEXT NOT NULL DEFAULT '',
            coaching TEXT NOT NULL DEFAULT 'Coach',
            status TEXT NOT NULL DEFAULT 'Inactive',
            plan TEXT NOT NULL DEFAULT 'Monthly',
            membership_start TEXT,
            membership_end TEXT,
            created_at TEXT,
            updated_at TEXT
        )",
        [],
    )?;

    // Rosters created before membership plans existed only carry the contact
    // columns. Add the rest; created_at stays NULL until the startup backfill.
    ensure_students_membership_columns(conn)?;
    ensure_students_timestamps(conn)?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_students_created ON students(created_at, id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_students_membership_end ON students(membership_end)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS staff_accounts(
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE COLLATE NOCASE,
            display_name TEXT,
            password_salt TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

fn ensure_students_membership_columns(conn: &Connection) -> anyhow::Result<()> {
    if !table_has_column(conn, "students", "plan")? {
        conn.execute(
            "ALTER TABLE students ADD COLUMN plan TEXT NOT NULL DEFAULT 'Monthly'",
            [],
        )?;
    }
    if !table_has_column(conn, "students", "membership_start")? {
        conn.execute("ALTER TABLE students ADD COLUMN membership_start TEXT", [])?;
    }
    if !table_has_column(conn, "students", "membership_end")? {
        conn.execute("ALTER TABLE students ADD COLUMN membership_end TEXT", [])?;
    }
    Ok(())
}

fn ensure_students_timestamps(conn: &Connection) -> anyhow::Result<()> {
    if !table_has_column(conn, "students", "created_at")? {
        conn.execute("ALTER TABLE students ADD COLUMN created_at TEXT", [])?;
    }
    if !table_has_column(conn, "students", "updated_at")? {
        conn.execute("ALTER TABLE students ADD COLUMN updated_at TEXT", [])?;
    }
    Ok(())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> anyhow::Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
