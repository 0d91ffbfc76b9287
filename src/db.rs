use rusqlite::{params, Connection};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

pub const DB_FILE: &str = "timetable.sqlite3";

/// Key of a manual marker. `group: None` covers the whole class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarkKey {
    pub subject_id: String,
    pub class_id: String,
    pub group: Option<String>,
}

impl MarkKey {
    pub fn new(subject_id: &str, class_id: &str, group: Option<&str>) -> Self {
        Self {
            subject_id: subject_id.to_string(),
            class_id: class_id.to_string(),
            group: group
                .map(|g| g.trim().to_string())
                .filter(|g| !g.is_empty()),
        }
    }

    // Stored as '' so the primary key can cover it.
    fn group_column(&self) -> &str {
        self.group.as_deref().unwrap_or("")
    }
}

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS completion_marks(
            subject_id TEXT NOT NULL,
            class_id TEXT NOT NULL,
            grp TEXT NOT NULL DEFAULT '',
            marked_at TEXT NOT NULL,
            PRIMARY KEY(subject_id, class_id, grp)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_completion_marks_class ON completion_marks(class_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS payment_marks(
            subject_id TEXT NOT NULL,
            class_id TEXT NOT NULL,
            paid_at TEXT NOT NULL,
            PRIMARY KEY(subject_id, class_id)
        )",
        [],
    )?;

    Ok(conn)
}

fn now_ts() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

pub fn completion_set(conn: &Connection, key: &MarkKey, completed: bool) -> anyhow::Result<()> {
    if completed {
        conn.execute(
            "INSERT INTO completion_marks(subject_id, class_id, grp, marked_at)
             VALUES(?, ?, ?, ?)
             ON CONFLICT(subject_id, class_id, grp) DO NOTHING",
            params![key.subject_id, key.class_id, key.group_column(), now_ts()],
        )?;
    } else {
        conn.execute(
            "DELETE FROM completion_marks WHERE subject_id = ? AND class_id = ? AND grp = ?",
            params![key.subject_id, key.class_id, key.group_column()],
        )?;
    }
    Ok(())
}

pub fn completion_list(conn: &Connection, class_id: Option<&str>) -> anyhow::Result<Vec<MarkKey>> {
    let mut stmt = conn.prepare(
        "SELECT subject_id, class_id, grp
         FROM completion_marks
         WHERE ?1 IS NULL OR class_id = ?1
         ORDER BY class_id, subject_id, grp",
    )?;
    let rows = stmt
        .query_map([class_id], |r| {
            let grp: String = r.get(2)?;
            Ok(MarkKey {
                subject_id: r.get(0)?,
                class_id: r.get(1)?,
                group: if grp.is_empty() { None } else { Some(grp) },
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn payment_set(conn: &Connection, subject_id: &str, class_id: &str, paid: bool) -> anyhow::Result<()> {
    if paid {
        conn.execute(
            "INSERT INTO payment_marks(subject_id, class_id, paid_at)
             VALUES(?, ?, ?)
             ON CONFLICT(subject_id, class_id) DO NOTHING",
            params![subject_id, class_id, now_ts()],
        )?;
    } else {
        conn.execute(
            "DELETE FROM payment_marks WHERE subject_id = ? AND class_id = ?",
            params![subject_id, class_id],
        )?;
    }
    Ok(())
}

pub fn payment_list(conn: &Connection) -> anyhow::Result<Vec<(String, String)>> {
    let mut stmt = conn.prepare(
        "SELECT subject_id, class_id FROM payment_marks ORDER BY class_id, subject_id",
    )?;
    let rows = stmt
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
