//! Staff repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist staff records together with their schedule entries.
//! - Answer bulk lookups by role, specialty and availability window.
//!
//! # Invariants
//! - `save` replaces the full entry set of a record in one transaction.
//! - `add_entry` / `remove_entry` touch one row and re-read the stored
//!   schedule inside an immediate transaction, so writers on different
//!   connections are serialized per database.
//! - `delete` removes entries, then the staff row, in one transaction.
//! - The window filter uses half-open semantics: touching never matches.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::staff::{EntryId, Role, ScheduleEntry, Specialty, StaffId, StaffRecord};
use crate::schedule::interval::TimeInterval;
use crate::schedule::store::{ScheduleError, ScheduleStore};
use chrono::NaiveDateTime;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Fixed-width nanosecond text form; lexicographic order equals time order.
const INSTANT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.9f";
const INSTANT_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

const STAFF_SELECT_SQL: &str = "SELECT
    id,
    display_name,
    role,
    specialty,
    active
FROM staff";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for staff persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(StaffId),
    /// Schedule to save, or loaded from disk, breaks schedule invariants.
    InvalidSchedule(ScheduleError),
    /// Single-entry write refused against the stored schedule.
    Rejected(ScheduleError),
    /// Persisted row cannot be converted to a valid record.
    InvalidData(String),
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "staff not found: {id}"),
            Self::InvalidSchedule(err) => write!(f, "schedule violates invariants: {err}"),
            Self::Rejected(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted staff data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "staff repository requires table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidSchedule(err) | Self::Rejected(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence contract consumed by the staff directory.
pub trait StaffRepository {
    fn find_by_id(&self, id: &str) -> RepoResult<Option<StaffRecord>>;
    fn exists_by_id(&self, id: &str) -> RepoResult<bool>;
    /// Inserts or replaces the record and its whole schedule.
    fn save(&mut self, record: &StaffRecord) -> RepoResult<()>;
    /// Inserts or updates the staff row only; stored entries are kept.
    fn save_profile(&mut self, record: &StaffRecord) -> RepoResult<()>;
    /// Appends one entry after checking it against the stored schedule.
    ///
    /// # Errors
    /// - `NotFound` when no staff row exists.
    /// - `Rejected` with `InvalidInterval`, `OverlapConflict` or
    ///   `DuplicateEntry`.
    fn add_entry(&mut self, staff_id: &str, entry: &ScheduleEntry) -> RepoResult<()>;
    /// Removes one entry; `Rejected(EntryNotFound)` when it is not stored.
    fn remove_entry(&mut self, staff_id: &str, entry_id: EntryId) -> RepoResult<()>;
    /// Deletes the record and cascades its entries.
    fn delete(&mut self, id: &str) -> RepoResult<()>;
    /// All records ordered by id.
    fn list_staff(&self) -> RepoResult<Vec<StaffRecord>>;
    fn find_by_role(&self, role: Role) -> RepoResult<Vec<StaffRecord>>;
    fn find_by_specialty(&self, specialty: Specialty) -> RepoResult<Vec<StaffRecord>>;
    /// Case-insensitive substring match on the specialty text.
    fn find_by_specialty_keyword(&self, keyword: &str) -> RepoResult<Vec<StaffRecord>>;
    /// Staff with at least one entry overlapping `window`.
    fn find_available_between(&self, window: &TimeInterval) -> RepoResult<Vec<StaffRecord>>;
}

/// SQLite-backed staff repository.
pub struct SqliteStaffRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteStaffRepository<'conn> {
    /// Wraps a migrated connection, failing fast when tables are missing.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        for table in ["staff", "schedule_entries"] {
            if !table_exists(conn, table)? {
                return Err(RepoError::MissingRequiredTable(table));
            }
        }
        Ok(Self { conn })
    }

    fn query_staff(&self, where_sql: &str, bind_values: Vec<Value>) -> RepoResult<Vec<StaffRecord>> {
        let sql = format!("{STAFF_SELECT_SQL} {where_sql} ORDER BY id ASC;");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_staff_row(self.conn, row)?);
        }
        Ok(records)
    }
}

impl StaffRepository for SqliteStaffRepository<'_> {
    fn find_by_id(&self, id: &str) -> RepoResult<Option<StaffRecord>> {
        let mut records = self.query_staff("WHERE id = ?", vec![Value::Text(id.to_string())])?;
        Ok(records.pop())
    }

    fn exists_by_id(&self, id: &str) -> RepoResult<bool> {
        staff_row_exists(self.conn, id)
    }

    fn save(&mut self, record: &StaffRecord) -> RepoResult<()> {
        ScheduleStore::from_entries(record.schedule.iter().copied())
            .map_err(RepoError::InvalidSchedule)?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        upsert_staff_row(&tx, record)?;
        tx.execute(
            "DELETE FROM schedule_entries WHERE staff_id = ?1;",
            [record.id.as_str()],
        )?;
        for entry in &record.schedule {
            insert_entry_row(&tx, &record.id, entry)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn save_profile(&mut self, record: &StaffRecord) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        upsert_staff_row(&tx, record)?;
        tx.commit()?;
        Ok(())
    }

    fn add_entry(&mut self, staff_id: &str, entry: &ScheduleEntry) -> RepoResult<()> {
        // Immediate takes the write lock up front: the read-check-insert
        // below cannot interleave with another connection's writer.
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !staff_row_exists(&tx, staff_id)? {
            return Err(RepoError::NotFound(staff_id.to_string()));
        }

        let mut stored = ScheduleStore::from_entries(load_entries(&tx, staff_id)?)
            .map_err(RepoError::InvalidSchedule)?;
        stored.insert(*entry).map_err(RepoError::Rejected)?;

        insert_entry_row(&tx, staff_id, entry)?;
        tx.commit()?;
        Ok(())
    }

    fn remove_entry(&mut self, staff_id: &str, entry_id: EntryId) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !staff_row_exists(&tx, staff_id)? {
            return Err(RepoError::NotFound(staff_id.to_string()));
        }

        let changed = tx.execute(
            "DELETE FROM schedule_entries WHERE id = ?1 AND staff_id = ?2;",
            params![entry_id.to_string(), staff_id],
        )?;
        if changed == 0 {
            return Err(RepoError::Rejected(ScheduleError::EntryNotFound(entry_id)));
        }
        tx.commit()?;
        Ok(())
    }

    fn delete(&mut self, id: &str) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        // Entries go first: the foreign key forbids orphaning them.
        tx.execute("DELETE FROM schedule_entries WHERE staff_id = ?1;", [id])?;
        let changed = tx.execute("DELETE FROM staff WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }
        tx.commit()?;
        Ok(())
    }

    fn list_staff(&self) -> RepoResult<Vec<StaffRecord>> {
        self.query_staff("", Vec::new())
    }

    fn find_by_role(&self, role: Role) -> RepoResult<Vec<StaffRecord>> {
        self.query_staff(
            "WHERE role = ?",
            vec![Value::Text(role.as_str().to_string())],
        )
    }

    fn find_by_specialty(&self, specialty: Specialty) -> RepoResult<Vec<StaffRecord>> {
        self.query_staff(
            "WHERE specialty = ?",
            vec![Value::Text(specialty.as_str().to_string())],
        )
    }

    fn find_by_specialty_keyword(&self, keyword: &str) -> RepoResult<Vec<StaffRecord>> {
        let pattern = format!("%{}%", escape_like(keyword.trim()));
        self.query_staff(
            "WHERE specialty IS NOT NULL AND specialty LIKE ? ESCAPE '\\'",
            vec![Value::Text(pattern)],
        )
    }

    fn find_available_between(&self, window: &TimeInterval) -> RepoResult<Vec<StaffRecord>> {
        if !window.is_valid() {
            return Ok(Vec::new());
        }
        self.query_staff(
            "WHERE EXISTS (
                SELECT 1
                FROM schedule_entries e
                WHERE e.staff_id = staff.id
                  AND e.start_at < ?
                  AND e.end_at > ?
            )",
            vec![
                Value::Text(format_instant(window.end)),
                Value::Text(format_instant(window.start)),
            ],
        )
    }
}

fn parse_staff_row(conn: &Connection, row: &Row<'_>) -> RepoResult<StaffRecord> {
    let id: String = row.get("id")?;

    let role_text: String = row.get("role")?;
    let role = Role::parse(&role_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid role `{role_text}` in staff.role"))
    })?;

    let specialty = match row.get::<_, Option<String>>("specialty")? {
        Some(value) => Some(Specialty::parse(&value).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid specialty `{value}` in staff.specialty"))
        })?),
        None => None,
    };

    let active = match row.get::<_, i64>("active")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid active value `{other}` in staff.active"
            )));
        }
    };

    let schedule = load_entries(conn, &id)?;
    Ok(StaffRecord {
        id,
        display_name: row.get("display_name")?,
        role,
        specialty,
        active,
        schedule,
    })
}

fn load_entries(conn: &Connection, staff_id: &str) -> RepoResult<Vec<ScheduleEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, start_at, end_at
         FROM schedule_entries
         WHERE staff_id = ?1
         ORDER BY start_at ASC, id ASC;",
    )?;
    let mut rows = stmt.query([staff_id])?;
    let mut entries = Vec::new();
    while let Some(row) = rows.next()? {
        let id_text: String = row.get("id")?;
        let id = Uuid::parse_str(&id_text).map_err(|_| {
            RepoError::InvalidData(format!("invalid uuid `{id_text}` in schedule_entries.id"))
        })?;
        let start = parse_instant(&row.get::<_, String>("start_at")?)?;
        let end = parse_instant(&row.get::<_, String>("end_at")?)?;
        entries.push(ScheduleEntry::with_id(id, TimeInterval::new(start, end)));
    }

    // Same checks as the in-memory store; a corrupted file must not load.
    let store = ScheduleStore::from_entries(entries).map_err(RepoError::InvalidSchedule)?;
    Ok(store.entries().to_vec())
}

fn upsert_staff_row(conn: &Connection, record: &StaffRecord) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO staff (id, display_name, role, specialty, active)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT (id) DO UPDATE SET
            display_name = excluded.display_name,
            role = excluded.role,
            specialty = excluded.specialty,
            active = excluded.active,
            updated_at = (strftime('%s', 'now') * 1000);",
        params![
            record.id.as_str(),
            record.display_name.as_str(),
            record.role.as_str(),
            record.specialty.map(Specialty::as_str),
            bool_to_int(record.active),
        ],
    )?;
    Ok(())
}

fn insert_entry_row(conn: &Connection, staff_id: &str, entry: &ScheduleEntry) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO schedule_entries (id, staff_id, start_at, end_at)
         VALUES (?1, ?2, ?3, ?4);",
        params![
            entry.id.to_string(),
            staff_id,
            format_instant(entry.start),
            format_instant(entry.end),
        ],
    )?;
    Ok(())
}

fn staff_row_exists(conn: &Connection, id: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM staff WHERE id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn format_instant(instant: NaiveDateTime) -> String {
    instant.format(INSTANT_FORMAT).to_string()
}

fn parse_instant(value: &str) -> RepoResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, INSTANT_PARSE_FORMAT)
        .map_err(|err| RepoError::InvalidData(format!("invalid instant `{value}`: {err}")))
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
