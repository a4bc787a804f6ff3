use super::{PersistenceResult, PlanStore};
use crate::blocks::{BlockRegistry, BlockedWeek};
use crate::calendar::Semester;
use crate::entry::Entry;
use crate::plan::SemesterPlan;
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use std::sync::Mutex;
use tracing::info;

pub struct SqlitePlanStore {
    connection: Mutex<Connection>,
}

impl SqlitePlanStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS plan_metadata (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                semester_json TEXT NOT NULL,
                meeting_counter INTEGER NOT NULL DEFAULT 0,
                block_counter INTEGER NOT NULL DEFAULT 0,
                entry_counter INTEGER NOT NULL DEFAULT 0
            );
            CREATE TABLE IF NOT EXISTS blocked_weeks (
                id INTEGER PRIMARY KEY,
                block_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS entries (
                position INTEGER PRIMARY KEY,
                entry_id INTEGER NOT NULL UNIQUE,
                entry_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn has_metadata(tx: &Transaction) -> PersistenceResult<bool> {
        let found: Option<i64> = tx
            .query_row("SELECT id FROM plan_metadata WHERE id = 1", [], |row| row.get(0))
            .optional()?;
        Ok(found.is_some())
    }

    fn save_metadata(tx: &Transaction, plan: &SemesterPlan) -> PersistenceResult<()> {
        let json = serde_json::to_string(plan.semester())?;
        tx.execute("DELETE FROM plan_metadata", [])?;
        tx.execute(
            "INSERT INTO plan_metadata (id, semester_json, meeting_counter, block_counter, entry_counter)
             VALUES (1, ?1, ?2, ?3, ?4)",
            params![
                json,
                plan.meeting_counter(),
                plan.block_counter(),
                plan.entry_counter()
            ],
        )?;
        Ok(())
    }

    fn save_blocks(tx: &Transaction, plan: &SemesterPlan) -> PersistenceResult<()> {
        tx.execute("DELETE FROM blocked_weeks", [])?;
        tx.execute(
            "UPDATE plan_metadata SET block_counter = ?1 WHERE id = 1",
            params![plan.block_counter()],
        )?;
        let mut stmt = tx.prepare("INSERT INTO blocked_weeks (id, block_json) VALUES (?1, ?2)")?;
        for block in plan.blocked_weeks().iter() {
            let json = serde_json::to_string(block)?;
            stmt.execute(params![block.id, json])?;
        }
        Ok(())
    }

    fn save_entry_rows(tx: &Transaction, plan: &SemesterPlan) -> PersistenceResult<()> {
        tx.execute("DELETE FROM entries", [])?;
        tx.execute(
            "UPDATE plan_metadata SET meeting_counter = ?1, entry_counter = ?2 WHERE id = 1",
            params![plan.meeting_counter(), plan.entry_counter()],
        )?;
        let mut stmt =
            tx.prepare("INSERT INTO entries (position, entry_id, entry_json) VALUES (?1, ?2, ?3)")?;
        for (position, entry) in plan.entries().iter().enumerate() {
            let json = serde_json::to_string(entry)?;
            stmt.execute(params![position as i64, entry.id, json])?;
        }
        Ok(())
    }

    fn write_all(tx: &Transaction, plan: &SemesterPlan) -> PersistenceResult<()> {
        Self::save_metadata(tx, plan)?;
        Self::save_blocks(tx, plan)?;
        Self::save_entry_rows(tx, plan)?;
        Ok(())
    }
}

impl PlanStore for SqlitePlanStore {
    fn load_plan(&self) -> PersistenceResult<Option<SemesterPlan>> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");

        let metadata: Option<(String, u32, u32, u32)> = conn
            .query_row(
                "SELECT semester_json, meeting_counter, block_counter, entry_counter
                 FROM plan_metadata WHERE id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;
        let Some((semester_json, meeting_counter, block_counter, entry_counter)) = metadata else {
            return Ok(None);
        };
        let semester: Semester = serde_json::from_str(&semester_json)?;

        let mut stmt = conn.prepare("SELECT block_json FROM blocked_weeks ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut blocks = Vec::new();
        for json in rows {
            let block: BlockedWeek = serde_json::from_str(&json?)?;
            blocks.push(block);
        }

        // Entries keep their on-screen row order.
        let mut stmt = conn.prepare("SELECT entry_json FROM entries ORDER BY position ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut entries = Vec::new();
        for json in rows {
            let entry: Entry = serde_json::from_str(&json?)?;
            entries.push(entry);
        }

        let mut plan = SemesterPlan::from_parts(semester, BlockRegistry::from_blocks(blocks), entries);
        plan.restore_counters(meeting_counter, block_counter, entry_counter);
        super::validate_plan(&plan)?;
        info!(entries = plan.entries().len(), "loaded semester plan from sqlite");
        Ok(Some(plan))
    }

    fn save_plan(&self, plan: &SemesterPlan) -> PersistenceResult<()> {
        super::validate_plan(plan)?;
        let mut conn = self.connection.lock().expect("sqlite mutex poisoned");
        let tx = conn.transaction()?;
        Self::write_all(&tx, plan)?;
        tx.commit()?;
        Ok(())
    }

    fn save_blocked_weeks(&self, plan: &SemesterPlan) -> PersistenceResult<()> {
        super::validate_plan(plan)?;
        let mut conn = self.connection.lock().expect("sqlite mutex poisoned");
        let tx = conn.transaction()?;
        if Self::has_metadata(&tx)? {
            Self::save_blocks(&tx, plan)?;
        } else {
            Self::write_all(&tx, plan)?;
        }
        tx.commit()?;
        info!(blocked_weeks = plan.blocked_weeks().len(), "saved blocked weeks to sqlite");
        Ok(())
    }

    fn save_entries(&self, plan: &SemesterPlan) -> PersistenceResult<()> {
        super::validate_plan(plan)?;
        let mut conn = self.connection.lock().expect("sqlite mutex poisoned");
        let tx = conn.transaction()?;
        if Self::has_metadata(&tx)? {
            Self::save_entry_rows(&tx, plan)?;
        } else {
            Self::write_all(&tx, plan)?;
        }
        tx.commit()?;
        info!(entries = plan.entries().len(), "saved entries to sqlite");
        Ok(())
    }
}
