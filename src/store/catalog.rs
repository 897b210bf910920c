//! Catalog
//!
//! The logical contents of a store: at most one database holding at most
//! one `messages` table. Every mutation goes through `apply`, which
//! validates the whole operation before touching anything.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{LineCmdError, Result};

/// Name of the logical database
pub const DATABASE_NAME: &str = "test";

/// Name of the single table
pub const TABLE_NAME: &str = "messages";

/// Maximum record text length, in characters
pub const MAX_TEXT_LEN: usize = 256;

/// A mutation of the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    CreateDatabase { owner: String },
    DropDatabase,

    /// Idempotent while the database exists
    CreateTable,
    DropTable,

    /// `created` is unix millis, fixed when the operation is built
    Insert { text: String, created: u64 },
}

impl Operation {
    pub fn insert(text: &str) -> Self {
        Operation::Insert {
            text: text.to_string(),
            created: now_millis(),
        }
    }
}

/// A row of the `messages` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: u64,
    pub created: u64,
    pub text: String,
}

#[derive(Debug, Default)]
struct Table {
    rows: Vec<Record>,
    next_id: u64,
}

#[derive(Debug)]
struct Database {
    owner: String,
    table: Option<Table>,
}

/// In-memory catalog state
#[derive(Debug, Default)]
pub struct Catalog {
    database: Option<Database>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that `op` would succeed without applying it
    pub fn validate(&self, op: &Operation) -> Result<()> {
        match op {
            Operation::CreateDatabase { .. } => {
                if self.database.is_some() {
                    return Err(LineCmdError::DatabaseExists(DATABASE_NAME.to_string()));
                }
            }
            Operation::DropDatabase | Operation::CreateTable => {
                self.database()?;
            }
            Operation::DropTable => {
                self.table()?;
            }
            Operation::Insert { text, .. } => {
                self.table()?;
                let len = text.chars().count();
                if len > MAX_TEXT_LEN {
                    return Err(LineCmdError::RecordTooLong { len, max: MAX_TEXT_LEN });
                }
            }
        }
        Ok(())
    }

    /// Validate and apply `op`. On error the catalog is unchanged.
    pub fn apply(&mut self, op: Operation) -> Result<()> {
        self.validate(&op)?;

        match op {
            Operation::CreateDatabase { owner } => {
                self.database = Some(Database { owner, table: None });
            }
            Operation::DropDatabase => {
                self.database = None;
            }
            Operation::CreateTable => {
                if let Some(db) = self.database.as_mut() {
                    db.table.get_or_insert_with(|| Table { rows: Vec::new(), next_id: 1 });
                }
            }
            Operation::DropTable => {
                if let Some(db) = self.database.as_mut() {
                    db.table = None;
                }
            }
            Operation::Insert { text, created } => {
                if let Some(table) = self.database.as_mut().and_then(|db| db.table.as_mut()) {
                    let id = table.next_id;
                    table.next_id += 1;
                    table.rows.push(Record { id, created, text });
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn has_database(&self) -> bool {
        self.database.is_some()
    }

    pub fn has_table(&self) -> bool {
        self.database.as_ref().map_or(false, |db| db.table.is_some())
    }

    /// Owner recorded when the database was created
    pub fn owner(&self) -> Option<&str> {
        self.database.as_ref().map(|db| db.owner.as_str())
    }

    /// Rows of the table in insertion order (empty without a table)
    pub fn records(&self) -> &[Record] {
        self.database
            .as_ref()
            .and_then(|db| db.table.as_ref())
            .map(|t| t.rows.as_slice())
            .unwrap_or(&[])
    }

    fn database(&self) -> Result<&Database> {
        self.database
            .as_ref()
            .ok_or_else(|| LineCmdError::DatabaseNotFound(DATABASE_NAME.to_string()))
    }

    fn table(&self) -> Result<&Table> {
        self.database()?
            .table
            .as_ref()
            .ok_or_else(|| LineCmdError::TableNotFound(format!("{}.{}", DATABASE_NAME, TABLE_NAME)))
    }
}

/// Current unix time in milliseconds
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
