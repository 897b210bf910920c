//! In-memory store
//!
//! Catalog behind a mutex; each operation holds the lock for its whole
//! validate-and-apply step.

use parking_lot::Mutex;

use crate::error::Result;

use super::{BackingService, Catalog, Operation, Record};

/// Non-durable `BackingService`
pub struct MemoryStore {
    catalog: Mutex<Catalog>,
    owner: String,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_owner("linecmd")
    }

    /// Store recording `owner` on database creation
    pub fn with_owner(owner: impl Into<String>) -> Self {
        Self {
            catalog: Mutex::new(Catalog::new()),
            owner: owner.into(),
        }
    }

    fn commit(&self, op: Operation) -> Result<()> {
        self.catalog.lock().apply(op)
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    pub fn has_database(&self) -> bool {
        self.catalog.lock().has_database()
    }

    pub fn has_table(&self) -> bool {
        self.catalog.lock().has_table()
    }

    /// Snapshot of the table rows
    pub fn records(&self) -> Vec<Record> {
        self.catalog.lock().records().to_vec()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BackingService for MemoryStore {
    fn create_database(&self) -> Result<()> {
        self.commit(Operation::CreateDatabase {
            owner: self.owner.clone(),
        })
    }

    fn drop_database(&self) -> Result<()> {
        self.commit(Operation::DropDatabase)
    }

    fn create_table(&self) -> Result<()> {
        self.commit(Operation::CreateTable)
    }

    fn drop_table(&self) -> Result<()> {
        self.commit(Operation::DropTable)
    }

    fn insert_record(&self, text: &str) -> Result<()> {
        self.commit(Operation::insert(text))
    }
}
