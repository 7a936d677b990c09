//! redb-backed shift pointer cache
//!
//! Holds the client's best-known id of a possibly-open shift. This is a
//! hint to skip redundant round trips, not a lock: the server's answer
//! always wins, and the coordinator evicts the pointer the moment a
//! lookup says the shift is gone or closed.
//!
//! Concurrent writers (two console processes on the same cache file)
//! are out of scope; last-write-wins.

use redb::{Database, ReadableDatabase, TableDefinition};
use std::path::Path;
use thiserror::Error;

/// Single-slot table: key = "open_shift", value = shift id
const POINTER_TABLE: TableDefinition<&str, i64> = TableDefinition::new("shift_pointer");

const OPEN_SHIFT_KEY: &str = "open_shift";

/// Pointer cache errors
#[derive(Debug, Error)]
pub enum PointerCacheError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),
}

pub type PointerResult<T> = Result<T, PointerCacheError>;

/// Persistent single-slot cache of the open shift pointer
pub struct ShiftPointerCache {
    db: Database,
}

impl ShiftPointerCache {
    /// Open (or create) the cache file and ensure the table exists so
    /// reads never race table creation.
    pub fn open(path: impl AsRef<Path>) -> PointerResult<Self> {
        let db = Database::create(path)?;
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(POINTER_TABLE)?;
        }
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Best-known open shift id, if any
    pub fn get(&self) -> PointerResult<Option<i64>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(POINTER_TABLE)?;
        Ok(table.get(OPEN_SHIFT_KEY)?.map(|v| v.value()))
    }

    /// Remember `id` as the open shift
    pub fn set(&self, id: i64) -> PointerResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(POINTER_TABLE)?;
            table.insert(OPEN_SHIFT_KEY, id)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Forget the pointer
    pub fn clear(&self) -> PointerResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(POINTER_TABLE)?;
            table.remove(OPEN_SHIFT_KEY)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn set_get_clear_cycle() {
        let dir = TempDir::new().unwrap();
        let cache = ShiftPointerCache::open(dir.path().join("pointer.redb")).unwrap();

        assert_eq!(cache.get().unwrap(), None);

        cache.set(42).unwrap();
        assert_eq!(cache.get().unwrap(), Some(42));

        // Last write wins
        cache.set(7).unwrap();
        assert_eq!(cache.get().unwrap(), Some(7));

        cache.clear().unwrap();
        assert_eq!(cache.get().unwrap(), None);

        // Clearing an empty cache is a no-op, not an error
        cache.clear().unwrap();
        assert_eq!(cache.get().unwrap(), None);
    }

    #[test]
    fn pointer_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pointer.redb");

        {
            let cache = ShiftPointerCache::open(&path).unwrap();
            cache.set(99).unwrap();
        }

        let cache = ShiftPointerCache::open(&path).unwrap();
        assert_eq!(cache.get().unwrap(), Some(99));
    }
}
