use coastle_engine::storage::KeyValueStore;
use redb::{Database, ReadableDatabase, TableDefinition};
use std::path::{Path, PathBuf};

const STATE_TABLE: TableDefinition<&str, &str> = TableDefinition::new("state");

/// Persistent key-value store for infinite-mode state, backed by redb.
pub struct RedbStore {
    db: Database,
    path: PathBuf,
}

impl RedbStore {
    pub fn open(path: &Path) -> Result<Self, String> {
        let db = Database::create(path)
            .map_err(|e| format!("Failed to open database at {}: {}", path.display(), e))?;

        // Ensure table exists
        let write_txn = db.begin_write().map_err(|e| e.to_string())?;
        {
            write_txn.open_table(STATE_TABLE).map_err(|e| e.to_string())?;
        }
        write_txn.commit().map_err(|e| e.to_string())?;

        Ok(RedbStore {
            db,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<String>, String> {
        let read_txn = self.db.begin_read().map_err(|e| e.to_string())?;
        let table = read_txn.open_table(STATE_TABLE).map_err(|e| e.to_string())?;

        let value = table.get(key).map_err(|e| e.to_string())?;
        Ok(value.map(|v| v.value().to_string()))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        let write_txn = self.db.begin_write().map_err(|e| e.to_string())?;
        {
            let mut table = write_txn.open_table(STATE_TABLE).map_err(|e| e.to_string())?;
            table.insert(key, value).map_err(|e| e.to_string())?;
        }
        write_txn.commit().map_err(|e| e.to_string())?;
        Ok(())
    }
}
