//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::item::Item;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
///
/// Boards are kept as JSON so a save/load goes through the same
/// serialization a remote backend would.
#[derive(Default)]
pub struct MemoryStorage {
    boards: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl Storage for MemoryStorage {
    fn save(&self, board_id: &str, items: &[Item]) -> BoxFuture<'_, StorageResult<()>> {
        let board_id = board_id.to_string();
        let json = serde_json::to_string(items);
        Box::pin(async move {
            let json = json?;
            let mut boards = self.boards.write().map_err(lock_error)?;
            boards.insert(board_id, json);
            Ok(())
        })
    }

    fn load(&self, board_id: &str) -> BoxFuture<'_, StorageResult<Vec<Item>>> {
        let board_id = board_id.to_string();
        Box::pin(async move {
            let boards = self.boards.read().map_err(lock_error)?;
            let json = boards
                .get(&board_id)
                .ok_or_else(|| StorageError::NotFound(board_id.clone()))?;
            Ok(serde_json::from_str(json)?)
        })
    }

    fn delete(&self, board_id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let board_id = board_id.to_string();
        Box::pin(async move {
            let mut boards = self.boards.write().map_err(lock_error)?;
            boards.remove(&board_id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let boards = self.boards.read().map_err(lock_error)?;
            Ok(boards.keys().cloned().collect())
        })
    }

    fn exists(&self, board_id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let board_id = board_id.to_string();
        Box::pin(async move {
            let boards = self.boards.read().map_err(lock_error)?;
            Ok(boards.contains_key(&board_id))
        })
    }
}
