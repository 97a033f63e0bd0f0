//! Debounced auto-save of committed board states.

use crate::board::{Board, BoardEvent};
use crate::item::Item;
use crate::storage::{Storage, StorageResult};
use std::sync::Arc;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Quiet period after the last committed change before saving.
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 1000;

/// Saves a board once its committed state has settled.
///
/// Only committed changes mark the board dirty; intermediate drag frames
/// never reach storage. Each new commit restarts the quiet period.
pub struct AutoSaveManager<S: Storage> {
    storage: Arc<S>,
    board_id: String,
    delay: Duration,
    /// Time of the most recent committed change not yet saved.
    dirty_since: Option<Instant>,
    last_save: Option<Instant>,
}

impl<S: Storage> AutoSaveManager<S> {
    /// Create a manager saving `board_id` into `storage`.
    pub fn new(storage: Arc<S>, board_id: impl Into<String>) -> Self {
        Self {
            storage,
            board_id: board_id.into(),
            delay: Duration::from_millis(DEFAULT_AUTOSAVE_DELAY_MS),
            dirty_since: None,
            last_save: None,
        }
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn board_id(&self) -> &str {
        &self.board_id
    }

    /// Record a committed change, restarting the quiet period.
    pub fn mark_dirty(&mut self) {
        self.dirty_since = Some(Instant::now());
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty_since.is_some()
    }

    pub fn last_save(&self) -> Option<Instant> {
        self.last_save
    }

    /// Mark dirty if the events contain a committed item change.
    pub fn observe(&mut self, events: &[BoardEvent]) -> bool {
        let committed = events
            .iter()
            .any(|event| matches!(event, BoardEvent::ItemsChanged { committed: true }));
        if committed {
            self.mark_dirty();
        }
        committed
    }

    /// Dirty and quiet for at least the delay.
    pub fn should_save(&self) -> bool {
        self.dirty_since
            .is_some_and(|since| since.elapsed() >= self.delay)
    }

    /// Save if the debounce has elapsed. Returns whether a save happened.
    pub async fn maybe_save(&mut self, board: &Board) -> StorageResult<bool> {
        if !self.should_save() {
            return Ok(false);
        }
        self.save(board).await?;
        Ok(true)
    }

    /// Save immediately.
    pub async fn save(&mut self, board: &Board) -> StorageResult<()> {
        let items = board.snapshot();
        self.storage.save(&self.board_id, &items).await?;
        self.last_save = Some(Instant::now());
        self.dirty_since = None;
        log::info!("Autosaved board {} ({} items)", self.board_id, items.len());
        Ok(())
    }

    /// Load the stored items of this board.
    pub async fn load(&mut self) -> StorageResult<Vec<Item>> {
        let items = self.storage.load(&self.board_id).await?;
        self.dirty_since = None;
        self.last_save = Some(Instant::now());
        Ok(items)
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}
