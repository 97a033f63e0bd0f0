//! Persistence of committed item lists.
//!
//! The board never awaits storage. A host feeds board events into an
//! [`AutoSaveManager`], which debounces them and writes through a [`Storage`].

mod autosave;
mod memory;

pub use autosave::{AutoSaveManager, DEFAULT_AUTOSAVE_DELAY_MS};
pub use memory::MemoryStorage;

use crate::item::Item;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Board not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Storage error: {0}")]
    Other(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// A backend holding one item list per board id.
///
/// On native platforms implementations must be Send + Sync. On WASM the
/// bounds are relaxed since it is single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait Storage: Send + Sync {
    /// Save the items of a board.
    fn save(&self, board_id: &str, items: &[Item]) -> BoxFuture<'_, StorageResult<()>>;

    /// Load the items of a board.
    fn load(&self, board_id: &str) -> BoxFuture<'_, StorageResult<Vec<Item>>>;

    fn delete(&self, board_id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all stored board ids.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    fn exists(&self, board_id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// A backend holding one item list per board id (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait Storage {
    /// Save the items of a board.
    fn save(&self, board_id: &str, items: &[Item]) -> BoxFuture<'_, StorageResult<()>>;

    /// Load the items of a board.
    fn load(&self, board_id: &str) -> BoxFuture<'_, StorageResult<Vec<Item>>>;

    fn delete(&self, board_id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all stored board ids.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    fn exists(&self, board_id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

#[cfg(test)]
pub(crate) fn block_on<F: std::future::Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
            return result;
        }
    }
}
