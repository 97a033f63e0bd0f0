//! Moodboard Core Library
//!
//! Platform-agnostic interaction core for the moodboard canvas: item model,
//! geometry, snapping, history, item mutators and the pointer state machine.
//! Hosts drive everything through [`Board::dispatch`].

pub mod board;
pub mod camera;
pub mod clipboard;
pub mod config;
pub mod geometry;
pub mod handles;
pub mod history;
pub mod input;
pub mod interaction;
pub mod item;
pub mod ops;
pub mod selection;
pub mod shortcuts;
pub mod snap;
pub mod storage;

pub use board::{Board, BoardEvent, Command};
pub use camera::Viewport;
pub use clipboard::Clipboard;
pub use config::{BoardConfig, ConfigError, ViewportConfig};
pub use geometry::{compute_bounding_box, constrain_to_bounds, hit_test};
pub use handles::{HandleKind, ResizeHandle, apply_resize, get_handles};
pub use history::{History, MAX_UNDO_HISTORY};
pub use input::{Key, Modifiers, MouseButton, PointerEvent};
pub use interaction::{Intent, Interaction, InteractionController, Tool};
pub use item::{GroupId, Item, ItemId, ItemKind, ItemPatch, MIN_ITEM_SIZE, NumericField};
pub use ops::{Alignment, Axis};
pub use selection::Selection;
pub use shortcuts::{ShortcutAction, ShortcutRegistry};
pub use snap::{AlignmentGuide, GRID_SIZE, SnapMode, snap, snap_angle};
pub use storage::{AutoSaveManager, MemoryStorage, Storage, StorageError};
