//! Board state and command dispatch.

use crate::camera::Viewport;
use crate::clipboard::Clipboard;
use crate::config::BoardConfig;
use crate::geometry::{compute_bounding_box, hit_test};
use crate::history::History;
use crate::input::{Key, Modifiers, PointerEvent};
use crate::interaction::{Intent, Interaction, InteractionContext, InteractionController, Tool};
use crate::item::{Item, ItemId, ItemList, ItemPatch, NumericField, find_item, parse_numeric};
use crate::ops::{self, Alignment, Axis};
use crate::selection::Selection;
use crate::shortcuts::{ShortcutAction, ShortcutRegistry};
use crate::snap::{AlignmentGuide, SnapMode};
use kurbo::{Rect, Size, Vec2};
use std::collections::HashSet;
use std::sync::Arc;

/// Everything a host can ask the board to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Pointer(PointerEvent),
    KeyDown { key: Key, modifiers: Modifiers },
    KeyUp { key: Key },
    /// Insert new items on top of the stack and select them.
    AddItems(Vec<Item>),
    UpdateItem {
        id: ItemId,
        changes: ItemPatch,
        commit: bool,
    },
    UpdateItems {
        updates: Vec<(ItemId, ItemPatch)>,
        commit: bool,
    },
    /// Set a numeric property from raw text; unparsable input is ignored.
    SetNumericField {
        id: ItemId,
        field: NumericField,
        raw: String,
    },
    Delete(Vec<ItemId>),
    DeleteSelected,
    DuplicateSelected,
    BringToFront,
    SendToBack,
    BringForward,
    SendBackward,
    Reorder(Vec<(ItemId, i64)>),
    GroupSelected,
    UngroupSelected,
    Align(Alignment),
    Distribute(Axis),
    Select { id: ItemId, additive: bool },
    SelectAll,
    ClearSelection,
    Copy,
    Cut,
    Paste,
    Undo,
    Redo,
    BeginTextEdit(ItemId),
    /// Replace the live text of the open editor.
    EditText(String),
    CommitTextEdit,
    CancelTextEdit,
    /// Fit the whole board into a container of this screen size.
    FitToBoard { container: Size },
    SetTool(Tool),
    SetSnapMode(SnapMode),
}

/// Notifications for the host after a command.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardEvent {
    /// The item list changed. `committed` means it now matches a history entry.
    ItemsChanged { committed: bool },
    ItemsAdded(Vec<ItemId>),
    SelectionChanged,
    GuidesChanged,
    TextEditStarted(ItemId),
    TextEditEnded { id: ItemId, committed: bool },
    ViewportChanged,
    NothingToUndo,
    NothingToRedo,
}

#[derive(Debug, Clone)]
struct TextEdit {
    id: ItemId,
    buffer: String,
}

/// A moodboard: items plus everything needed to edit them.
#[derive(Debug, Clone)]
pub struct Board {
    items: ItemList,
    history: History<ItemList>,
    selection: Selection,
    clipboard: Clipboard,
    viewport: Viewport,
    controller: InteractionController,
    text_edit: Option<TextEdit>,
    guides: Option<Vec<AlignmentGuide>>,
    tool: Tool,
    config: BoardConfig,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Repair loaded items: unique ids, finite positions, sizes above the floor.
fn normalize_items(items: impl IntoIterator<Item = Item>, min_size: f64) -> ItemList {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|mut item| {
            if !seen.insert(item.id()) {
                let old = item.id();
                item.regenerate_id();
                seen.insert(item.id());
                log::warn!("Duplicate item id {} replaced with {}", old, item.id());
            }
            if !item.position.x.is_finite() || !item.position.y.is_finite() {
                log::warn!("Item {} had a non-finite position, moved to origin", item.id());
                item.position.x = 0.0;
                item.position.y = 0.0;
            }
            if !item.rotation.is_finite() {
                item.rotation = 0.0;
            }
            item.size = Size::new(
                item.size.width.max(min_size),
                item.size.height.max(min_size),
            );
            Arc::new(item)
        })
        .collect()
}

impl Board {
    /// Create an empty board with the default configuration.
    pub fn new() -> Self {
        Self::with_config(BoardConfig::default())
    }

    pub fn with_config(config: BoardConfig) -> Self {
        Self::from_items(Vec::new(), config)
    }

    /// Create a board from stored items.
    pub fn from_items(items: impl IntoIterator<Item = Item>, config: BoardConfig) -> Self {
        let items = normalize_items(items, config.min_item_size);
        log::info!("Board opened with {} items", items.len());
        Self {
            history: History::new(items.clone(), config.history_capacity),
            items,
            selection: Selection::new(),
            clipboard: Clipboard::new(),
            viewport: Viewport::from_config(&config.viewport),
            controller: InteractionController::new(),
            text_edit: None,
            guides: None,
            tool: Tool::default(),
            config,
        }
    }

    /// Replace every item and start a fresh history.
    pub fn load(&mut self, items: impl IntoIterator<Item = Item>) -> Vec<BoardEvent> {
        let mut events = Vec::new();
        self.abort_gestures(&mut events);
        self.items = normalize_items(items, self.config.min_item_size);
        self.history.reset(self.items.clone());
        events.push(BoardEvent::ItemsChanged { committed: true });
        if self.selection.clear() {
            events.push(BoardEvent::SelectionChanged);
        }
        events
    }

    pub fn items(&self) -> &[Arc<Item>] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        find_item(&self.items, id).map(|item| item.as_ref())
    }

    /// Owned copies of every item, for saving.
    pub fn snapshot(&self) -> Vec<Item> {
        self.items.iter().map(|item| (**item).clone()).collect()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected_items(&self) -> Vec<&Item> {
        self.selection
            .ids()
            .iter()
            .filter_map(|&id| self.item(id))
            .collect()
    }

    /// Bounding box of the selection, for the multi-select frame.
    pub fn selection_bounds(&self) -> Option<Rect> {
        compute_bounding_box(self.selected_items())
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn guides(&self) -> Option<&[AlignmentGuide]> {
        self.guides.as_deref()
    }

    pub fn interaction(&self) -> &Interaction {
        self.controller.state()
    }

    pub fn rubber_band_rect(&self) -> Option<Rect> {
        self.controller.rubber_band_rect()
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Item whose inline editor is open.
    pub fn editing(&self) -> Option<ItemId> {
        self.text_edit.as_ref().map(|edit| edit.id)
    }

    pub fn text_edit_buffer(&self) -> Option<&str> {
        self.text_edit.as_ref().map(|edit| edit.buffer.as_str())
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Run one command and report what changed.
    pub fn dispatch(&mut self, command: Command) -> Vec<BoardEvent> {
        let mut events = Vec::new();
        log::trace!("Dispatch {:?}", command);
        match command {
            Command::Pointer(event) => self.handle_pointer(event, &mut events),
            Command::KeyDown { key, modifiers } => {
                self.handle_key_down(key, modifiers, &mut events)
            }
            Command::KeyUp { key } => {
                if key == Key::Space {
                    self.viewport.set_temporary_pan(false);
                }
            }
            Command::AddItems(items) => self.add_items(items, &mut events),
            Command::UpdateItem { id, changes, commit } => {
                self.apply_updates(vec![(id, changes)], commit, &mut events)
            }
            Command::UpdateItems { updates, commit } => {
                self.apply_updates(updates, commit, &mut events)
            }
            Command::SetNumericField { id, field, raw } => {
                let Some(current) = self.item(id).map(|item| field.current(item)) else {
                    return events;
                };
                let value = parse_numeric(&raw, current);
                self.apply_updates(vec![(id, field.patch(value))], true, &mut events);
            }
            Command::Delete(ids) => self.delete(&ids, &mut events),
            Command::DeleteSelected => {
                let ids: Vec<ItemId> = self
                    .selected_items()
                    .into_iter()
                    .filter(|item| !item.locked)
                    .map(Item::id)
                    .collect();
                self.delete(&ids, &mut events);
            }
            Command::DuplicateSelected => self.duplicate_selected(&mut events),
            Command::BringToFront => self.restack(ops::bring_to_front, &mut events),
            Command::SendToBack => self.restack(ops::send_to_back, &mut events),
            Command::BringForward => self.restack(ops::bring_forward, &mut events),
            Command::SendBackward => self.restack(ops::send_backward, &mut events),
            Command::Reorder(updates) => {
                let next = ops::reorder_z(&self.items, &updates);
                self.replace_items(next, true, &mut events);
            }
            Command::GroupSelected => {
                if let Some((next, group)) = ops::group_items(&self.items, self.selection.ids()) {
                    log::info!("Created group {}", group);
                    self.replace_items(next, true, &mut events);
                }
            }
            Command::UngroupSelected => {
                let next = ops::ungroup_items(&self.items, self.selection.ids());
                self.replace_items(next, true, &mut events);
            }
            Command::Align(alignment) => {
                let next = ops::align_items(&self.items, self.selection.ids(), alignment);
                self.replace_items(next, true, &mut events);
            }
            Command::Distribute(axis) => {
                let next = ops::distribute_items(&self.items, self.selection.ids(), axis);
                self.replace_items(next, true, &mut events);
            }
            Command::Select { id, additive } => {
                self.apply_intents(vec![Intent::Select { id, additive }], &mut events)
            }
            Command::SelectAll => {
                if self.selection.select_all(&self.items) {
                    events.push(BoardEvent::SelectionChanged);
                }
            }
            Command::ClearSelection => {
                if self.selection.clear() {
                    events.push(BoardEvent::SelectionChanged);
                }
            }
            Command::Copy => {
                self.copy_selected();
            }
            Command::Cut => {
                let ids: Vec<ItemId> = self
                    .copy_selected()
                    .into_iter()
                    .filter(|&id| self.item(id).is_some_and(|item| !item.locked))
                    .collect();
                self.delete(&ids, &mut events);
            }
            Command::Paste => self.paste(&mut events),
            Command::Undo => self.undo(&mut events),
            Command::Redo => self.redo(&mut events),
            Command::BeginTextEdit(id) => self.begin_text_edit(id, &mut events),
            Command::EditText(text) => {
                if let Some(edit) = self.text_edit.as_mut() {
                    edit.buffer = text;
                }
            }
            Command::CommitTextEdit => self.commit_text_edit(&mut events),
            Command::CancelTextEdit => self.cancel_text_edit(&mut events),
            Command::FitToBoard { container } => {
                if self.viewport.fit_to_bounds(self.config.board_size, container) {
                    events.push(BoardEvent::ViewportChanged);
                }
            }
            Command::SetTool(tool) => {
                if self.tool != tool {
                    self.controller.reset();
                    self.tool = tool;
                }
            }
            Command::SetSnapMode(mode) => self.config.snap_mode = mode,
        }
        events
    }

    fn handle_pointer(&mut self, event: PointerEvent, events: &mut Vec<BoardEvent>) {
        if let PointerEvent::Wheel {
            position,
            delta,
            modifiers,
        } = event
        {
            if self.viewport.handle_wheel(position, delta, modifiers) {
                events.push(BoardEvent::ViewportChanged);
            }
            return;
        }

        // Pressing anywhere outside the edited item closes the editor.
        if let (PointerEvent::Down { position, .. }, Some(editing)) = (event, self.editing()) {
            let canvas = self.viewport.screen_to_canvas(position);
            if hit_test(&self.items, canvas) != Some(editing) {
                self.commit_text_edit(events);
            }
        }

        let ctx = InteractionContext {
            items: &self.items,
            selection: &self.selection,
            viewport: &self.viewport,
            config: &self.config,
            editing: self.text_edit.as_ref().map(|edit| edit.id),
            tool: self.tool,
        };
        let intents = match event {
            PointerEvent::Down {
                position,
                button,
                modifiers,
            } => self.controller.pointer_down(&ctx, position, button, modifiers),
            PointerEvent::Move {
                position,
                modifiers,
            } => self.controller.pointer_move(&ctx, position, modifiers),
            PointerEvent::Up {
                position,
                modifiers,
            } => self.controller.pointer_up(&ctx, position, modifiers),
            PointerEvent::Click {
                position,
                modifiers,
            } => self.controller.click(&ctx, position, modifiers),
            PointerEvent::DoubleClick { position } => self.controller.double_click(&ctx, position),
            PointerEvent::Wheel { .. } => Vec::new(),
        };
        self.apply_intents(intents, events);
    }

    fn handle_key_down(&mut self, key: Key, modifiers: Modifiers, events: &mut Vec<BoardEvent>) {
        if self.text_edit.is_some() {
            match key {
                Key::Escape => self.cancel_text_edit(events),
                Key::Enter if !modifiers.shift => self.commit_text_edit(events),
                _ => {}
            }
            return;
        }
        match key {
            Key::Space => {
                self.viewport.set_temporary_pan(true);
            }
            Key::Escape => {
                if !self.controller.cancel() && self.selection.clear() {
                    events.push(BoardEvent::SelectionChanged);
                }
            }
            _ => {
                if let Some(action) = ShortcutRegistry::resolve(key, modifiers) {
                    log::debug!("Shortcut {:?}", action);
                    self.run_shortcut(action, events);
                }
            }
        }
    }

    fn run_shortcut(&mut self, action: ShortcutAction, events: &mut Vec<BoardEvent>) {
        let command = match action {
            ShortcutAction::SelectAll => Command::SelectAll,
            ShortcutAction::Undo => Command::Undo,
            ShortcutAction::Redo => Command::Redo,
            ShortcutAction::Group => Command::GroupSelected,
            ShortcutAction::Ungroup => Command::UngroupSelected,
            ShortcutAction::Copy => Command::Copy,
            ShortcutAction::Cut => Command::Cut,
            ShortcutAction::Paste => Command::Paste,
            ShortcutAction::Duplicate => Command::DuplicateSelected,
            ShortcutAction::Delete => Command::DeleteSelected,
            ShortcutAction::BringToFront => Command::BringToFront,
            ShortcutAction::SendToBack => Command::SendToBack,
        };
        events.extend(self.dispatch(command));
    }

    fn apply_intents(&mut self, intents: Vec<Intent>, events: &mut Vec<BoardEvent>) {
        for intent in intents {
            match intent {
                Intent::Update { id, changes, commit } => {
                    self.apply_updates(vec![(id, changes)], commit, events)
                }
                Intent::UpdateMultiple { updates, commit } => {
                    self.apply_updates(updates, commit, events)
                }
                Intent::ShowGuides(guides) => {
                    if self.guides != guides {
                        self.guides = guides;
                        events.push(BoardEvent::GuidesChanged);
                    }
                }
                Intent::Select { id, additive } => {
                    let visible = self.item(id).is_some_and(Item::is_visible);
                    if visible && self.selection.click(id, additive) {
                        events.push(BoardEvent::SelectionChanged);
                    }
                }
                Intent::ExtendSelection(ids) => {
                    if self.selection.extend(ids) {
                        events.push(BoardEvent::SelectionChanged);
                    }
                }
                Intent::ClearSelection => {
                    if self.selection.clear() {
                        events.push(BoardEvent::SelectionChanged);
                    }
                }
                Intent::BeginTextEdit(id) => self.begin_text_edit(id, events),
                Intent::Pan(delta) => {
                    if self.viewport.pan_by(delta) {
                        events.push(BoardEvent::ViewportChanged);
                    }
                }
            }
        }
    }

    fn apply_updates(
        &mut self,
        updates: Vec<(ItemId, ItemPatch)>,
        commit: bool,
        events: &mut Vec<BoardEvent>,
    ) {
        let min_size = self.config.min_item_size;
        let updates: Vec<(ItemId, ItemPatch)> = updates
            .into_iter()
            .filter(|(id, _)| {
                let known = find_item(&self.items, *id).is_some();
                if !known {
                    log::warn!("Ignoring update for unknown item {}", id);
                }
                known
            })
            .map(|(id, patch)| (id, patch.sanitized(min_size)))
            .collect();
        let next = ops::update_each(&self.items, &updates);
        self.replace_items(next, commit, events);
    }

    /// Install `next` as the item list. A commit records a history entry
    /// unless the list already matches the current one.
    fn replace_items(&mut self, next: ItemList, commit: bool, events: &mut Vec<BoardEvent>) {
        let changed = !ops::same_items(&self.items, &next);
        if changed {
            self.items = next;
        }
        if commit {
            let settled = self
                .history
                .current()
                .is_some_and(|current| ops::same_items(current, &self.items));
            if !settled {
                self.history.push(self.items.clone());
                log::debug!(
                    "Committed {} items, history cursor {}",
                    self.items.len(),
                    self.history.cursor(),
                );
            }
            if changed || !settled {
                events.push(BoardEvent::ItemsChanged { committed: true });
            }
        } else if changed {
            events.push(BoardEvent::ItemsChanged { committed: false });
        }
        if changed {
            self.after_items_changed(events);
        }
    }

    fn after_items_changed(&mut self, events: &mut Vec<BoardEvent>) {
        if self.selection.prune(&self.items) {
            events.push(BoardEvent::SelectionChanged);
        }
        if let Some(edit) = &self.text_edit {
            let id = edit.id;
            if find_item(&self.items, id).is_none() {
                self.text_edit = None;
                events.push(BoardEvent::TextEditEnded {
                    id,
                    committed: false,
                });
            }
        }
    }

    fn add_items(&mut self, items: Vec<Item>, events: &mut Vec<BoardEvent>) {
        if items.is_empty() {
            return;
        }
        let base = ops::max_z(&self.items).map_or(0, |z| z + 1);
        let lowest = items.iter().map(|item| item.position.z).min().unwrap_or(0);
        let min_size = self.config.min_item_size;
        let items: Vec<Item> = items
            .into_iter()
            .map(|mut item| {
                item.position.z = base + (item.position.z - lowest);
                item.size = Size::new(
                    item.size.width.max(min_size),
                    item.size.height.max(min_size),
                );
                item
            })
            .collect();
        self.insert_items(items, events);
    }

    /// Append items (ids made unique), commit, and select them.
    fn insert_items(&mut self, items: Vec<Item>, events: &mut Vec<BoardEvent>) {
        let mut next = self.items.clone();
        let mut ids = Vec::with_capacity(items.len());
        for mut item in items {
            if next.iter().any(|existing| existing.id() == item.id()) {
                item.regenerate_id();
            }
            ids.push(item.id());
            next.push(Arc::new(item));
        }
        log::debug!("Inserted {} items", ids.len());
        self.replace_items(next, true, events);
        events.push(BoardEvent::ItemsAdded(ids.clone()));
        if self.selection.set(ids) {
            events.push(BoardEvent::SelectionChanged);
        }
    }

    fn delete(&mut self, ids: &[ItemId], events: &mut Vec<BoardEvent>) {
        if ids.is_empty() {
            return;
        }
        let next = ops::delete_items(&self.items, ids);
        self.replace_items(next, true, events);
    }

    fn duplicate_selected(&mut self, events: &mut Vec<BoardEvent>) {
        let ids = ops::expand_groups(&self.items, self.selection.ids());
        if ids.is_empty() {
            return;
        }
        let offset = Vec2::new(self.config.duplicate_offset, self.config.duplicate_offset);
        let (next, new_ids) = ops::duplicate_items(&self.items, &ids, offset);
        self.replace_items(next, true, events);
        events.push(BoardEvent::ItemsAdded(new_ids.clone()));
        if self.selection.set(new_ids) {
            events.push(BoardEvent::SelectionChanged);
        }
    }

    fn restack(
        &mut self,
        op: fn(&[Arc<Item>], &[ItemId]) -> ItemList,
        events: &mut Vec<BoardEvent>,
    ) {
        let ids = ops::expand_groups(&self.items, self.selection.ids());
        if ids.is_empty() {
            return;
        }
        let next = op(&self.items, &ids);
        self.replace_items(next, true, events);
    }

    /// Copy the selection (with whole groups) and return the copied ids.
    fn copy_selected(&mut self) -> Vec<ItemId> {
        let ids = ops::expand_groups(&self.items, self.selection.ids());
        self.clipboard.copy(&self.items, &ids);
        ids
    }

    fn paste(&mut self, events: &mut Vec<BoardEvent>) {
        if self.clipboard.is_empty() {
            return;
        }
        let offset = Vec2::new(self.config.paste_offset, self.config.paste_offset);
        let copies = self.clipboard.paste(&self.items, offset);
        self.insert_items(copies, events);
    }

    fn abort_gestures(&mut self, events: &mut Vec<BoardEvent>) {
        self.controller.reset();
        if self.guides.take().is_some() {
            events.push(BoardEvent::GuidesChanged);
        }
        self.cancel_text_edit(events);
    }

    fn undo(&mut self, events: &mut Vec<BoardEvent>) {
        self.abort_gestures(events);
        let Some(snapshot) = self.history.undo().cloned() else {
            events.push(BoardEvent::NothingToUndo);
            return;
        };
        self.restore(snapshot, events);
    }

    fn redo(&mut self, events: &mut Vec<BoardEvent>) {
        self.abort_gestures(events);
        let Some(snapshot) = self.history.redo().cloned() else {
            events.push(BoardEvent::NothingToRedo);
            return;
        };
        self.restore(snapshot, events);
    }

    fn restore(&mut self, snapshot: ItemList, events: &mut Vec<BoardEvent>) {
        log::debug!(
            "Restored history entry {} of {}",
            self.history.cursor() + 1,
            self.history.len(),
        );
        self.items = snapshot;
        events.push(BoardEvent::ItemsChanged { committed: true });
        self.after_items_changed(events);
    }

    fn begin_text_edit(&mut self, id: ItemId, events: &mut Vec<BoardEvent>) {
        let Some((editable, content)) = self
            .item(id)
            .map(|item| (item.kind().supports_inline_edit() && !item.locked, item.content.clone()))
        else {
            return;
        };
        if !editable || self.editing() == Some(id) {
            return;
        }
        self.commit_text_edit(events);
        self.text_edit = Some(TextEdit {
            id,
            buffer: content,
        });
        if self.selection.select(id) {
            events.push(BoardEvent::SelectionChanged);
        }
        events.push(BoardEvent::TextEditStarted(id));
    }

    fn commit_text_edit(&mut self, events: &mut Vec<BoardEvent>) {
        let Some(edit) = self.text_edit.take() else {
            return;
        };
        self.apply_updates(vec![(edit.id, ItemPatch::content(edit.buffer))], true, events);
        events.push(BoardEvent::TextEditEnded {
            id: edit.id,
            committed: true,
        });
    }

    fn cancel_text_edit(&mut self, events: &mut Vec<BoardEvent>) {
        if let Some(edit) = self.text_edit.take() {
            events.push(BoardEvent::TextEditEnded {
                id: edit.id,
                committed: false,
            });
        }
    }
}
