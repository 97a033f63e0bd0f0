//! Pointer interaction state machine.
//!
//! The controller never touches the item list. It turns pointer events into
//! [`Intent`]s which the board applies, so the same logic can drive any host.

use crate::camera::Viewport;
use crate::config::BoardConfig;
use crate::geometry::{constrain_resize, constrain_to_bounds, hit_test, rects_intersect};
use crate::handles::{
    HANDLE_HIT_TOLERANCE, HandleKind, ResizeHandle, apply_resize, hit_test_handles,
    rotation_from_drag,
};
use crate::input::{Modifiers, MouseButton};
use crate::item::{Item, ItemId, ItemPatch, find_item};
use crate::ops::expand_groups;
use crate::selection::Selection;
use crate::snap::{AlignmentGuide, compute_alignment_guides, snap_point};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Active pointer tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Select,
    /// Every drag pans the view.
    Pan,
}

/// A request from the controller to the board.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Patch one item. `commit` settles the change into history.
    Update {
        id: ItemId,
        changes: ItemPatch,
        commit: bool,
    },
    UpdateMultiple {
        updates: Vec<(ItemId, ItemPatch)>,
        commit: bool,
    },
    /// Replace the visible guides; `None` hides them.
    ShowGuides(Option<Vec<AlignmentGuide>>),
    Select {
        id: ItemId,
        additive: bool,
    },
    /// Union the ids into the selection.
    ExtendSelection(Vec<ItemId>),
    ClearSelection,
    BeginTextEdit(ItemId),
    /// Pan the viewport by a screen delta.
    Pan(Vec2),
}

/// Everything the controller reads to make decisions.
#[derive(Debug, Clone, Copy)]
pub struct InteractionContext<'a> {
    pub items: &'a [Arc<Item>],
    pub selection: &'a Selection,
    pub viewport: &'a Viewport,
    pub config: &'a BoardConfig,
    /// Item whose inline text editor is open.
    pub editing: Option<ItemId>,
    pub tool: Tool,
}

impl InteractionContext<'_> {
    fn pans(&self) -> bool {
        self.tool == Tool::Pan || self.viewport.is_temporary_pan()
    }
}

/// Items moved together by a drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub start_screen: Point,
    /// The item under the pointer; guides are computed for it alone.
    pub primary: ItemId,
    /// Bounds of every moving item when the drag started.
    pub originals: Vec<(ItemId, Rect)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResizeState {
    pub id: ItemId,
    pub handle: ResizeHandle,
    pub start_screen: Point,
    pub original: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RotateState {
    pub id: ItemId,
    /// Item center in canvas space.
    pub center: Point,
    pub start_canvas: Point,
    pub start_rotation: f64,
}

/// Marquee selection rectangle in canvas space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RubberBand {
    pub start: Point,
    pub current: Point,
}

impl RubberBand {
    pub fn to_rect(&self) -> Rect {
        Rect::new(
            self.start.x.min(self.current.x),
            self.start.y.min(self.current.y),
            self.start.x.max(self.current.x),
            self.start.y.max(self.current.y),
        )
    }
}

/// The controller's current gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Interaction {
    #[default]
    Idle,
    Dragging(DragState),
    Resizing(ResizeState),
    Rotating(RotateState),
    RubberBand(RubberBand),
    Panning {
        last_screen: Point,
    },
    /// A rubber band just finished; the click that trails it is swallowed.
    RubberBandCompleted,
}

impl Interaction {
    pub fn name(&self) -> &'static str {
        match self {
            Interaction::Idle => "idle",
            Interaction::Dragging(_) => "dragging",
            Interaction::Resizing(_) => "resizing",
            Interaction::Rotating(_) => "rotating",
            Interaction::RubberBand(_) => "rubber-band",
            Interaction::Panning { .. } => "panning",
            Interaction::RubberBandCompleted => "rubber-band-completed",
        }
    }

    /// Whether a pointer gesture is in progress.
    pub fn is_active(&self) -> bool {
        !matches!(self, Interaction::Idle | Interaction::RubberBandCompleted)
    }
}

/// Ids of unlocked visible items strictly overlapping `rect`.
///
/// Returns `None` when the rectangle is too small in both dimensions to count
/// as a deliberate drag.
pub fn select_in_rect(items: &[Arc<Item>], rect: Rect, threshold: f64) -> Option<Vec<ItemId>> {
    if rect.width() <= threshold && rect.height() <= threshold {
        return None;
    }
    Some(
        items
            .iter()
            .filter(|item| item.is_movable() && rects_intersect(item.bounds(), rect))
            .map(|item| item.id())
            .collect(),
    )
}

fn update_intent(mut updates: Vec<(ItemId, ItemPatch)>, commit: bool) -> Intent {
    if updates.len() == 1 {
        let (id, changes) = updates.remove(0);
        Intent::Update {
            id,
            changes,
            commit,
        }
    } else {
        Intent::UpdateMultiple { updates, commit }
    }
}

/// New top-left corners for a drag by `delta`.
fn drag_origins(
    ctx: &InteractionContext<'_>,
    drag: &DragState,
    delta: Vec2,
    release: bool,
) -> Vec<(ItemId, Rect)> {
    let config = ctx.config;
    drag.originals
        .iter()
        .map(|(id, rect)| {
            let mut origin = rect.origin() + delta;
            if release {
                let result = snap_point(origin, config.snap_mode, config.grid_size);
                if result.is_snapped() {
                    log::trace!("Snapped {} to {:?}", id, result.point);
                }
                origin = result.point;
            }
            if config.constrain_to_bounds {
                origin = constrain_to_bounds(
                    origin,
                    rect.size(),
                    config.board_size,
                    config.bounds_margin,
                );
            }
            (*id, Rect::from_origin_size(origin, rect.size()))
        })
        .collect()
}

fn drag_guides(
    ctx: &InteractionContext<'_>,
    drag: &DragState,
    moved: &[(ItemId, Rect)],
) -> Option<Vec<AlignmentGuide>> {
    if !ctx.config.snap_mode.shows_guides() {
        return None;
    }
    let (_, primary) = moved.iter().find(|(id, _)| *id == drag.primary)?;
    let others: Vec<Rect> = ctx
        .items
        .iter()
        .filter(|item| item.is_visible() && !drag.originals.iter().any(|(id, _)| *id == item.id()))
        .map(|item| item.bounds())
        .collect();
    let guides = compute_alignment_guides(*primary, &others, ctx.config.guide_threshold);
    (!guides.is_empty()).then_some(guides)
}

fn resize_rect(
    ctx: &InteractionContext<'_>,
    state: &ResizeState,
    screen: Point,
    modifiers: Modifiers,
) -> Rect {
    let config = ctx.config;
    let delta = ctx.viewport.screen_delta_to_canvas(screen - state.start_screen);
    let rect = apply_resize(
        state.original,
        state.handle,
        delta,
        modifiers.shift,
        config.min_item_size,
    );
    if config.constrain_to_bounds {
        constrain_resize(
            rect,
            state.handle,
            config.board_size,
            config.bounds_margin,
            config.min_item_size,
        )
    } else {
        rect
    }
}

fn rotation(
    ctx: &InteractionContext<'_>,
    state: &RotateState,
    screen: Point,
    modifiers: Modifiers,
) -> f64 {
    let current = ctx.viewport.screen_to_canvas(screen);
    rotation_from_drag(
        state.center,
        state.start_canvas,
        current,
        state.start_rotation,
        modifiers.shift,
    )
}

/// Drives drag, resize, rotate, rubber-band and pan gestures.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    state: Interaction,
    /// The last gesture moved, resized or rotated something. The click that
    /// trails it leaves the selection alone.
    manipulated: bool,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &Interaction {
        &self.state
    }

    /// Current rubber-band rectangle, for rendering.
    pub fn rubber_band_rect(&self) -> Option<Rect> {
        match &self.state {
            Interaction::RubberBand(band) => Some(band.to_rect()),
            _ => None,
        }
    }

    /// Abandon any gesture without emitting intents.
    pub fn reset(&mut self) {
        if self.state.is_active() {
            log::debug!("Abandoning {} interaction", self.state.name());
        }
        self.state = Interaction::Idle;
    }

    /// Cancel a rubber band in progress. Other gestures are left alone.
    pub fn cancel(&mut self) -> bool {
        if matches!(self.state, Interaction::RubberBand(_)) {
            self.state = Interaction::Idle;
            true
        } else {
            false
        }
    }

    pub fn pointer_down(
        &mut self,
        ctx: &InteractionContext<'_>,
        screen: Point,
        button: MouseButton,
        modifiers: Modifiers,
    ) -> Vec<Intent> {
        if self.state == Interaction::RubberBandCompleted {
            self.state = Interaction::Idle;
        }
        if self.state.is_active() {
            log::debug!("Pointer down ignored while {}", self.state.name());
            return Vec::new();
        }
        self.manipulated = false;

        if button == MouseButton::Middle || (button == MouseButton::Left && ctx.pans()) {
            self.state = Interaction::Panning { last_screen: screen };
            return Vec::new();
        }
        if button != MouseButton::Left {
            return Vec::new();
        }

        let canvas = ctx.viewport.screen_to_canvas(screen);

        // Handles of selected items take priority over the items themselves.
        let tolerance = HANDLE_HIT_TOLERANCE / ctx.viewport.effective_zoom();
        for &id in ctx.selection.ids() {
            let Some(item) = find_item(ctx.items, id) else {
                continue;
            };
            if !item.is_movable() || ctx.editing == Some(id) {
                continue;
            }
            match hit_test_handles(item, canvas, tolerance) {
                Some(HandleKind::Resize(handle)) => {
                    log::trace!("Resize {:?} started on {}", handle, id);
                    self.state = Interaction::Resizing(ResizeState {
                        id,
                        handle,
                        start_screen: screen,
                        original: item.bounds(),
                    });
                    return Vec::new();
                }
                Some(HandleKind::Rotate) => {
                    self.state = Interaction::Rotating(RotateState {
                        id,
                        center: item.center(),
                        start_canvas: canvas,
                        start_rotation: item.rotation,
                    });
                    return Vec::new();
                }
                None => {}
            }
        }

        let Some(id) = hit_test(ctx.items, canvas) else {
            if ctx.tool == Tool::Select {
                self.state = Interaction::RubberBand(RubberBand {
                    start: canvas,
                    current: canvas,
                });
            }
            return Vec::new();
        };

        if modifiers.multi_select() {
            return vec![Intent::Select { id, additive: true }];
        }

        let mut intents = Vec::new();
        let already_selected = ctx.selection.contains(id);
        if !already_selected {
            intents.push(Intent::Select {
                id,
                additive: false,
            });
        }

        let Some(item) = find_item(ctx.items, id) else {
            return intents;
        };
        if item.locked || ctx.editing == Some(id) {
            return intents;
        }

        let seeds = if already_selected {
            ctx.selection.ids().to_vec()
        } else {
            vec![id]
        };
        let originals: Vec<(ItemId, Rect)> = expand_groups(ctx.items, &seeds)
            .into_iter()
            .filter_map(|member| find_item(ctx.items, member))
            .filter(|member| member.is_movable())
            .map(|member| (member.id(), member.bounds()))
            .collect();

        self.state = Interaction::Dragging(DragState {
            start_screen: screen,
            primary: id,
            originals,
        });
        intents
    }

    pub fn pointer_move(
        &mut self,
        ctx: &InteractionContext<'_>,
        screen: Point,
        modifiers: Modifiers,
    ) -> Vec<Intent> {
        match &mut self.state {
            Interaction::Idle | Interaction::RubberBandCompleted => Vec::new(),
            Interaction::Dragging(drag) => {
                let delta = ctx.viewport.screen_delta_to_canvas(screen - drag.start_screen);
                let moved = drag_origins(ctx, drag, delta, false);
                let guides = drag_guides(ctx, drag, &moved);
                let updates = moved
                    .iter()
                    .map(|(id, rect)| (*id, ItemPatch::position(rect.x0, rect.y0)))
                    .collect();
                vec![update_intent(updates, false), Intent::ShowGuides(guides)]
            }
            Interaction::Resizing(state) => {
                let rect = resize_rect(ctx, state, screen, modifiers);
                vec![Intent::Update {
                    id: state.id,
                    changes: ItemPatch::frame(rect),
                    commit: false,
                }]
            }
            Interaction::Rotating(state) => {
                let degrees = rotation(ctx, state, screen, modifiers);
                vec![Intent::Update {
                    id: state.id,
                    changes: ItemPatch::rotation(degrees),
                    commit: false,
                }]
            }
            Interaction::RubberBand(band) => {
                band.current = ctx.viewport.screen_to_canvas(screen);
                Vec::new()
            }
            Interaction::Panning { last_screen } => {
                let delta = screen - *last_screen;
                *last_screen = screen;
                if delta == Vec2::ZERO {
                    Vec::new()
                } else {
                    vec![Intent::Pan(delta)]
                }
            }
        }
    }

    /// Finish the gesture. Updates are emitted with `commit: true`; the board
    /// skips the history entry when nothing actually changed.
    pub fn pointer_up(
        &mut self,
        ctx: &InteractionContext<'_>,
        screen: Point,
        modifiers: Modifiers,
    ) -> Vec<Intent> {
        let state = std::mem::take(&mut self.state);
        match state {
            Interaction::Idle => Vec::new(),
            Interaction::RubberBandCompleted => {
                self.state = Interaction::RubberBandCompleted;
                Vec::new()
            }
            Interaction::Dragging(drag) => {
                let delta = ctx.viewport.screen_delta_to_canvas(screen - drag.start_screen);
                let updates = drag_origins(ctx, &drag, delta, true)
                    .into_iter()
                    .map(|(id, rect)| (id, ItemPatch::position(rect.x0, rect.y0)))
                    .collect::<Vec<_>>();
                self.manipulated = delta != Vec2::ZERO;
                let mut intents = Vec::with_capacity(2);
                if !updates.is_empty() {
                    intents.push(update_intent(updates, true));
                }
                intents.push(Intent::ShowGuides(None));
                intents
            }
            Interaction::Resizing(state) => {
                let rect = resize_rect(ctx, &state, screen, modifiers);
                self.manipulated = true;
                vec![Intent::Update {
                    id: state.id,
                    changes: ItemPatch::frame(rect),
                    commit: true,
                }]
            }
            Interaction::Rotating(state) => {
                let degrees = rotation(ctx, &state, screen, modifiers);
                self.manipulated = true;
                vec![Intent::Update {
                    id: state.id,
                    changes: ItemPatch::rotation(degrees),
                    commit: true,
                }]
            }
            Interaction::RubberBand(mut band) => {
                band.current = ctx.viewport.screen_to_canvas(screen);
                match select_in_rect(ctx.items, band.to_rect(), ctx.config.rubber_band_threshold) {
                    Some(ids) => {
                        self.state = Interaction::RubberBandCompleted;
                        if ids.is_empty() {
                            Vec::new()
                        } else {
                            vec![Intent::ExtendSelection(ids)]
                        }
                    }
                    // Too small: the trailing click clears the selection.
                    None => Vec::new(),
                }
            }
            Interaction::Panning { .. } => Vec::new(),
        }
    }

    /// A click that completes a press and release.
    ///
    /// On empty canvas the selection is cleared. On an item the selection
    /// becomes just that item, unless the press moved something.
    pub fn click(
        &mut self,
        ctx: &InteractionContext<'_>,
        screen: Point,
        modifiers: Modifiers,
    ) -> Vec<Intent> {
        let manipulated = std::mem::take(&mut self.manipulated);
        if self.state == Interaction::RubberBandCompleted {
            self.state = Interaction::Idle;
            return Vec::new();
        }
        if self.state.is_active() || ctx.pans() || modifiers.multi_select() {
            return Vec::new();
        }
        let canvas = ctx.viewport.screen_to_canvas(screen);
        match hit_test(ctx.items, canvas) {
            Some(id) if !manipulated && ctx.selection.ids() != [id] => {
                vec![Intent::Select {
                    id,
                    additive: false,
                }]
            }
            Some(_) => Vec::new(),
            None => vec![Intent::ClearSelection],
        }
    }

    pub fn double_click(&mut self, ctx: &InteractionContext<'_>, screen: Point) -> Vec<Intent> {
        let canvas = ctx.viewport.screen_to_canvas(screen);
        let Some(item) = hit_test(ctx.items, canvas).and_then(|id| find_item(ctx.items, id)) else {
            return Vec::new();
        };
        if !item.kind().supports_inline_edit() || item.locked {
            return Vec::new();
        }
        self.state = Interaction::Idle;
        vec![Intent::BeginTextEdit(item.id())]
    }
}
