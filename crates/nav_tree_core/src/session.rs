//! One drag session shared by native drag, long-press pointer drag and keyboard drag.
//!
//! ```text
//! Idle ──arm──▶ Armed ──start / long-press──▶ Dragging ──drop──▶ Committing ──▶ Idle
//!   │                                            │
//!   └──────────────pick up (keyboard)────────────┘──cancel──▶ Cancelling ──▶ Idle
//! ```
//!
//! The session is an explicit value owned by whoever renders the tree. Every handler receives a
//! [`TreeSearch`] over the current data; the session never holds on to the tree. Ending a
//! session, by commit or cancel, clears every piece of drag state before returning, so timers and
//! frame callbacks from an older session find nothing to act on.

use std::time::Instant;

use kurbo::{Point, Rect};

use crate::auto_scroll::AutoScroll;
use crate::config::DragConfig;
use crate::constraints::{DropPosition, is_valid_drop_in};
use crate::hover_expand::HoverExpand;
use crate::keyboard::{Announcement, KeyboardDragState, KeyboardRefusal, KeyboardStep};
use crate::node::NavNode;
use crate::pointer::{DropZone, DropZoneCache, PointerDragState, drop_position_for};
use crate::preview::{
    DraggedItem, PreviewInsert, compute_insert_position, is_preview_item, items_with_preview,
};
use crate::reorder::{MoveEvent, ReorderMode, try_apply_move};
use crate::search::TreeSearch;
use crate::timer::{TimerRequest, TimerToken, TokenSource};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragPhase {
    #[default]
    Idle,
    /// A press is pending: native drag before the platform confirms, pointer drag before the
    /// long-press fires.
    Armed,
    Dragging,
    Committing,
    Cancelling,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragModality {
    Native,
    Pointer,
    Keyboard,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropTarget<Id> {
    pub id: Id,
    pub position: DropPosition,
}

/// How a session ended.
#[derive(Clone, Debug)]
pub enum DropOutcome<T: NavNode> {
    /// The move was applied to a copy of the tree. Adopting `roots` is up to the caller.
    Reordered {
        roots: Vec<T>,
        event: MoveEvent<T>,
    },
    /// The caller owns reordering and should apply `event` itself.
    MoveRequested(MoveEvent<T>),
    /// Dropped where it already was.
    Unchanged,
    /// A target was recorded but no longer resolves to a legal destination.
    Rejected,
    Cancelled,
}

impl<T: NavNode> DropOutcome<T> {
    pub fn event(&self) -> Option<&MoveEvent<T>> {
        match self {
            Self::Reordered { event, .. } | Self::MoveRequested(event) => Some(event),
            _ => None,
        }
    }
}

/// Result of a pointer move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerMove {
    /// No pointer drag is in progress.
    Ignored,
    /// Still waiting for the long-press.
    Pending,
    /// The pointer wandered off before the long-press fired; treated as a scroll gesture.
    Cancelled,
    Dragging {
        target_changed: bool,
        /// The cached drop-zone bounds are stale; call [`DragSession::refresh_drop_zones`].
        refresh_zones: bool,
    },
}

/// Result of a keyboard move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyboardMove {
    Inactive,
    Moved,
    Refused(KeyboardRefusal),
}

pub struct DragSession<T: NavNode> {
    config: DragConfig,
    reorder_mode: ReorderMode,
    has_external_handler: bool,
    phase: DragPhase,
    modality: Option<DragModality>,
    dragged: Option<DraggedItem<T>>,
    drop_target: Option<DropTarget<T::Id>>,
    preview: Option<PreviewInsert<T::Id>>,
    pointer: Option<PointerDragState<T>>,
    keyboard: Option<KeyboardDragState<T>>,
    zones: Option<DropZoneCache<T::Id>>,
    hover_expand: HoverExpand<T::Id>,
    auto_scroll: AutoScroll,
    tokens: TokenSource,
    reflow_requested: bool,
    announcements: Vec<Announcement<T::Id>>,
}

impl<T: NavNode> Default for DragSession<T> {
    fn default() -> Self {
        Self::new(DragConfig::default())
    }
}

impl<T: NavNode> DragSession<T> {
    pub fn new(config: DragConfig) -> Self {
        Self {
            hover_expand: HoverExpand::new(config.hover_expand()),
            auto_scroll: AutoScroll::new(config.auto_scroll),
            config,
            reorder_mode: ReorderMode::default(),
            has_external_handler: false,
            phase: DragPhase::Idle,
            modality: None,
            dragged: None,
            drop_target: None,
            preview: None,
            pointer: None,
            keyboard: None,
            zones: None,
            tokens: TokenSource::default(),
            reflow_requested: false,
            announcements: Vec::new(),
        }
    }

    pub fn reorder_mode(mut self, mode: ReorderMode) -> Self {
        self.reorder_mode = mode;
        self
    }

    pub fn set_reorder_mode(&mut self, mode: ReorderMode) {
        self.reorder_mode = mode;
    }

    /// Whether someone outside the session handles move events. Matters for
    /// [`ReorderMode::Auto`].
    pub fn set_external_handler(&mut self, has_external_handler: bool) {
        self.has_external_handler = has_external_handler;
    }

    pub fn config(&self) -> &DragConfig {
        &self.config
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn modality(&self) -> Option<DragModality> {
        self.modality
    }

    pub fn is_active(&self) -> bool {
        self.phase != DragPhase::Idle
    }

    pub fn is_dragging(&self) -> bool {
        self.phase == DragPhase::Dragging
    }

    pub fn dragged(&self) -> Option<&DraggedItem<T>> {
        self.dragged.as_ref()
    }

    pub fn drop_target(&self) -> Option<&DropTarget<T::Id>> {
        self.drop_target.as_ref()
    }

    pub fn preview(&self) -> Option<&PreviewInsert<T::Id>> {
        self.preview.as_ref()
    }

    pub fn pointer(&self) -> Option<&PointerDragState<T>> {
        self.pointer.as_ref()
    }

    pub fn keyboard(&self) -> Option<&KeyboardDragState<T>> {
        self.keyboard.as_ref()
    }

    /// Whether `id` should be rendered as the preview copy of the dragged node.
    pub fn is_preview_item(&self, search: &TreeSearch<'_, T>, id: &T::Id) -> bool {
        match (&self.dragged, &self.preview) {
            (Some(dragged), Some(preview)) => is_preview_item(search, dragged, preview, id),
            _ => false,
        }
    }

    /// The sibling list under `parent_id` with the live preview applied.
    pub fn items_with_preview<'a>(
        &'a self,
        siblings: &'a [T],
        parent_id: Option<&T::Id>,
    ) -> Vec<&'a T> {
        match &self.dragged {
            Some(dragged) if self.is_dragging() => {
                items_with_preview(siblings, parent_id, dragged, self.preview.as_ref())
            }
            _ => siblings.iter().collect(),
        }
    }

    /// Whether a positional change happened since the last call. The renderer answers with a
    /// reflow animation.
    pub fn take_reflow_request(&mut self) -> bool {
        std::mem::take(&mut self.reflow_requested)
    }

    pub fn take_announcements(&mut self) -> Vec<Announcement<T::Id>> {
        std::mem::take(&mut self.announcements)
    }

    fn begin(
        &mut self,
        search: &TreeSearch<'_, T>,
        id: &T::Id,
        modality: DragModality,
        phase: DragPhase,
    ) -> bool {
        let Some(dragged) = DraggedItem::capture(search, id) else {
            return false;
        };
        log::debug!("{modality:?} drag of {id:?} {phase:?}");
        self.end();
        self.dragged = Some(dragged);
        self.modality = Some(modality);
        self.phase = phase;
        true
    }

    /// Tear down every piece of session state.
    fn end(&mut self) {
        self.phase = DragPhase::Idle;
        self.modality = None;
        self.dragged = None;
        self.drop_target = None;
        self.preview = None;
        self.pointer = None;
        self.keyboard = None;
        self.zones = None;
        self.hover_expand.reset();
        self.auto_scroll.stop();
    }

    // Target tracking, shared by native and pointer drags.

    /// Point the drag at `target_id`. Returns `true` when the target or preview changed.
    ///
    /// Illegal or unresolvable targets are ignored: the previous target and preview stay.
    pub fn update_target(
        &mut self,
        search: &TreeSearch<'_, T>,
        target_id: &T::Id,
        position: DropPosition,
    ) -> bool {
        if !self.is_dragging() || self.modality == Some(DragModality::Keyboard) {
            return false;
        }
        let Some(dragged) = &self.dragged else {
            return false;
        };

        if !is_valid_drop_in(search, &dragged.id, dragged.node.kind(), target_id, position) {
            log::trace!("{target_id:?} {position:?} rejected for {:?}", dragged.id);
            return false;
        }
        let Some(preview) = compute_insert_position(search, dragged, target_id, position) else {
            return false;
        };

        let target = DropTarget {
            id: target_id.clone(),
            position,
        };
        let changed =
            self.drop_target.as_ref() != Some(&target) || self.preview.as_ref() != Some(&preview);
        if changed {
            log::trace!("drop target {target_id:?} {position:?} -> {preview:?}");
            self.drop_target = Some(target);
            self.preview = Some(preview);
            self.reflow_requested = true;
        }
        changed
    }

    /// Forget the current target, e.g. when the pointer leaves every drop zone.
    pub fn clear_target(&mut self) -> bool {
        let had_target = self.drop_target.take().is_some();
        let had_preview = self.preview.take().is_some();
        if had_preview {
            self.reflow_requested = true;
        }
        had_target || had_preview
    }

    // Native drag.

    /// Mouse-down on a drag handle. Pre-arms the session so the preview is ready before the
    /// platform's own drag start arrives.
    pub fn arm_native(&mut self, search: &TreeSearch<'_, T>, id: &T::Id) -> bool {
        let rearm = self.phase == DragPhase::Armed && self.modality == Some(DragModality::Native);
        if self.is_active() && !rearm {
            return false;
        }
        self.begin(search, id, DragModality::Native, DragPhase::Armed)
    }

    /// Mouse-up without a drag: drop the pre-armed state.
    pub fn disarm(&mut self) {
        if self.phase == DragPhase::Armed {
            self.end();
        }
    }

    /// The platform confirmed a drag of `id`.
    pub fn start_native(&mut self, search: &TreeSearch<'_, T>, id: &T::Id) -> bool {
        let armed_for_id = self.phase == DragPhase::Armed
            && self.modality == Some(DragModality::Native)
            && self.dragged.as_ref().is_some_and(|dragged| dragged.id == *id);
        if armed_for_id {
            log::debug!("native drag of {id:?} confirmed");
            self.phase = DragPhase::Dragging;
            return true;
        }
        if self.is_active() && self.phase != DragPhase::Armed {
            return false;
        }
        self.begin(search, id, DragModality::Native, DragPhase::Dragging)
    }

    /// Drag-over on a drop zone with the cursor at `cursor_y`.
    pub fn native_drag_over(
        &mut self,
        search: &TreeSearch<'_, T>,
        zone: &DropZone<T::Id>,
        cursor_y: f64,
    ) -> bool {
        if self.modality != Some(DragModality::Native) {
            return false;
        }
        let position = drop_position_for(cursor_y, zone.bounds, zone.is_container);
        self.update_target(search, &zone.id, position)
    }

    pub fn native_drop(&mut self, search: &TreeSearch<'_, T>) -> DropOutcome<T> {
        if self.modality != Some(DragModality::Native) || !self.is_dragging() {
            return DropOutcome::Cancelled;
        }
        self.commit(search)
    }

    /// The platform ended the drag. Returns `None` when the session already finished, e.g.
    /// because the drop was delivered first.
    ///
    /// Some platforms end a drag without delivering the drop; with a target still recorded that
    /// is treated as a drop.
    pub fn native_drag_end(&mut self, search: &TreeSearch<'_, T>) -> Option<DropOutcome<T>> {
        if self.modality != Some(DragModality::Native) {
            return None;
        }
        if self.is_dragging() && self.drop_target.is_some() {
            log::debug!("drag ended without a drop, committing the recorded target");
            return Some(self.commit(search));
        }
        Some(self.cancel())
    }

    // Pointer (touch / long-press) drag.

    /// Pointer pressed on `id`. Returns the long-press timer to schedule.
    pub fn pointer_down(
        &mut self,
        search: &TreeSearch<'_, T>,
        id: &T::Id,
        at: Point,
    ) -> Option<TimerRequest> {
        if self.is_active() {
            return None;
        }
        let found = search.find_by_id(id)?;
        let (item, parent_id, index) = (found.node.clone(), found.parent_id, found.index);
        if !self.begin(search, id, DragModality::Pointer, DragPhase::Armed) {
            return None;
        }

        let token = self.tokens.next();
        self.pointer = Some(PointerDragState {
            item,
            id: id.clone(),
            parent_id,
            index,
            start: at,
            current: at,
            is_dragging: false,
            pending_timer: Some(token),
        });
        Some(TimerRequest {
            token,
            delay: self.config.long_press(),
        })
    }

    /// The long-press timer fired. Returns `true` if the session is now dragging, in which case
    /// the caller should supply drop zones right away.
    pub fn long_press_elapsed(&mut self, token: TimerToken) -> bool {
        let Some(pointer) = &mut self.pointer else {
            return false;
        };
        if pointer.pending_timer != Some(token) || self.phase != DragPhase::Armed {
            return false;
        }
        pointer.pending_timer = None;
        pointer.is_dragging = true;
        self.phase = DragPhase::Dragging;
        self.zones = None;
        log::debug!("long press on {:?}, dragging", pointer.id);
        true
    }

    pub fn refresh_drop_zones(&mut self, zones: Vec<DropZone<T::Id>>, now: Instant) {
        if self.modality == Some(DragModality::Pointer) && self.is_dragging() {
            self.zones = Some(DropZoneCache::new(zones, now));
        }
    }

    pub fn needs_zone_refresh(&self, now: Instant) -> bool {
        self.modality == Some(DragModality::Pointer)
            && self.is_dragging()
            && self
                .zones
                .as_ref()
                .is_none_or(|zones| zones.is_stale(now, self.config.zone_refresh()))
    }

    pub fn pointer_move(
        &mut self,
        search: &TreeSearch<'_, T>,
        at: Point,
        now: Instant,
    ) -> PointerMove {
        let Some(pointer) = &mut self.pointer else {
            return PointerMove::Ignored;
        };
        pointer.current = at;

        if !pointer.is_dragging {
            if pointer.distance() > self.config.move_tolerance {
                log::debug!("pointer moved before long press, treating as scroll");
                self.cancel();
                return PointerMove::Cancelled;
            }
            return PointerMove::Pending;
        }

        let zone = self
            .zones
            .as_ref()
            .and_then(|zones| zones.zone_at(at))
            .map(|zone| {
                let position = drop_position_for(at.y, zone.bounds, zone.is_container);
                (zone.id.clone(), position)
            });
        let target_changed = match zone {
            Some((id, position)) => self.update_target(search, &id, position),
            None => {
                self.hover_none();
                self.clear_target()
            }
        };
        PointerMove::Dragging {
            target_changed,
            refresh_zones: self.needs_zone_refresh(now),
        }
    }

    /// Pointer released: commit onto the recorded target, or cancel if there is none.
    pub fn pointer_up(&mut self, search: &TreeSearch<'_, T>) -> DropOutcome<T> {
        if self.modality != Some(DragModality::Pointer) {
            return DropOutcome::Cancelled;
        }
        if self.is_dragging() && self.drop_target.is_some() {
            return self.commit(search);
        }
        self.cancel()
    }

    // Keyboard drag.

    pub fn pick_up(&mut self, search: &TreeSearch<'_, T>, id: &T::Id) -> bool {
        if self.is_active() {
            return false;
        }
        let Some(state) = KeyboardDragState::pick_up(search, id) else {
            return false;
        };
        if !self.begin(search, id, DragModality::Keyboard, DragPhase::Dragging) {
            return false;
        }
        self.announcements.push(Announcement::PickedUp {
            id: id.clone(),
            position: state.current_index + 1,
            count: state.level_len(),
        });
        self.preview = Some(state.insert_position());
        self.keyboard = Some(state);
        true
    }

    pub fn keyboard_step(&mut self, step: KeyboardStep) -> KeyboardMove {
        let Some(state) = &self.keyboard else {
            return KeyboardMove::Inactive;
        };
        let next = state.step(step);
        self.replace_keyboard_state(next)
    }

    /// Move the virtual position out of its current group.
    pub fn move_out(&mut self, search: &TreeSearch<'_, T>) -> KeyboardMove {
        let Some(state) = &self.keyboard else {
            return KeyboardMove::Inactive;
        };
        let next = state.move_out(search);
        self.replace_keyboard_state(next)
    }

    /// Move the virtual position into the group just above it.
    pub fn move_in(&mut self, search: &TreeSearch<'_, T>) -> KeyboardMove {
        let Some(state) = &self.keyboard else {
            return KeyboardMove::Inactive;
        };
        let next = state.move_in(search);
        self.replace_keyboard_state(next)
    }

    fn replace_keyboard_state(
        &mut self,
        next: Result<KeyboardDragState<T>, KeyboardRefusal>,
    ) -> KeyboardMove {
        match next {
            Ok(state) => {
                self.announcements.push(Announcement::Moved {
                    id: state.id.clone(),
                    parent_id: state.current_parent_id.clone(),
                    position: state.current_index + 1,
                    count: state.level_len(),
                });
                self.preview = Some(state.insert_position());
                self.keyboard = Some(state);
                self.reflow_requested = true;
                KeyboardMove::Moved
            }
            Err(reason) => {
                if let Some(state) = &self.keyboard {
                    self.announcements.push(Announcement::Refused {
                        id: state.id.clone(),
                        reason,
                    });
                }
                KeyboardMove::Refused(reason)
            }
        }
    }

    pub fn keyboard_drop(&mut self, search: &TreeSearch<'_, T>) -> DropOutcome<T> {
        if self.keyboard.is_none() {
            return DropOutcome::Cancelled;
        }
        self.commit(search)
    }

    // Commit and cancel.

    /// Abandon whatever session is active and restore the original layout.
    pub fn cancel(&mut self) -> DropOutcome<T> {
        if !self.is_active() {
            return DropOutcome::Cancelled;
        }
        self.phase = DragPhase::Cancelling;
        if let Some(dragged) = &self.dragged {
            log::debug!("drag of {:?} cancelled", dragged.id);
            if self.keyboard.is_some() {
                self.announcements.push(Announcement::Cancelled {
                    id: dragged.id.clone(),
                });
            }
        }
        // An armed press never showed a preview, so there is nothing to animate back.
        let had_preview = self.preview.is_some();
        self.end();
        if had_preview {
            self.reflow_requested = true;
        }
        DropOutcome::Cancelled
    }

    fn commit(&mut self, search: &TreeSearch<'_, T>) -> DropOutcome<T> {
        self.phase = DragPhase::Committing;
        let outcome = self.resolve_commit(search);
        if let (Some(dragged), Some(_)) = (&self.dragged, &self.keyboard) {
            self.announcements.push(match outcome {
                DropOutcome::Reordered { .. } | DropOutcome::MoveRequested(_) => {
                    Announcement::Dropped {
                        id: dragged.id.clone(),
                    }
                }
                _ => Announcement::Cancelled {
                    id: dragged.id.clone(),
                },
            });
        }
        log::debug!(
            "drag of {:?} finished: {}",
            self.dragged.as_ref().map(|dragged| &dragged.id),
            match &outcome {
                DropOutcome::Reordered { .. } => "reordered",
                DropOutcome::MoveRequested(_) => "move requested",
                DropOutcome::Unchanged => "unchanged",
                DropOutcome::Rejected => "rejected",
                DropOutcome::Cancelled => "cancelled",
            }
        );
        self.end();
        self.reflow_requested = true;
        outcome
    }

    fn resolve_commit(&self, search: &TreeSearch<'_, T>) -> DropOutcome<T> {
        let Some(dragged) = &self.dragged else {
            return DropOutcome::Cancelled;
        };

        let destination = match &self.keyboard {
            Some(state) => {
                if let Some((target_id, position)) = state.drop_target()
                    && !is_valid_drop_in(
                        search,
                        &dragged.id,
                        dragged.node.kind(),
                        &target_id,
                        position,
                    )
                {
                    return DropOutcome::Rejected;
                }
                state.insert_position()
            }
            None => {
                let Some(target) = &self.drop_target else {
                    return DropOutcome::Cancelled;
                };
                if !is_valid_drop_in(
                    search,
                    &dragged.id,
                    dragged.node.kind(),
                    &target.id,
                    target.position,
                ) {
                    return DropOutcome::Rejected;
                }
                let Some(destination) =
                    compute_insert_position(search, dragged, &target.id, target.position)
                else {
                    return DropOutcome::Rejected;
                };
                destination
            }
        };

        let Some(current) = search.find_by_id(&dragged.id) else {
            return DropOutcome::Rejected;
        };
        if current.parent_id == destination.parent_id && current.index == destination.index {
            return DropOutcome::Unchanged;
        }

        let event = MoveEvent {
            item: current.node.clone(),
            from_parent_id: current.parent_id,
            to_parent_id: destination.parent_id,
            to_index: destination.index,
        };

        if !self
            .reorder_mode
            .reorders_internally::<T>(self.has_external_handler)
        {
            return DropOutcome::MoveRequested(event);
        }
        match try_apply_move(search.roots(), &event) {
            Some(roots) => DropOutcome::Reordered { roots, event },
            None => {
                log::warn!(
                    "could not reorder {:?} internally, handing the move to the caller",
                    dragged.id
                );
                DropOutcome::MoveRequested(event)
            }
        }
    }

    // Satellite controllers.

    /// The drag is over `id`. Returns a hover-expand timer to schedule when a collapsed
    /// container starts its countdown.
    pub fn hover(&mut self, id: &T::Id, is_collapsed_container: bool) -> Option<TimerRequest> {
        if !self.is_dragging() {
            return None;
        }
        self.hover_expand.hover(id, is_collapsed_container)
    }

    pub fn hover_left(&mut self, id: &T::Id) {
        self.hover_expand.leave(id);
    }

    /// The drag is over no row at all.
    pub fn hover_none(&mut self) {
        self.hover_expand.cancel();
    }

    /// A hover-expand timer fired. Returns the container to expand.
    pub fn hover_elapsed(&mut self, token: TimerToken) -> Option<T::Id> {
        if !self.is_dragging() {
            return None;
        }
        let id = self.hover_expand.elapsed(token)?;
        log::debug!("expanding {id:?} after hover");
        Some(id)
    }

    /// Track the cursor for edge auto-scroll. Returns `true` when the caller should start its
    /// frame loop.
    pub fn update_auto_scroll(&mut self, cursor_y: f64, container: Rect) -> bool {
        if !self.is_dragging() {
            self.auto_scroll.stop();
            return false;
        }
        self.auto_scroll.update(cursor_y, container)
    }

    /// The scroll delta for this frame, `None` once the loop should stop.
    pub fn auto_scroll_tick(&mut self) -> Option<f64> {
        self.auto_scroll.tick()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Forest;
    use crate::node::BasicNode;

    fn id(s: &str) -> String {
        s.to_string()
    }

    fn forest() -> Forest<BasicNode> {
        Forest::new(vec![BasicNode::section("S").child(
            BasicNode::group("G")
                .child(BasicNode::page("P1"))
                .child(BasicNode::page("P2")),
        )])
    }

    fn zone(name: &str, is_container: bool, top: f64) -> DropZone<String> {
        DropZone {
            id: id(name),
            is_container,
            bounds: Rect::new(0.0, top, 200.0, top + 30.0),
        }
    }

    #[test]
    fn native_drag_reorders_within_group() {
        let forest = forest();
        let search = forest.search();
        let mut session = DragSession::<BasicNode>::default();

        assert!(session.arm_native(&search, &id("P2")));
        assert_eq!(session.phase(), DragPhase::Armed);
        assert!(session.start_native(&search, &id("P2")));
        assert!(session.is_dragging());

        assert!(session.native_drag_over(&search, &zone("P1", false, 60.0), 62.0));
        assert_eq!(
            session.drop_target(),
            Some(&DropTarget {
                id: id("P1"),
                position: DropPosition::Before
            })
        );

        let DropOutcome::Reordered { roots, event } = session.native_drop(&search) else {
            panic!("expected an internal reorder");
        };
        assert_eq!(event.to_index, 0);
        let g = &roots[0].children[0];
        assert_eq!(g.children[0].id, "P2");
        assert_eq!(g.children[1].id, "P1");
        assert_eq!(session.phase(), DragPhase::Idle);
        assert!(session.dragged().is_none());
        assert!(session.take_reflow_request());
    }

    #[test]
    fn drag_end_without_drop_commits_recorded_target() {
        let forest = forest();
        let search = forest.search();
        let mut session = DragSession::<BasicNode>::default().reorder_mode(ReorderMode::Controlled);

        session.start_native(&search, &id("P1"));
        session.native_drag_over(&search, &zone("P2", false, 90.0), 115.0);
        let outcome = session.native_drag_end(&search).unwrap();
        let DropOutcome::MoveRequested(event) = outcome else {
            panic!("expected a move request");
        };
        assert_eq!(event.to_parent_id.as_deref(), Some("G"));
        assert_eq!(event.to_index, 1);

        assert!(session.native_drag_end(&search).is_none());
    }

    #[test]
    fn drag_end_without_target_cancels() {
        let forest = forest();
        let search = forest.search();
        let mut session = DragSession::<BasicNode>::default();
        session.start_native(&search, &id("P1"));
        assert!(matches!(
            session.native_drag_end(&search),
            Some(DropOutcome::Cancelled)
        ));
        assert!(!session.is_active());
    }

    #[test]
    fn invalid_target_keeps_previous_preview() {
        let forest = Forest::new(vec![
            BasicNode::section("S").child(
                BasicNode::group("G")
                    .child(BasicNode::page("P1"))
                    .child(BasicNode::page("P2")),
            ),
            BasicNode::section("T"),
        ]);
        let search = forest.search();
        let mut session = DragSession::<BasicNode>::default();
        session.start_native(&search, &id("G"));

        assert!(session.update_target(&search, &id("T"), DropPosition::Inside));
        let valid_target = session.drop_target().cloned();
        let valid_preview = session.preview().cloned();
        assert_eq!(
            valid_preview,
            Some(PreviewInsert {
                parent_id: Some(id("T")),
                index: 0
            })
        );
        session.take_reflow_request();

        // P1 sits under the dragged group.
        assert!(!session.update_target(&search, &id("P1"), DropPosition::After));
        assert_eq!(session.drop_target().cloned(), valid_target);
        assert_eq!(session.preview().cloned(), valid_preview);
        assert!(!session.take_reflow_request());

        // A section never lands inside a group.
        session.cancel();
        session.start_native(&search, &id("T"));
        assert!(session.update_target(&search, &id("S"), DropPosition::After));
        assert!(!session.update_target(&search, &id("G"), DropPosition::Inside));
        assert_eq!(
            session.preview().cloned(),
            Some(PreviewInsert {
                parent_id: None,
                index: 1
            })
        );

        assert!(!session.update_target(&search, &id("missing"), DropPosition::After));
        assert!(session.preview().is_some());
    }

    #[test]
    fn pointer_moving_early_is_a_scroll() {
        let forest = forest();
        let search = forest.search();
        let mut session = DragSession::<BasicNode>::default();
        let now = Instant::now();

        let request = session
            .pointer_down(&search, &id("P1"), Point::new(10.0, 70.0))
            .unwrap();
        assert_eq!(request.delay, session.config().long_press());
        assert_eq!(
            session.pointer_move(&search, Point::new(12.0, 74.0), now),
            PointerMove::Pending
        );
        assert_eq!(
            session.pointer_move(&search, Point::new(10.0, 95.0), now),
            PointerMove::Cancelled
        );
        assert!(!session.is_active());
        assert!(!session.long_press_elapsed(request.token), "stale timer");
    }

    #[test]
    fn long_press_then_drop_on_cached_zone() {
        let forest = forest();
        let search = forest.search();
        let mut session = DragSession::<BasicNode>::default();
        let now = Instant::now();

        let request = session
            .pointer_down(&search, &id("P1"), Point::new(10.0, 70.0))
            .unwrap();
        assert!(session.long_press_elapsed(request.token));
        assert!(session.needs_zone_refresh(now));
        session.refresh_drop_zones(
            vec![
                zone("S", true, 0.0),
                zone("G", true, 30.0),
                zone("P1", false, 60.0),
                zone("P2", false, 90.0),
            ],
            now,
        );
        assert!(!session.needs_zone_refresh(now));

        let moved = session.pointer_move(&search, Point::new(10.0, 115.0), now);
        assert_eq!(
            moved,
            PointerMove::Dragging {
                target_changed: true,
                refresh_zones: false
            }
        );
        assert!(session.is_preview_item(&search, &id("P1")));

        let DropOutcome::Reordered { roots, .. } = session.pointer_up(&search) else {
            panic!("expected a reorder");
        };
        let order: Vec<&str> = roots[0].children[0]
            .children
            .iter()
            .map(|node| node.id.as_str())
            .collect();
        assert_eq!(order, ["P2", "P1"]);
    }

    #[test]
    fn empty_space_cancels_hover_expand() {
        let forest = forest();
        let search = forest.search();
        let mut session = DragSession::<BasicNode>::default();
        let now = Instant::now();

        let request = session
            .pointer_down(&search, &id("P1"), Point::new(10.0, 70.0))
            .unwrap();
        assert!(session.long_press_elapsed(request.token));
        session.refresh_drop_zones(vec![zone("G", true, 30.0), zone("P1", false, 60.0)], now);

        let timer = session.hover(&id("G"), true).unwrap();
        session.pointer_move(&search, Point::new(10.0, 400.0), now);
        assert!(session.hover_elapsed(timer.token).is_none());

        // Native drags report empty space through the renderer.
        session.cancel();
        session.start_native(&search, &id("P2"));
        let timer = session.hover(&id("G"), true).unwrap();
        session.hover_none();
        assert!(session.hover_elapsed(timer.token).is_none());
        let timer = session.hover(&id("G"), true).unwrap();
        assert_eq!(session.hover_elapsed(timer.token), Some(id("G")));
    }

    #[test]
    fn keyboard_drop_checks_the_destination() {
        let forest = forest();
        let search = forest.search();
        let mut session = DragSession::<BasicNode>::default();
        assert!(session.pick_up(&search, &id("G")));

        // Forge a virtual position inside the dragged group itself.
        let state = session.keyboard.clone().unwrap();
        session.keyboard = Some(KeyboardDragState {
            current_parent_id: Some(id("G")),
            current_index: 0,
            siblings_at_current_level: vec![id("P1"), id("P2")],
            ..state
        });
        assert!(matches!(session.keyboard_drop(&search), DropOutcome::Rejected));
        assert!(!session.is_active());
    }

    #[test]
    fn armed_press_is_not_a_drag() {
        let forest = forest();
        let search = forest.search();
        let mut session = DragSession::<BasicNode>::default();
        assert!(session.arm_native(&search, &id("G")));
        assert!(session.is_active());
        assert!(!session.is_dragging());
        session.disarm();
        assert_eq!(session.phase(), DragPhase::Idle);
    }

    #[test]
    fn pointer_up_before_long_press_cancels() {
        let forest = forest();
        let search = forest.search();
        let mut session = DragSession::<BasicNode>::default();
        let request = session
            .pointer_down(&search, &id("P1"), Point::ZERO)
            .unwrap();
        assert!(matches!(session.pointer_up(&search), DropOutcome::Cancelled));
        assert!(!session.long_press_elapsed(request.token));
    }

    #[test]
    fn only_one_session_at_a_time() {
        let forest = forest();
        let search = forest.search();
        let mut session = DragSession::<BasicNode>::default();
        assert!(session.pick_up(&search, &id("P1")));
        assert!(!session.start_native(&search, &id("P2")));
        assert!(session.pointer_down(&search, &id("P2"), Point::ZERO).is_none());
        assert!(!session.pick_up(&search, &id("P2")));
    }

    #[test]
    fn keyboard_cancel_restores_everything() {
        let forest = forest();
        let search = forest.search();
        let mut session = DragSession::<BasicNode>::default();
        session.pick_up(&search, &id("P1"));
        assert_eq!(session.keyboard_step(KeyboardStep::Down), KeyboardMove::Moved);
        assert!(session.take_reflow_request());

        assert!(matches!(session.cancel(), DropOutcome::Cancelled));
        assert!(session.keyboard().is_none());
        assert!(session.preview().is_none());
        assert!(session.take_reflow_request());
        let announcements = session.take_announcements();
        assert!(matches!(
            announcements.last(),
            Some(Announcement::Cancelled { .. })
        ));
    }

    #[test]
    fn hover_expand_only_while_dragging() {
        let forest = forest();
        let search = forest.search();
        let mut session = DragSession::<BasicNode>::default();
        assert!(session.hover(&id("G"), true).is_none());

        session.start_native(&search, &id("P1"));
        let request = session.hover(&id("G"), true).unwrap();
        assert!(session.hover(&id("G"), true).is_none());
        assert_eq!(session.hover_elapsed(request.token), Some(id("G")));

        let stale = session.hover(&id("S"), true).unwrap();
        session.cancel();
        assert_eq!(session.hover_elapsed(stale.token), None);
    }

    #[test]
    fn auto_scroll_stops_with_the_session() {
        let forest = forest();
        let search = forest.search();
        let mut session = DragSession::<BasicNode>::default();
        let container = Rect::new(0.0, 0.0, 200.0, 400.0);

        assert!(!session.update_auto_scroll(395.0, container));
        session.start_native(&search, &id("P1"));
        assert!(session.update_auto_scroll(395.0, container));
        assert!(session.auto_scroll_tick().is_some_and(|delta| delta > 0.0));
        session.cancel();
        assert!(session.auto_scroll_tick().is_none());
    }
}
