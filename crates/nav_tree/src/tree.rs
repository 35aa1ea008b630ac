use std::{collections::HashSet, ops::Range, rc::Rc, time::Instant};

use gpui::{
    App, AppContext as _, Bounds, Context, DragMoveEvent, ElementId, Entity, EntityId,
    FocusHandle, InteractiveElement as _, IntoElement, KeyDownEvent, ListSizingBehavior,
    MouseButton, MouseDownEvent, MouseMoveEvent, MouseUpEvent, ParentElement as _, Pixels, Point,
    Render, RenderOnce, ScrollStrategy, SharedString, StatefulInteractiveElement as _,
    StyleRefinement, Styled, UniformListScrollHandle, Window, canvas, div, point,
    prelude::FluentBuilder as _, px, uniform_list,
};
use gpui_component::list::ListItem;
use gpui_component::scroll::{Scrollbar, ScrollbarState};
use gpui_component::{ActiveTheme as _, StyledExt as _};
use nav_tree_core::{
    DragConfig, DragModality, DragSession, DropOutcome, DropPosition, DropZone, FlipAnimator,
    Forest, KeyboardMove, KeyboardStep, MoveEvent, PointerMove, Rect, ReorderMode, TimerRequest,
    TimerToken, TreeSearch, apply_move,
};

use crate::item::{NavTreeEntry, NavTreeItem, NavTreeRowState, expand, find};

const CONTEXT: &str = "NavTree";

type RenderItem =
    Rc<dyn Fn(usize, &NavTreeEntry, NavTreeRowState, &mut Window, &mut App) -> ListItem>;
type OnMove = Rc<dyn Fn(&MoveEvent<NavTreeItem>, &mut Window, &mut App)>;

/// Create a [`NavTree`].
pub fn nav_tree<R>(state: &Entity<NavTreeState>, render_item: R) -> NavTree
where
    R: Fn(usize, &NavTreeEntry, NavTreeRowState, &mut Window, &mut App) -> ListItem + 'static,
{
    NavTree::new(state, render_item)
}

#[derive(Clone)]
struct NavTreeDrag {
    tree_id: EntityId,
    item_id: SharedString,
    label: SharedString,
}

struct DragGhost {
    label: SharedString,
}

impl Render for DragGhost {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        div()
            .px(px(10.))
            .py(px(6.))
            .rounded(px(8.))
            .bg(theme.popover)
            .border_1()
            .border_color(theme.border)
            .shadow_md()
            .text_color(theme.popover_foreground)
            .text_sm()
            .child(self.label.clone())
    }
}

/// State for a reorderable navigation tree.
pub struct NavTreeState {
    focus_handle: FocusHandle,
    forest: Forest<NavTreeItem>,
    entries: Vec<NavTreeEntry>,
    session: DragSession<NavTreeItem>,
    reorder_mode: ReorderMode,
    flip: FlipAnimator<SharedString>,
    flip_pending: bool,
    scrollbar_state: ScrollbarState,
    scroll_handle: UniformListScrollHandle,
    list_bounds: Bounds<Pixels>,
    selected_id: Option<SharedString>,
    long_press_drag: bool,
    suppress_click: bool,
    announcement: Option<SharedString>,
    on_move: Option<OnMove>,
    render_item: RenderItem,
}

impl NavTreeState {
    pub fn new(cx: &mut App) -> Self {
        let config = DragConfig::default();
        Self {
            focus_handle: cx.focus_handle(),
            forest: Forest::default(),
            entries: Vec::new(),
            flip: FlipAnimator::new(config.flip_duration()),
            session: DragSession::new(config),
            reorder_mode: ReorderMode::default(),
            flip_pending: false,
            scrollbar_state: ScrollbarState::default(),
            scroll_handle: UniformListScrollHandle::default(),
            list_bounds: Bounds::default(),
            selected_id: None,
            long_press_drag: false,
            suppress_click: false,
            announcement: None,
            on_move: None,
            render_item: Rc::new(|_, _, _, _, _| ListItem::new("nav-tree-empty")),
        }
    }

    pub fn config(mut self, config: DragConfig) -> Self {
        self.flip = FlipAnimator::new(config.flip_duration());
        self.session = DragSession::new(config).reorder_mode(self.reorder_mode);
        self.session.set_external_handler(self.on_move.is_some());
        self
    }

    pub fn reorder_mode(mut self, mode: ReorderMode) -> Self {
        self.reorder_mode = mode;
        self.session.set_reorder_mode(mode);
        self
    }

    /// Start drags with a long press instead of the platform drag gesture.
    pub fn long_press_drag(mut self, long_press_drag: bool) -> Self {
        self.long_press_drag = long_press_drag;
        self
    }

    /// Called with every committed move. In [`ReorderMode::Auto`] a handler takes over
    /// reordering, and should answer with [`NavTreeState::apply_move`] or
    /// [`NavTreeState::set_items`].
    pub fn on_move(
        mut self,
        on_move: impl Fn(&MoveEvent<NavTreeItem>, &mut Window, &mut App) + 'static,
    ) -> Self {
        self.on_move = Some(Rc::new(on_move));
        self.session.set_external_handler(true);
        self
    }

    pub fn items(mut self, items: impl Into<Vec<NavTreeItem>>) -> Self {
        self.forest.set_roots(items);
        self.rebuild_entries();
        self
    }

    pub fn set_items(&mut self, items: impl Into<Vec<NavTreeItem>>, cx: &mut Context<Self>) {
        self.session.cancel();
        self.session.take_reflow_request();
        self.forest.set_roots(items);
        self.flip.finish();
        self.rebuild_entries();
        cx.notify();
    }

    /// Apply a move handed out by the tree, e.g. from an [`NavTreeState::on_move`] handler.
    pub fn apply_move(&mut self, event: &MoveEvent<NavTreeItem>, cx: &mut Context<Self>) {
        let roots = apply_move(self.forest.roots(), event);
        self.forest.set_roots(roots);
        self.reveal(event);
        self.reflow(cx);
    }

    pub fn root_items(&self) -> &[NavTreeItem] {
        self.forest.roots()
    }

    pub fn entries(&self) -> &[NavTreeEntry] {
        &self.entries
    }

    pub fn selected_entry(&self) -> Option<&NavTreeEntry> {
        let selected_id = self.selected_id.as_ref()?;
        self.entries
            .iter()
            .find(|entry| entry.item().id == *selected_id)
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_dragging()
    }

    /// The latest screen-reader message about a keyboard drag.
    pub fn announcement(&self) -> Option<&SharedString> {
        self.announcement.as_ref()
    }

    fn rebuild_entries(&mut self) {
        self.entries.clear();
        let search = self.forest.search();
        flatten(
            &search,
            &self.session,
            self.forest.roots(),
            None,
            0,
            &mut self.entries,
            &mut HashSet::new(),
        );
    }

    /// Rebuild the rows and animate them from where they were.
    fn reflow(&mut self, cx: &mut Context<Self>) {
        self.flip.capture(self.row_positions());
        self.rebuild_entries();
        self.flip_pending = true;
        cx.notify();
    }

    /// Pick up whatever the session reported since the last call.
    fn sync(&mut self, cx: &mut Context<Self>) {
        if let Some(announcement) = self.session.take_announcements().pop() {
            let announcement = announcement.to_string();
            log::debug!("announce: {announcement}");
            self.announcement = Some(announcement.into());
        }
        if self.session.take_reflow_request() {
            self.reflow(cx);
        } else {
            cx.notify();
        }
    }

    fn reveal(&mut self, event: &MoveEvent<NavTreeItem>) {
        if let Some(parent_id) = event.to_parent_id.as_ref() {
            self.expand_path(parent_id);
        }
        self.selected_id = Some(event.item.id.clone());
    }

    /// Expand `id` and every container above it.
    fn expand_path(&self, id: &SharedString) {
        let path = self.forest.search().path_to(id).unwrap_or_default();
        for id in &path {
            expand(self.forest.roots(), id);
        }
    }

    fn finish(
        &mut self,
        outcome: DropOutcome<NavTreeItem>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        match outcome {
            DropOutcome::Reordered { roots, event } => {
                self.forest.set_roots(roots);
                self.reveal(&event);
                self.emit_move(event, window, cx);
            }
            DropOutcome::MoveRequested(event) => {
                if self.on_move.is_none() {
                    log::warn!(
                        "move of {:?} was requested but nothing handles moves",
                        event.item.id
                    );
                }
                self.emit_move(event, window, cx);
            }
            DropOutcome::Unchanged | DropOutcome::Rejected | DropOutcome::Cancelled => {}
        }
        self.sync(cx);
    }

    fn emit_move(&self, event: MoveEvent<NavTreeItem>, window: &mut Window, cx: &mut App) {
        let Some(on_move) = self.on_move.clone() else {
            return;
        };
        // The handler may want to update this tree, which is still borrowed here.
        window.defer(cx, move |window, cx| on_move(&event, window, cx));
    }

    fn row_height(&self) -> Pixels {
        self.scroll_handle
            .0
            .borrow()
            .last_item_size
            .map(|s| s.item.height)
            .unwrap_or(px(28.))
    }

    fn scroll_y(&self) -> Pixels {
        self.scroll_handle.0.borrow().base_handle.offset().y
    }

    fn row_rect(&self, ix: usize, row_height: Pixels, scroll_y: Pixels) -> Rect {
        let top = self.list_bounds.origin.y + scroll_y + row_height * ix;
        Rect::new(
            to_f64(self.list_bounds.left()),
            to_f64(top),
            to_f64(self.list_bounds.right()),
            to_f64(top + row_height),
        )
    }

    /// The row drawn at window coordinate `y`, if any.
    fn row_at(&self, y: Pixels) -> Option<usize> {
        let top = self.list_bounds.origin.y + self.scroll_y();
        row_index_at(to_f64(y), to_f64(top), to_f64(self.row_height()), self.entries.len())
    }

    fn row_positions(&self) -> Vec<(SharedString, Rect)> {
        let (row_height, scroll_y) = (self.row_height(), self.scroll_y());
        self.entries
            .iter()
            .enumerate()
            .map(|(ix, entry)| (entry.item().id.clone(), self.row_rect(ix, row_height, scroll_y)))
            .collect()
    }

    fn drop_zones(&self) -> Vec<DropZone<SharedString>> {
        let (row_height, scroll_y) = (self.row_height(), self.scroll_y());
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| !entry.is_preview())
            .map(|(ix, entry)| {
                entry
                    .binding()
                    .drop_zone(self.row_rect(ix, row_height, scroll_y))
            })
            .collect()
    }

    fn scroll_by(&self, delta: f64) {
        let state = self.scroll_handle.0.borrow();
        let handle = &state.base_handle;
        let offset = handle.offset();
        let max = f32::from(handle.max_offset().height);
        let y = (f32::from(offset.y) - delta as f32).clamp(-max, 0.);
        handle.set_offset(point(offset.x, px(y)));
    }

    fn schedule_long_press(&mut self, request: TimerRequest, cx: &mut Context<Self>) {
        cx.spawn(async move |this, cx| {
            cx.background_executor().timer(request.delay).await;
            this.update(cx, |this, cx| this.on_long_press(request.token, cx))
                .ok();
        })
        .detach();
    }

    fn schedule_hover_expand(&mut self, request: TimerRequest, cx: &mut Context<Self>) {
        cx.spawn(async move |this, cx| {
            cx.background_executor().timer(request.delay).await;
            this.update(cx, |this, cx| this.on_hover_elapsed(request.token, cx))
                .ok();
        })
        .detach();
    }

    fn on_long_press(&mut self, token: TimerToken, cx: &mut Context<Self>) {
        if !self.session.long_press_elapsed(token) {
            return;
        }
        self.suppress_click = true;
        self.selected_id = self.session.dragged().map(|dragged| dragged.id.clone());
        let zones = self.drop_zones();
        self.session.refresh_drop_zones(zones, Instant::now());
        cx.notify();
    }

    fn on_hover_elapsed(&mut self, token: TimerToken, cx: &mut Context<Self>) {
        let Some(id) = self.session.hover_elapsed(token) else {
            return;
        };
        if expand(self.forest.roots(), &id) {
            self.reflow(cx);
        }
    }

    /// Feed the hover-expand countdown with the row under the drag.
    fn hover_row(&mut self, id: &SharedString, cx: &mut Context<Self>) {
        let collapsed = self
            .entries
            .iter()
            .find(|entry| entry.item().id == *id)
            .is_some_and(|entry| entry.is_container() && !entry.is_expanded());
        if let Some(request) = self.session.hover(id, collapsed) {
            self.schedule_hover_expand(request, cx);
        }
    }

    fn toggle_expand(&mut self, id: &SharedString, cx: &mut Context<Self>) {
        let Some(item) = find(self.forest.roots(), id) else {
            return;
        };
        if !item.is_container() {
            return;
        }
        item.set_expanded(!item.is_expanded());
        self.reflow(cx);
    }

    fn on_entry_click(&mut self, ix: usize, window: &mut Window, cx: &mut Context<Self>) {
        if std::mem::take(&mut self.suppress_click) || !accepts_click(&self.session) {
            return;
        }
        // A press that never turned into a drag.
        self.session.disarm();
        let Some(entry) = self.entries.get(ix) else {
            return;
        };
        let id = entry.item().id.clone();
        window.focus(&self.focus_handle);
        self.selected_id = Some(id.clone());
        self.toggle_expand(&id, cx);
        cx.notify();
    }

    fn on_row_mouse_down(
        &mut self,
        id: &SharedString,
        event: &MouseDownEvent,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        window.focus(&self.focus_handle);
        self.suppress_click = false;
        let search = self.forest.search();
        if self.long_press_drag {
            let at = to_point(event.position);
            if let Some(request) = self.session.pointer_down(&search, id, at) {
                self.schedule_long_press(request, cx);
            }
        } else {
            self.session.arm_native(&search, id);
        }
    }

    fn on_drag_start(&mut self, drag: &NavTreeDrag, cx: &mut Context<Self>) {
        let search = self.forest.search();
        if self.session.start_native(&search, &drag.item_id) {
            self.selected_id = Some(drag.item_id.clone());
        }
        self.sync(cx);
    }

    fn on_row_drag_move(
        &mut self,
        ix: usize,
        event: &DragMoveEvent<NavTreeDrag>,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if !cx.has_active_drag() {
            return;
        }
        if event.drag(cx).tree_id != cx.entity_id() {
            return;
        }
        let position = event.event.position;
        if !event.bounds.contains(&position) {
            return;
        }

        // The dragged node's own preview row moves with the cursor; hovering it says nothing.
        let Some(entry) = self.entries.get(ix).filter(|entry| !entry.is_preview()) else {
            return;
        };
        let zone = entry.binding().drop_zone(to_rect(event.bounds));

        let search = self.forest.search();
        let changed = self
            .session
            .native_drag_over(&search, &zone, to_f64(position.y));
        self.hover_row(&zone.id, cx);
        if changed {
            self.sync(cx);
        }
    }

    fn on_drag_move(
        &mut self,
        event: &DragMoveEvent<NavTreeDrag>,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if !cx.has_active_drag() || !self.session.is_dragging() {
            return;
        }
        if event.drag(cx).tree_id != cx.entity_id() {
            return;
        }

        let position = event.event.position;
        let start_scrolling = self
            .session
            .update_auto_scroll(to_f64(position.y), to_rect(event.bounds));
        if !event.bounds.contains(&position) {
            self.session.hover_none();
            if self.session.clear_target() {
                self.sync(cx);
            }
            return;
        }
        if self.row_at(position.y).is_none() {
            self.session.hover_none();
        }
        if start_scrolling {
            cx.notify();
        }
    }

    fn on_drop(&mut self, drag: &NavTreeDrag, window: &mut Window, cx: &mut Context<Self>) {
        if drag.tree_id != cx.entity_id() {
            return;
        }
        let search = self.forest.search();
        let outcome = self.session.native_drop(&search);
        self.finish(outcome, window, cx);
    }

    fn on_pointer_move(
        &mut self,
        event: &MouseMoveEvent,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if self.session.modality() != Some(DragModality::Pointer) {
            return;
        }

        let now = Instant::now();
        let search = self.forest.search();
        match self.session.pointer_move(&search, to_point(event.position), now) {
            PointerMove::Ignored | PointerMove::Pending => {}
            PointerMove::Cancelled => self.sync(cx),
            PointerMove::Dragging {
                target_changed,
                refresh_zones,
            } => {
                if refresh_zones {
                    let zones = self.drop_zones();
                    self.session.refresh_drop_zones(zones, now);
                }
                if let Some(target_id) = self.session.drop_target().map(|target| target.id.clone())
                {
                    self.hover_row(&target_id, cx);
                }
                let start_scrolling = self
                    .session
                    .update_auto_scroll(to_f64(event.position.y), to_rect(self.list_bounds));
                if target_changed {
                    self.sync(cx);
                } else if start_scrolling {
                    cx.notify();
                }
            }
        }
    }

    fn on_pointer_up(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        match self.session.modality() {
            Some(DragModality::Pointer) => {
                let search = self.forest.search();
                let outcome = self.session.pointer_up(&search);
                self.finish(outcome, window, cx);
            }
            Some(DragModality::Native) => self.session.disarm(),
            _ => {}
        }
    }

    fn selected_ix(&self) -> Option<usize> {
        let selected_id = self.selected_id.as_ref()?;
        self.entries
            .iter()
            .position(|entry| entry.item().id == *selected_id)
    }

    fn select(&mut self, ix: usize, cx: &mut Context<Self>) {
        let ix = ix.min(self.entries.len().saturating_sub(1));
        let Some(entry) = self.entries.get(ix) else {
            return;
        };
        self.selected_id = Some(entry.item().id.clone());
        self.scroll_handle.scroll_to_item(ix, ScrollStrategy::Center);
        cx.notify();
    }

    fn on_key_down(
        &mut self,
        event: &KeyDownEvent,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> bool {
        if cx.has_active_drag() {
            return false;
        }
        let key = event.keystroke.key.as_str();
        if self.session.modality() == Some(DragModality::Keyboard) {
            return self.on_grabbed_key_down(key, window, cx);
        }
        if self.session.is_active() || self.entries.is_empty() {
            return false;
        }

        let selected_ix = self.selected_ix().unwrap_or(0).min(self.entries.len() - 1);
        let entry = &self.entries[selected_ix];
        let id = entry.item().id.clone();
        match key {
            "up" => {
                self.select(selected_ix.saturating_sub(1), cx);
                true
            }
            "down" => {
                self.select(selected_ix + 1, cx);
                true
            }
            "home" => {
                self.select(0, cx);
                true
            }
            "end" => {
                self.select(self.entries.len() - 1, cx);
                true
            }
            "left" => {
                if entry.is_container() && entry.is_expanded() {
                    self.toggle_expand(&id, cx);
                } else if let Some(parent_ix) = entry.parent_id().and_then(|parent_id| {
                    self.entries
                        .iter()
                        .position(|entry| entry.item().id == *parent_id)
                }) {
                    self.select(parent_ix, cx);
                }
                true
            }
            "right" => {
                if entry.is_container() && !entry.is_expanded() {
                    self.toggle_expand(&id, cx);
                } else if self
                    .entries
                    .get(selected_ix + 1)
                    .is_some_and(|child| child.depth() == entry.depth() + 1)
                {
                    self.select(selected_ix + 1, cx);
                }
                true
            }
            "enter" => {
                self.toggle_expand(&id, cx);
                true
            }
            "space" => {
                if !entry.binding().tab_reachable {
                    return false;
                }
                let search = self.forest.search();
                if self.session.pick_up(&search, &id) {
                    self.selected_id = Some(id);
                }
                self.sync(cx);
                true
            }
            _ => false,
        }
    }

    fn on_grabbed_key_down(
        &mut self,
        key: &str,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> bool {
        let search = self.forest.search();
        let moved = match key {
            "up" => self.session.keyboard_step(KeyboardStep::Up),
            "down" => self.session.keyboard_step(KeyboardStep::Down),
            "left" => self.session.move_out(&search),
            "right" => self.session.move_in(&search),
            "space" | "enter" => {
                let outcome = self.session.keyboard_drop(&search);
                self.finish(outcome, window, cx);
                return true;
            }
            "escape" => {
                self.session.cancel();
                self.sync(cx);
                return true;
            }
            _ => return false,
        };

        if moved == KeyboardMove::Moved
            && let Some(parent_id) = self
                .session
                .keyboard()
                .and_then(|state| state.current_parent_id.clone())
        {
            self.expand_path(&parent_id);
        }
        self.sync(cx);
        if let Some(ix) = self.selected_ix() {
            self.scroll_handle.scroll_to_item(ix, ScrollStrategy::Center);
        }
        true
    }

    fn row_state(&self, entry: &NavTreeEntry) -> NavTreeRowState {
        let id = &entry.item().id;
        let is_dragged = self
            .session
            .dragged()
            .is_some_and(|dragged| dragged.id == *id);
        NavTreeRowState {
            selected: self.selected_id.as_ref() == Some(id),
            dragging: is_dragged && self.session.is_dragging(),
            preview: entry.is_preview(),
            grabbed: is_dragged && self.session.modality() == Some(DragModality::Keyboard),
            drop_target: self
                .session
                .drop_target()
                .filter(|target| target.id == *id && !entry.is_preview())
                .map(|target| target.position),
        }
    }
}

impl Render for NavTreeState {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        // Some drags end without delivering a drop.
        if self.session.modality() == Some(DragModality::Native)
            && self.session.is_dragging()
            && !cx.has_active_drag()
        {
            let search = self.forest.search();
            if let Some(outcome) = self.session.native_drag_end(&search) {
                self.finish(outcome, window, cx);
            }
        }

        if let Some(delta) = self.session.auto_scroll_tick() {
            self.scroll_by(delta);
            window.request_animation_frame();
        }

        if std::mem::take(&mut self.flip_pending) {
            cx.on_next_frame(window, |this, _, cx| {
                if this.flip.animate(this.row_positions(), Instant::now()) {
                    cx.notify();
                }
            });
        }
        let now = Instant::now();
        if self.flip.tick(now) {
            window.request_animation_frame();
        }

        let render_item = Rc::clone(&self.render_item);
        let state_entity = cx.entity();
        let long_press_drag = self.long_press_drag;

        div()
            .id("nav-tree-state")
            .size_full()
            .relative()
            .on_mouse_move(cx.listener(Self::on_pointer_move))
            .on_mouse_up(
                MouseButton::Left,
                cx.listener(|this, _: &MouseUpEvent, window, cx| this.on_pointer_up(window, cx)),
            )
            .on_mouse_up_out(
                MouseButton::Left,
                cx.listener(|this, _: &MouseUpEvent, window, cx| this.on_pointer_up(window, cx)),
            )
            .child(
                canvas(
                    {
                        let state_entity = state_entity.clone();
                        move |bounds, _, cx| {
                            state_entity.update(cx, |state, _| state.list_bounds = bounds)
                        }
                    },
                    |_, _, _, _| {},
                )
                .absolute()
                .size_full(),
            )
            .child(
                uniform_list("entries", self.entries.len(), {
                    cx.processor(move |state, visible_range: Range<usize>, window, cx| {
                        let drop_target_bg = cx.theme().drop_target;
                        let now = Instant::now();
                        let mut items = Vec::with_capacity(visible_range.len());
                        for ix in visible_range {
                            let entry = &state.entries[ix];
                            let row_state = state.row_state(entry);
                            let offset = state.flip.offset(&entry.item().id, now);

                            let item = (render_item)(ix, entry, row_state, window, cx);
                            let is_disabled = entry.is_disabled();
                            let draggable = entry.binding().draggable;
                            let item_id = entry.item().id.clone();
                            let drag_value = NavTreeDrag {
                                tree_id: cx.entity_id(),
                                item_id: item_id.clone(),
                                label: entry.item().label.clone(),
                            };

                            let row = div()
                                .id(ix)
                                .relative()
                                .top(px(offset.y as f32))
                                .when(
                                    matches!(
                                        row_state.drop_target,
                                        Some(DropPosition::Before | DropPosition::After)
                                    ),
                                    |this| this.bg(drop_target_bg),
                                )
                                .child(
                                    item.disabled(is_disabled)
                                        .selected(row_state.selected || row_state.grabbed),
                                )
                                .on_drag_move::<NavTreeDrag>(cx.listener(
                                    move |this, ev, window, cx| {
                                        this.on_row_drag_move(ix, ev, window, cx);
                                    },
                                ))
                                .when(draggable, |this| {
                                    this.on_mouse_down(
                                        MouseButton::Left,
                                        cx.listener(move |this, ev, window, cx| {
                                            this.on_row_mouse_down(&item_id, ev, window, cx);
                                        }),
                                    )
                                })
                                .when(!is_disabled, |this| {
                                    this.on_click(cx.listener(move |this, _, window, cx| {
                                        this.on_entry_click(ix, window, cx);
                                    }))
                                })
                                .when(draggable && !long_press_drag, |this| {
                                    let state_entity = state_entity.clone();
                                    this.on_drag(drag_value, move |drag, _, _, cx| {
                                        state_entity.update(cx, |state, cx| {
                                            state.on_drag_start(drag, cx);
                                        });
                                        let label = drag.label.clone();
                                        cx.new(|_| DragGhost { label })
                                    })
                                });

                            items.push(row);
                        }
                        items
                    })
                })
                .on_drag_move::<NavTreeDrag>(cx.listener(Self::on_drag_move))
                .on_drop::<NavTreeDrag>(cx.listener(Self::on_drop))
                .flex_grow()
                .size_full()
                .track_scroll(self.scroll_handle.clone())
                .with_sizing_behavior(ListSizingBehavior::Auto)
                .into_any_element(),
            )
            .child(
                div()
                    .absolute()
                    .top_0()
                    .right_0()
                    .bottom_0()
                    .w(px(12.))
                    .child(Scrollbar::uniform_scroll(
                        &self.scrollbar_state,
                        &self.scroll_handle,
                    )),
            )
    }
}

/// A reorderable navigation tree element.
#[derive(IntoElement)]
pub struct NavTree {
    id: ElementId,
    state: Entity<NavTreeState>,
    style: StyleRefinement,
    render_item: RenderItem,
}

impl NavTree {
    pub fn new<R>(state: &Entity<NavTreeState>, render_item: R) -> Self
    where
        R: Fn(usize, &NavTreeEntry, NavTreeRowState, &mut Window, &mut App) -> ListItem + 'static,
    {
        Self {
            id: ElementId::Name(format!("nav-tree-{}", state.entity_id()).into()),
            state: state.clone(),
            style: StyleRefinement::default(),
            render_item: Rc::new(render_item),
        }
    }
}

impl Styled for NavTree {
    fn style(&mut self) -> &mut StyleRefinement {
        &mut self.style
    }
}

impl RenderOnce for NavTree {
    fn render(self, _window: &mut Window, cx: &mut App) -> impl IntoElement {
        let focus_handle = self.state.read(cx).focus_handle.clone();
        let state_entity = self.state.clone();
        self.state
            .update(cx, |state, _| state.render_item = self.render_item);

        div()
            .id(self.id)
            .key_context(CONTEXT)
            .track_focus(&focus_handle)
            .on_key_down(move |event, window, cx| {
                let handled = state_entity
                    .update(cx, |state, cx| state.on_key_down(event, window, cx));
                if handled {
                    window.prevent_default();
                    cx.stop_propagation();
                }
            })
            .size_full()
            .child(self.state)
            .refine_style(&self.style)
    }
}

/// Flatten the visible rows, with the live preview applied at every level.
fn flatten(
    search: &TreeSearch<'_, NavTreeItem>,
    session: &DragSession<NavTreeItem>,
    siblings: &[NavTreeItem],
    parent_id: Option<&SharedString>,
    depth: usize,
    out: &mut Vec<NavTreeEntry>,
    visited: &mut HashSet<SharedString>,
) {
    for item in session.items_with_preview(siblings, parent_id) {
        if !visited.insert(item.id.clone()) {
            continue;
        }
        out.push(NavTreeEntry {
            item: item.clone(),
            depth,
            parent_id: parent_id.cloned(),
            is_preview: session.is_preview_item(search, &item.id),
        });
        if item.is_expanded() {
            flatten(
                search,
                session,
                &item.children,
                Some(&item.id),
                depth + 1,
                out,
                visited,
            );
        }
    }
}

/// Clicks select and toggle rows unless a drag is underway. An armed press is still a click.
fn accepts_click<T: nav_tree_core::NavNode>(session: &DragSession<T>) -> bool {
    !session.is_dragging()
}

fn row_index_at(y: f64, top: f64, row_height: f64, row_count: usize) -> Option<usize> {
    if row_height <= 0. || y < top {
        return None;
    }
    let ix = ((y - top) / row_height) as usize;
    (ix < row_count).then_some(ix)
}

fn to_f64(value: Pixels) -> f64 {
    f64::from(f32::from(value))
}

fn to_point(position: Point<Pixels>) -> nav_tree_core::Point {
    nav_tree_core::Point::new(to_f64(position.x), to_f64(position.y))
}

fn to_rect(bounds: Bounds<Pixels>) -> Rect {
    Rect::new(
        to_f64(bounds.left()),
        to_f64(bounds.top()),
        to_f64(bounds.right()),
        to_f64(bounds.bottom()),
    )
}
