use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::ActiveTheme as _;
use gpui_component::list::ListItem;
use gpui_component::{Icon, Sizable as _, h_flex, v_flex};
use gpui_nav_tree::{
    DragConfig, DropPosition, NavKind, NavTreeEntry, NavTreeItem, NavTreeRowState, NavTreeState,
    nav_tree,
};

pub struct NavTreeExample {
    tree: Entity<NavTreeState>,
}

impl NavTreeExample {
    pub fn view(
        config: DragConfig,
        long_press_drag: bool,
        _window: &mut Window,
        cx: &mut App,
    ) -> Entity<Self> {
        let tree = cx.new(|cx| {
            let tree = cx.entity().downgrade();
            NavTreeState::new(cx)
                .config(config)
                .long_press_drag(long_press_drag)
                .on_move(move |event, _, cx| {
                    log::info!(
                        "moved {} from {:?} to {:?} at {}",
                        event.item.id,
                        event.from_parent_id,
                        event.to_parent_id,
                        event.to_index
                    );
                    tree.update(cx, |tree: &mut NavTreeState, cx| tree.apply_move(event, cx)).ok();
                })
                .items(demo_items())
        });
        cx.new(|_| Self { tree })
    }
}

impl Render for NavTreeExample {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let tree = self.tree.read(cx);
        let tree_dump = format_tree(tree.root_items());
        let selected_id = tree
            .selected_entry()
            .map(|entry| entry.item().id.to_string())
            .unwrap_or_else(|| "<none>".to_string());
        let announcement = tree
            .announcement()
            .map(|announcement| announcement.to_string())
            .unwrap_or_default();

        v_flex()
            .size_full()
            .p(px(16.))
            .gap_y_3()
            .child(
                v_flex()
                    .gap_y_1()
                    .child(
                        div()
                            .text_xl()
                            .font_weight(FontWeight::BOLD)
                            .child("Navigation Tree"),
                    )
                    .child(
                        div()
                            .text_sm()
                            .text_color(theme.muted_foreground)
                            .child("Drag pages and groups to reorder them. Sections only move between sections. Hover a collapsed group to open it, drag near the top or bottom edge to scroll."),
                    )
                    .child(
                        div()
                            .text_sm()
                            .text_color(theme.muted_foreground)
                            .child("Keyboard: Space picks up the selected row, arrows move it (Left leaves a group, Right enters the group above), Space drops, Escape cancels."),
                    )
                    .child(
                        div()
                            .text_sm()
                            .text_color(theme.muted_foreground)
                            .child(format!("Selected: {selected_id}")),
                    )
                    .child(
                        div()
                            .text_sm()
                            .text_color(theme.foreground)
                            .child(announcement),
                    ),
            )
            .child(
                h_flex()
                    .flex_1()
                    .min_h(px(0.))
                    .gap_x_3()
                    .child(
                        v_flex()
                            .w(px(420.))
                            .min_w(px(0.))
                            .h_full()
                            .gap_y_2()
                            .child(div().text_sm().font_weight(FontWeight::MEDIUM).child("Tree"))
                            .child(
                                div()
                                    .flex_1()
                                    .min_h(px(0.))
                                    .rounded(px(12.))
                                    .border_1()
                                    .border_color(theme.border)
                                    .bg(theme.background)
                                    .child(nav_tree(
                                        &self.tree,
                                        move |ix, entry, row_state, _window, cx| {
                                            render_tree_row(ix, entry, row_state, cx)
                                        },
                                    )),
                            ),
                    )
                    .child(
                        v_flex()
                            .flex_1()
                            .min_w(px(0.))
                            .h_full()
                            .gap_y_2()
                            .child(
                                div()
                                    .text_sm()
                                    .font_weight(FontWeight::MEDIUM)
                                    .child("Debug (tree structure)"),
                            )
                            .child(
                                div()
                                    .flex_1()
                                    .min_h(px(0.))
                                    .rounded(px(12.))
                                    .border_1()
                                    .border_color(theme.border)
                                    .bg(theme.background)
                                    .p(px(12.))
                                    .child(render_tree_dump(tree_dump)),
                            ),
                    ),
            )
    }
}

fn render_tree_row(
    ix: usize,
    entry: &NavTreeEntry,
    row_state: NavTreeRowState,
    cx: &mut App,
) -> ListItem {
    let theme = cx.theme();
    let indent = px(16.) * entry.depth();
    let item = entry.item();

    let icon_path = match item.kind {
        NavKind::Section => "icons/library.svg",
        NavKind::Group if entry.is_expanded() => "icons/folder-open.svg",
        NavKind::Group => "icons/folder.svg",
        NavKind::Page if row_state.selected => "icons/pen-line.svg",
        NavKind::Page => "icons/text-align-start.svg",
    };
    let icon_color = if row_state.selected {
        theme.foreground
    } else {
        theme.muted_foreground
    };

    ListItem::new(ix)
        .pl(px(10.) + indent)
        .when(row_state.dragging && !row_state.preview, |this| this.opacity(0.4))
        .when(row_state.preview || row_state.grabbed, |this| {
            this.border_1().border_color(theme.drag_border)
        })
        .when(row_state.drop_target == Some(DropPosition::Inside), |this| {
            this.bg(theme.drop_target)
        })
        .child(
            h_flex()
                .gap_x_2()
                .items_center()
                .child(Icon::empty().path(icon_path).small().text_color(icon_color))
                .child(item.label.clone())
                .when(item.kind == NavKind::Section, |this| {
                    this.font_weight(FontWeight::SEMIBOLD)
                }),
        )
}

fn render_tree_dump(text: String) -> impl IntoElement {
    let lines = text
        .lines()
        .map(|line| div().text_sm().child(line.to_string()));
    v_flex().gap_y_0p5().children(lines)
}

fn format_tree(items: &[NavTreeItem]) -> String {
    fn walk(items: &[NavTreeItem], depth: usize, out: &mut String) {
        for item in items {
            out.push_str(&"  ".repeat(depth));
            out.push_str(item.id.as_str());
            out.push('\n');
            walk(&item.children, depth + 1, out);
        }
    }

    let mut out = String::new();
    walk(items, 0, &mut out);
    out
}

fn demo_items() -> Vec<NavTreeItem> {
    vec![
        NavTreeItem::section("start", "Getting started")
            .expanded(true)
            .child(NavTreeItem::page("start/intro", "Introduction"))
            .child(NavTreeItem::page("start/install", "Installation"))
            .child(
                NavTreeItem::group("start/tutorials", "Tutorials")
                    .expanded(true)
                    .child(NavTreeItem::page("start/tutorials/first-app", "Your first app"))
                    .child(NavTreeItem::page("start/tutorials/state", "Managing state")),
            ),
        NavTreeItem::section("guides", "Guides")
            .expanded(true)
            .child(
                NavTreeItem::group("guides/layout", "Layout")
                    .child(NavTreeItem::page("guides/layout/flex", "Flex"))
                    .child(NavTreeItem::page("guides/layout/grid", "Grid")),
            )
            .child(NavTreeItem::group("guides/theming", "Theming"))
            .child(NavTreeItem::page("guides/testing", "Testing")),
        NavTreeItem::section("reference", "Reference")
            .child(NavTreeItem::page("reference/api", "API"))
            .child(NavTreeItem::page("reference/changelog", "Changelog").disabled(true)),
    ]
}
