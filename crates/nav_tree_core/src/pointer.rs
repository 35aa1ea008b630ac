use std::time::{Duration, Instant};

use kurbo::{Point, Rect};

use crate::constraints::DropPosition;
use crate::node::NavNode;
use crate::timer::TimerToken;

/// A rendered node that accepts drops.
#[derive(Clone, Debug, PartialEq)]
pub struct DropZone<Id> {
    pub id: Id,
    pub is_container: bool,
    pub bounds: Rect,
}

/// Map a cursor height over a zone to a drop position.
///
/// Leaf zones split at their midpoint. Container zones split into thirds so the middle band
/// drops inside.
pub fn drop_position_for(cursor_y: f64, bounds: Rect, is_container: bool) -> DropPosition {
    let offset = cursor_y - bounds.y0;
    let height = bounds.height();
    if is_container {
        if offset < height / 3.0 {
            DropPosition::Before
        } else if offset > height * 2.0 / 3.0 {
            DropPosition::After
        } else {
            DropPosition::Inside
        }
    } else if offset < height / 2.0 {
        DropPosition::Before
    } else {
        DropPosition::After
    }
}

/// Drop-zone bounds captured at one point in time.
#[derive(Clone, Debug)]
pub struct DropZoneCache<Id> {
    zones: Vec<DropZone<Id>>,
    captured_at: Instant,
}

impl<Id> DropZoneCache<Id> {
    pub fn new(zones: Vec<DropZone<Id>>, captured_at: Instant) -> Self {
        Self { zones, captured_at }
    }

    pub fn zones(&self) -> &[DropZone<Id>] {
        &self.zones
    }

    pub fn is_stale(&self, now: Instant, max_age: Duration) -> bool {
        now.saturating_duration_since(self.captured_at) >= max_age
    }

    /// The zone under `point`. Nested zones overlap, so the smallest one wins.
    pub fn zone_at(&self, point: Point) -> Option<&DropZone<Id>> {
        self.zones
            .iter()
            .filter(|zone| zone.bounds.contains(point))
            .min_by(|a, b| a.bounds.area().total_cmp(&b.bounds.area()))
    }
}

/// A touch/pointer drag: armed on press, dragging once the long-press fires.
#[derive(Clone, Debug)]
pub struct PointerDragState<T: NavNode> {
    pub item: T,
    pub id: T::Id,
    pub parent_id: Option<T::Id>,
    pub index: usize,
    pub start: Point,
    pub current: Point,
    pub is_dragging: bool,
    pub pending_timer: Option<TimerToken>,
}

impl<T: NavNode> PointerDragState<T> {
    pub fn distance(&self) -> f64 {
        self.start.distance(self.current)
    }
}
