use kurbo::Rect;

use crate::config::AutoScrollConfig;

/// Scrolls a container while a drag hovers near its top or bottom edge.
///
/// Driven by a per-frame loop: [`AutoScroll::update`] on every pointer move, [`AutoScroll::tick`]
/// once per frame for as long as it keeps returning a delta.
#[derive(Clone, Debug, Default)]
pub struct AutoScroll {
    config: AutoScrollConfig,
    velocity: f64,
}

impl AutoScroll {
    pub fn new(config: AutoScrollConfig) -> Self {
        Self {
            config,
            velocity: 0.0,
        }
    }

    /// Signed scroll speed for a cursor at `cursor_y` over `container`: negative scrolls up,
    /// positive scrolls down, zero outside both edge bands.
    pub fn velocity_for(config: &AutoScrollConfig, cursor_y: f64, container: Rect) -> f64 {
        let threshold = config.edge_threshold.min(container.height() / 2.0);
        if threshold <= 0.0 || cursor_y < container.y0 || cursor_y > container.y1 {
            return 0.0;
        }

        let from_top = cursor_y - container.y0;
        let from_bottom = container.y1 - cursor_y;
        if from_top < threshold {
            -config.max_speed * (1.0 - from_top / threshold)
        } else if from_bottom < threshold {
            config.max_speed * (1.0 - from_bottom / threshold)
        } else {
            0.0
        }
    }

    /// Track a new cursor position. Returns `true` when the frame loop needs to be started.
    pub fn update(&mut self, cursor_y: f64, container: Rect) -> bool {
        let was_active = self.is_active();
        self.velocity = Self::velocity_for(&self.config, cursor_y, container);
        self.is_active() && !was_active
    }

    /// The scroll delta for this frame, or `None` once the loop should stop.
    pub fn tick(&mut self) -> Option<f64> {
        self.is_active().then_some(self.velocity)
    }

    pub fn stop(&mut self) {
        self.velocity = 0.0;
    }

    pub fn is_active(&self) -> bool {
        self.velocity != 0.0
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }
}
