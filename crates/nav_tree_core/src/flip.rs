//! First-Last-Invert-Play reflow animation.
//!
//! 1. [`FlipAnimator::capture`] the bounds of every visible node before a reorder-affecting
//!    change.
//! 2. Apply the change and wait for one completed layout pass.
//! 3. [`FlipAnimator::animate`] with the new bounds: each node gets an offset that puts it back
//!    where it was, which [`FlipAnimator::offset`] then eases to zero.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use kurbo::{Rect, Vec2};

#[derive(Clone, Debug)]
struct Animation<Id> {
    started: Instant,
    offsets: HashMap<Id, Vec2>,
}

#[derive(Clone, Debug)]
pub struct FlipAnimator<Id> {
    duration: Duration,
    captured: HashMap<Id, Rect>,
    animation: Option<Animation<Id>>,
}

impl<Id: Clone + Eq + Hash> FlipAnimator<Id> {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            captured: HashMap::new(),
            animation: None,
        }
    }

    /// Record where things are before the layout changes.
    ///
    /// Ignored while an animation is in flight; those positions are already offset.
    pub fn capture(&mut self, positions: impl IntoIterator<Item = (Id, Rect)>) {
        if self.animation.is_some() {
            return;
        }
        self.captured = positions.into_iter().collect();
    }

    pub fn has_capture(&self) -> bool {
        !self.captured.is_empty()
    }

    /// Start animating from the captured positions to `positions`.
    ///
    /// Returns `false` (and does nothing) if an animation is already running, nothing was
    /// captured, or nothing moved.
    pub fn animate(
        &mut self,
        positions: impl IntoIterator<Item = (Id, Rect)>,
        now: Instant,
    ) -> bool {
        if self.animation.is_some() || self.captured.is_empty() {
            return false;
        }

        let offsets: HashMap<Id, Vec2> = positions
            .into_iter()
            .filter_map(|(id, last)| {
                let first = self.captured.get(&id)?;
                let delta = first.origin() - last.origin();
                (delta != Vec2::ZERO).then_some((id, delta))
            })
            .collect();

        if offsets.is_empty() || self.duration.is_zero() {
            self.captured.clear();
            return false;
        }

        self.animation = Some(Animation {
            started: now,
            offsets,
        });
        true
    }

    /// The compensating offset for `id` at `now`.
    pub fn offset(&self, id: &Id, now: Instant) -> Vec2 {
        let Some(animation) = &self.animation else {
            return Vec2::ZERO;
        };
        let Some(offset) = animation.offsets.get(id) else {
            return Vec2::ZERO;
        };
        *offset * (1.0 - self.progress(animation, now))
    }

    /// Advance the animation. Returns `true` while another frame is needed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(animation) = &self.animation else {
            return false;
        };
        if self.progress(animation, now) < 1.0 {
            return true;
        }
        self.finish();
        false
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Drop any capture and running animation.
    pub fn finish(&mut self) {
        self.animation = None;
        self.captured.clear();
    }

    fn progress(&self, animation: &Animation<Id>, now: Instant) -> f64 {
        let total = self.duration.as_secs_f64();
        if total <= 0.0 {
            return 1.0;
        }
        let t = (now.saturating_duration_since(animation.started).as_secs_f64() / total)
            .clamp(0.0, 1.0);
        t * t * (3.0 - 2.0 * t)
    }
}
