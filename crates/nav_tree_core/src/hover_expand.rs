use std::collections::HashSet;
use std::hash::Hash;
use std::time::Duration;

use crate::timer::{TimerRequest, TimerToken, TokenSource};

/// Expands a collapsed container once a drag has hovered it for long enough.
#[derive(Clone, Debug)]
pub struct HoverExpand<Id> {
    delay: Duration,
    pending: Option<(Id, TimerToken)>,
    expanded: HashSet<Id>,
    tokens: TokenSource,
}

impl<Id: Clone + Eq + Hash> HoverExpand<Id> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            expanded: HashSet::new(),
            tokens: TokenSource::default(),
        }
    }

    /// The drag is over `id`. Returns a timer to schedule when a new countdown starts.
    ///
    /// Hovering the container that is already counting down, or one this controller already
    /// expanded, is a no-op. Hovering anything that is not a collapsed container cancels the
    /// pending countdown.
    pub fn hover(&mut self, id: &Id, is_collapsed_container: bool) -> Option<TimerRequest> {
        if !is_collapsed_container {
            self.cancel();
            return None;
        }
        if self.is_pending(id) || self.expanded.contains(id) {
            return None;
        }

        let token = self.tokens.next();
        self.pending = Some((id.clone(), token));
        Some(TimerRequest {
            token,
            delay: self.delay,
        })
    }

    /// The drag left `id` before its countdown finished.
    pub fn leave(&mut self, id: &Id) {
        if self.is_pending(id) {
            self.cancel();
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// A countdown finished. Returns the container to expand, unless `token` is stale.
    pub fn elapsed(&mut self, token: TimerToken) -> Option<Id> {
        let (id, _) = self.pending.take_if(|(_, pending)| *pending == token)?;
        self.expanded.insert(id.clone());
        Some(id)
    }

    pub fn is_pending(&self, id: &Id) -> bool {
        self.pending.as_ref().is_some_and(|(pending, _)| pending == id)
    }

    /// Forget everything, including which containers were already expanded.
    pub fn reset(&mut self) {
        self.pending = None;
        self.expanded.clear();
    }
}
