use std::time::Duration;

/// Identifies one scheduled delayed callback.
///
/// Tokens are never reused, so a callback that fires after its owner moved on is recognised as
/// stale and ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

/// A delayed callback the caller must schedule, reporting back with `token` once `delay` has
/// elapsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerRequest {
    pub token: TimerToken,
    pub delay: Duration,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct TokenSource {
    next: u64,
}

impl TokenSource {
    pub(crate) fn next(&mut self) -> TimerToken {
        self.next += 1;
        TimerToken(self.next)
    }
}
