//! Pointer suppression while scrolling
//!
//! Scrolling disables pointer interaction on the rendered rows; it comes
//! back once no scroll has arrived for the quiet period. Time is an explicit
//! input (`now`), so the state machine does not depend on any runtime timer.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerMode {
    #[default]
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SuppressorState {
    Idle,
    Suppressed { deadline: Instant },
}

#[derive(Debug, Clone)]
pub struct PointerSuppressor {
    quiet: Duration,
    state: SuppressorState,
}

impl PointerSuppressor {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            state: SuppressorState::Idle,
        }
    }

    pub fn mode(&self) -> PointerMode {
        match self.state {
            SuppressorState::Idle => PointerMode::Enabled,
            SuppressorState::Suppressed { .. } => PointerMode::Disabled,
        }
    }

    /// A scroll event arrived. Returns `Disabled` on the transition only;
    /// later scrolls just push the deadline out.
    pub fn on_scroll(&mut self, now: Instant) -> Option<PointerMode> {
        let deadline = now + self.quiet;
        match self.state {
            SuppressorState::Idle => {
                self.state = SuppressorState::Suppressed { deadline };
                Some(PointerMode::Disabled)
            }
            SuppressorState::Suppressed { .. } => {
                self.state = SuppressorState::Suppressed { deadline };
                None
            }
        }
    }

    /// Advance time. Returns `Enabled` once the quiet period has elapsed.
    pub fn tick(&mut self, now: Instant) -> Option<PointerMode> {
        match self.state {
            SuppressorState::Suppressed { deadline } if now >= deadline => {
                self.state = SuppressorState::Idle;
                Some(PointerMode::Enabled)
            }
            _ => None,
        }
    }

    /// Time left until the pending re-enable, if any.
    pub fn pending(&self, now: Instant) -> Option<Duration> {
        match self.state {
            SuppressorState::Idle => None,
            SuppressorState::Suppressed { deadline } => {
                Some(deadline.saturating_duration_since(now))
            }
        }
    }

    /// The rendered region went away: drop the pending re-enable silently.
    pub fn unmount(&mut self) {
        self.state = SuppressorState::Idle;
    }
}
