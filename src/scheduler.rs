//! Single-flight render scheduling.
//!
//! A render request raises the pending flag and asks the host for a frame
//! callback. Further requests while the flag is up are coalesced. The frame
//! callback takes the flag down and draws once, so any number of pointer moves
//! between two frame ticks cost one draw.

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod scheduler_test;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderScheduler {
    pending: bool,
}

impl RenderScheduler {
    /// Ask for a render.
    ///
    /// Returns `true` when this request raised the flag and the caller must
    /// ask the host for a frame callback; `false` when it was coalesced.
    pub fn request(&mut self) -> bool {
        if self.pending {
            return false;
        }
        self.pending = true;
        true
    }

    /// Take the pending flag at the start of a frame callback.
    ///
    /// Returns `true` if a render was requested since the last frame.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    /// Drop any pending request (used when deactivating).
    pub fn cancel(&mut self) {
        self.pending = false;
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }
}
