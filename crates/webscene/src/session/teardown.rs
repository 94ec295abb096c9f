//! Teardown join
//!
//! Two independent teardown sources (the display surface and the content
//! session) each report completion once. [`TeardownJoin`] records them as two
//! monotonic bits and hands out the owner notification exactly once, after
//! both bits are set, whichever order they arrive in.

use bitflags::bitflags;

bitflags! {
    /// Teardown sources that have completed
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TeardownFlags: u8 {
        /// The native display surface is destroyed
        const SURFACE = 1 << 0;
        /// The content session is destroyed
        const CONTENT = 1 << 1;
    }
}

/// Joint lifecycle of the display surface and the content session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Constructed, not yet initialized
    Created,
    /// Initialized, display surface not yet realized
    Initializing,
    /// Display surface realized, nothing torn down
    Live,
    /// Display surface destroyed, content still alive
    SurfaceDown,
    /// Content destroyed, display surface still alive
    SessionDown,
    /// Both destroyed; the owner has been notified
    BothDown,
}

/// Two-bit join with an exactly-once notification guard
#[derive(Debug, Clone, Copy)]
pub struct TeardownJoin {
    flags: TeardownFlags,
    notified: bool,
}

impl TeardownJoin {
    /// Create an empty join
    pub const fn new() -> Self {
        Self {
            flags: TeardownFlags::empty(),
            notified: false,
        }
    }

    /// Record that `source` finished tearing down
    ///
    /// # Panics
    /// Each source may report once; a second report is a contract violation.
    pub fn mark(&mut self, source: TeardownFlags) {
        assert!(
            !self.flags.intersects(source),
            "teardown of {source:?} reported twice"
        );
        self.flags.insert(source);
    }

    /// Whether `source` has finished tearing down
    pub fn is_set(&self, source: TeardownFlags) -> bool {
        self.flags.contains(source)
    }

    /// Completed sources
    pub fn flags(&self) -> TeardownFlags {
        self.flags
    }

    /// Whether both sources are down
    pub fn is_complete(&self) -> bool {
        self.flags.is_all()
    }

    /// Whether the owner notification has been handed out
    pub fn is_notified(&self) -> bool {
        self.notified
    }

    /// Returns `true` exactly once: the first call after both sources are down
    pub fn take_notification(&mut self) -> bool {
        if self.is_complete() && !self.notified {
            self.notified = true;
            true
        } else {
            false
        }
    }
}

impl Default for TeardownJoin {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_then_content() {
        let mut join = TeardownJoin::new();

        join.mark(TeardownFlags::SURFACE);
        assert!(!join.take_notification());

        join.mark(TeardownFlags::CONTENT);
        assert!(join.take_notification());
        assert!(!join.take_notification());
    }

    #[test]
    fn test_content_then_surface() {
        let mut join = TeardownJoin::new();

        join.mark(TeardownFlags::CONTENT);
        assert!(!join.take_notification());
        assert!(join.is_set(TeardownFlags::CONTENT));
        assert!(!join.is_set(TeardownFlags::SURFACE));

        join.mark(TeardownFlags::SURFACE);
        assert!(join.is_complete());
        assert!(join.take_notification());
        assert!(join.is_notified());
    }

    #[test]
    fn test_notification_requires_both() {
        let mut join = TeardownJoin::new();
        assert!(!join.take_notification());
        assert_eq!(join.flags(), TeardownFlags::empty());
    }

    #[test]
    #[should_panic(expected = "reported twice")]
    fn test_double_mark_panics() {
        let mut join = TeardownJoin::new();
        join.mark(TeardownFlags::SURFACE);
        join.mark(TeardownFlags::SURFACE);
    }
}
