//! Fluent builder for main loop construction.

use crate::mainloop::MainLoop;
use crate::sources::{ChildSource, IoSource, SignalSource, TimerSource};

/// Builder attaching event sources to a [`MainLoop`].
///
/// Every source is optional; the loop simply skips the iteration step of a
/// source that is absent.
///
/// # Example
/// ```ignore
/// let main_loop = MainLoop::builder()
///     .io(watches)
///     .timers(timers)
///     .signals(signals)
///     .children(children)
///     .build();
/// ```
pub struct MainLoopBuilder {
    io: Option<Box<dyn IoSource>>,
    timers: Option<Box<dyn TimerSource>>,
    signals: Option<Box<dyn SignalSource>>,
    children: Option<Box<dyn ChildSource>>,
}

impl MainLoopBuilder {
    pub fn new() -> Self {
        Self {
            io: None,
            timers: None,
            signals: None,
            children: None,
        }
    }

    /// Attaches the I/O readiness source.
    pub fn io(mut self, source: impl IoSource + 'static) -> Self {
        self.io = Some(Box::new(source));
        self
    }

    /// Attaches the timer source.
    pub fn timers(mut self, source: impl TimerSource + 'static) -> Self {
        self.timers = Some(Box::new(source));
        self
    }

    /// Attaches the signal source.
    pub fn signals(mut self, source: impl SignalSource + 'static) -> Self {
        self.signals = Some(Box::new(source));
        self
    }

    /// Attaches the child-process source.
    pub fn children(mut self, source: impl ChildSource + 'static) -> Self {
        self.children = Some(Box::new(source));
        self
    }

    /// Builds the loop with the attached sources.
    pub fn build(self) -> MainLoop {
        MainLoop::with_sources(self.io, self.timers, self.signals, self.children)
    }
}

impl Default for MainLoopBuilder {
    fn default() -> Self {
        Self::new()
    }
}
