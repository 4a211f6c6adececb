//! The reactor loop.
//!
//! Each iteration blocks once on `select`, bounded by the nearest pending
//! timer, then drains and dispatches every event class in a fixed order:
//! ready I/O, the interrupt channel, signals, terminated children, due
//! timers, and finally the registered loop functions. See
//! [`MainLoop::run`] for the ordering rationale.

use std::time::Instant;

use crate::builder::MainLoopBuilder;
use crate::interrupt::{Interrupt, InterruptHandle};
use crate::sources::{ChildSource, IoSource, SignalSource, TimerSource};

use super::fdset::{self, FdSet};
use super::funcs::{FuncId, FuncRegistry};

/// A single-threaded event loop for a typical daemon process.
///
/// One instance owns one interrupt channel, one exit flag/status pair and
/// one loop-function registry, so independent instances (one per thread,
/// or several in tests) never interfere.
///
/// # Example
/// ```ignore
/// let mut main_loop = MainLoop::builder().timers(timers).build();
/// main_loop.register_func(|main_loop, _| {
///     // runs once per iteration, after all event dispatch
/// });
/// let status = main_loop.run();
/// ```
pub struct MainLoop {
    interrupt: Interrupt,
    funcs: FuncRegistry,
    exit: Option<i32>,
    io: Option<Box<dyn IoSource>>,
    timers: Option<Box<dyn TimerSource>>,
    signals: Option<Box<dyn SignalSource>>,
    children: Option<Box<dyn ChildSource>>,
}

impl MainLoop {
    /// Creates a loop with no event sources attached.
    ///
    /// Only the interrupt channel and loop functions will drive it; use
    /// [`builder`](Self::builder) to attach I/O, timer, signal and child
    /// sources.
    pub fn new() -> Self {
        Self::with_sources(None, None, None, None)
    }

    pub fn builder() -> MainLoopBuilder {
        MainLoopBuilder::new()
    }

    pub(crate) fn with_sources(
        io: Option<Box<dyn IoSource>>,
        timers: Option<Box<dyn TimerSource>>,
        signals: Option<Box<dyn SignalSource>>,
        children: Option<Box<dyn ChildSource>>,
    ) -> Self {
        Self {
            interrupt: Interrupt::new(),
            funcs: FuncRegistry::new(),
            exit: None,
            io,
            timers,
            signals,
            children,
        }
    }

    /// Adds a callback invoked once per loop iteration, after all event
    /// dispatch for that iteration.
    ///
    /// Callbacks run in registration order and receive the loop plus their
    /// own handle, so one can remove itself (or any other entry) from
    /// within its invocation.
    pub fn register_func<F>(&mut self, callback: F) -> FuncId
    where
        F: FnMut(&mut MainLoop, FuncId) + 'static,
    {
        self.funcs.insert(Box::new(callback))
    }

    /// Releases a registered loop function.
    ///
    /// Safe to call from within any callback, including the one being
    /// removed; an entry removed mid-pass is skipped cleanly. Returns
    /// whether the handle named a live entry.
    pub fn remove_func(&mut self, id: FuncId) -> bool {
        self.funcs.remove(id)
    }

    /// Runs the loop until an exit is requested, returning the status.
    ///
    /// Re-entrant in sequence: once it returns, the exit state is back to
    /// defaults and calling it again starts a fresh run. An exit requested
    /// while no loop was running is honored before the first iteration.
    pub fn run(&mut self) -> i32 {
        self.interrupt.ensure_init();

        // A child exiting must reliably interrupt a blocked select(), so
        // the SIGCHLD handler is (re)installed on every run.
        if let Some(mut signals) = self.signals.take() {
            signals.install_handler(libc::SIGCHLD, self.interrupt.handle());
            self.signals = Some(signals);
        }

        loop {
            if let Some(status) = self.exit.take() {
                return status;
            }

            self.iterate();
        }
    }

    /// Requests that the running (or next) loop exit with `status`.
    ///
    /// Callable from any dispatched callback; the current iteration still
    /// completes, and the loop exits once it re-checks the flag at the
    /// iteration boundary.
    pub fn request_exit(&mut self, status: i32) {
        self.exit = Some(status);
        self.interrupt_now();
    }

    /// Forces the current (or next) wait to return promptly, without any
    /// event being pending.
    pub fn interrupt_now(&mut self) {
        self.interrupt.ensure_init();
        self.interrupt.interrupt();
    }

    /// Returns a wakeup endpoint for signal handlers and other threads.
    ///
    /// The handle stays valid for the rest of the process.
    pub fn interrupt_handle(&mut self) -> InterruptHandle {
        self.interrupt.ensure_init();
        self.interrupt.handle()
    }

    /// One full pass: wait, then dispatch every event class in order.
    ///
    /// I/O and the interrupt channel come first because they are the
    /// direct result of the wait that just returned. Signals precede
    /// children and timers because a termination request takes conceptual
    /// priority over routine bookkeeping. Loop functions run last so they
    /// observe the fully updated state of the iteration.
    fn iterate(&mut self) {
        // Bound the wait by the nearest timer so we sleep no less and no
        // more than needed; with no timer pending the wait is unbounded.
        let timeout = self
            .timers
            .as_mut()
            .and_then(|timers| timers.next_due())
            .map(|due| due.saturating_duration_since(Instant::now()));

        let mut read = FdSet::new();
        let mut write = FdSet::new();
        let mut except = FdSet::new();

        // Always watch the interrupt channel.
        let wake_fd = self.interrupt.read_fd();
        read.insert(wake_fd);
        let mut max_fd = wake_fd;

        if let Some(io) = self.io.as_mut() {
            io.merge_fds(&mut max_fd, &mut read, &mut write, &mut except);
        }

        let ready = fdset::select(max_fd + 1, &mut read, &mut write, &mut except, timeout);

        // A timeout dispatches nothing extra here; timers are handled
        // below regardless of what woke us. EINTR lands in the negative
        // branch and equally dispatches nothing.
        if ready > 0
            && let Some(mut io) = self.io.take()
        {
            io.dispatch_ready(self, &read, &write, &except);
            self.io = Some(io);
        }

        self.interrupt.drain();

        if let Some(mut signals) = self.signals.take() {
            signals.dispatch_pending(self);
            self.signals = Some(signals);
        }

        if let Some(mut children) = self.children.take() {
            children.dispatch_terminated(self);
            self.children = Some(children);
        }

        if let Some(mut timers) = self.timers.take() {
            timers.dispatch_due(self);
            self.timers = Some(timers);
        }

        self.run_functions();
    }

    /// Invokes every entry present at the start of the pass, in
    /// registration order. Entries added during the pass run next pass.
    fn run_functions(&mut self) {
        let count = self.funcs.len();

        for index in 0..count {
            let Some((id, mut callback)) = self.funcs.begin_call(index) else {
                continue;
            };

            callback(self, id);

            self.funcs.end_call(index, callback);
        }

        self.funcs.sweep();
    }
}

impl Default for MainLoop {
    fn default() -> Self {
        Self::new()
    }
}
