//! Event-source seams consumed by the main loop.
//!
//! The loop owns no I/O, timer, signal or child bookkeeping of its own;
//! those live in collaborator modules attached through
//! [`MainLoopBuilder`](crate::MainLoopBuilder). Each iteration the loop
//! polls them in a fixed order. Dispatch methods receive the loop itself,
//! so a collaborator-routed callback can register loop functions or call
//! [`MainLoop::request_exit`].

use std::os::unix::io::RawFd;
use std::time::Instant;

use crate::interrupt::InterruptHandle;
use crate::mainloop::{FdSet, MainLoop};

/// Tracks watched descriptors and handles their readiness.
pub trait IoSource {
    /// Adds every descriptor currently watched to the relevant sets,
    /// raising `max_fd` to the highest descriptor added.
    fn merge_fds(
        &mut self,
        max_fd: &mut RawFd,
        read: &mut FdSet,
        write: &mut FdSet,
        except: &mut FdSet,
    );

    /// Handles the descriptors `select` reported ready.
    ///
    /// Called whenever the wait returned at least one ready descriptor;
    /// the sets may contain descriptors this source does not watch (the
    /// interrupt channel's read end in particular), so check membership.
    fn dispatch_ready(
        &mut self,
        main_loop: &mut MainLoop,
        read: &FdSet,
        write: &FdSet,
        except: &FdSet,
    );
}

/// Tracks timer due times on the monotonic clock.
pub trait TimerSource {
    /// Due time of the nearest pending timer, used to bound the wait.
    fn next_due(&mut self) -> Option<Instant>;

    /// Fires every timer whose due time has passed.
    fn dispatch_due(&mut self, main_loop: &mut MainLoop);
}

/// Installs handlers and queues delivered signals.
pub trait SignalSource {
    /// (Re)installs the handler for `signal`.
    ///
    /// The handler must confine itself to `wake.interrupt()`, the only
    /// operation here that is safe in a signal-delivery context.
    fn install_handler(&mut self, signal: i32, wake: InterruptHandle);

    /// Dispatches every signal recorded since the last poll.
    fn dispatch_pending(&mut self, main_loop: &mut MainLoop);
}

/// Watches child processes for termination.
pub trait ChildSource {
    /// Reaps and dispatches every child that has terminated.
    fn dispatch_terminated(&mut self, main_loop: &mut MainLoop);
}
