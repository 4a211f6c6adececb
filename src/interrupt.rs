//! Self-pipe interrupt channel.
//!
//! A signal handler cannot safely touch the loop's data structures, but it
//! can perform a single non-blocking `write`. The channel decouples "an
//! asynchronous event was recorded" from "the loop woke up and will check
//! state", closing the race where a signal arrives after state is checked
//! but before `select` blocks.

use std::io;
use std::os::unix::io::RawFd;

/// Lazily-created pipe owned by one main loop instance.
///
/// Both ends are non-blocking and close-on-exec. Once created the ends live
/// for the rest of the process; there is no teardown, so an
/// [`InterruptHandle`] stays valid even after the loop itself is dropped.
pub(crate) struct Interrupt {
    ends: Option<(RawFd, RawFd)>,
}

impl Interrupt {
    pub(crate) fn new() -> Self {
        Self { ends: None }
    }

    /// Creates the pipe on first call; no-op thereafter.
    pub(crate) fn ensure_init(&mut self) {
        if self.ends.is_some() {
            return;
        }

        let mut fds = [0 as RawFd; 2];
        let rc = unsafe { libc::pipe(fds.as_mut_ptr()) };
        assert_eq!(
            rc,
            0,
            "interrupt pipe creation failed: {}",
            io::Error::last_os_error()
        );

        for fd in fds {
            set_nonblock(fd);
            set_cloexec(fd);
        }

        self.ends = Some((fds[0], fds[1]));
    }

    pub(crate) fn read_fd(&self) -> RawFd {
        self.ends.expect("interrupt channel not initialized").0
    }

    pub(crate) fn handle(&self) -> InterruptHandle {
        InterruptHandle {
            fd: self.ends.expect("interrupt channel not initialized").1,
        }
    }

    /// Wakes the loop. Must only be called after `ensure_init`.
    pub(crate) fn interrupt(&self) {
        if let Some((_, write_fd)) = self.ends {
            wake(write_fd);
        }
    }

    /// Discards everything queued on the read end.
    ///
    /// Runs once per loop iteration before the other event classes, so that
    /// wakeups recorded during the previous iteration's processing are
    /// observed without a busy spin.
    pub(crate) fn drain(&self) {
        let Some((read_fd, _)) = self.ends else {
            return;
        };

        let mut buf = [0u8; 64];
        loop {
            let n = unsafe { libc::read(read_fd, buf.as_mut_ptr() as *mut libc::c_void, buf.len()) };
            if n <= 0 {
                break;
            }
        }
    }
}

/// Cloneable wakeup endpoint for code running outside the loop's call
/// stack, including signal handlers.
///
/// [`interrupt`](Self::interrupt) performs exactly one non-blocking `write`
/// and is async-signal-safe; it allocates nothing and takes no locks.
#[derive(Clone, Copy, Debug)]
pub struct InterruptHandle {
    fd: RawFd,
}

impl InterruptHandle {
    /// Forces the owning loop's next `select` to return promptly.
    pub fn interrupt(&self) {
        wake(self.fd);
    }
}

fn wake(fd: RawFd) {
    let byte = 0u8;
    // A failed write is fine: EAGAIN means the buffer already holds an
    // undrained wakeup, which is equivalent to success.
    let _ = unsafe { libc::write(fd, &byte as *const u8 as *const libc::c_void, 1) };
}

fn set_nonblock(fd: RawFd) {
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    unsafe {
        libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK);
    }
}

fn set_cloexec(fd: RawFd) {
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFD) };
    unsafe {
        libc::fcntl(fd, libc::F_SETFD, flags | libc::FD_CLOEXEC);
    }
}
