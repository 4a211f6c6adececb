//! Single-threaded main loop support for Unix daemon processes.
//!
//! This crate provides the reactor core of a daemon: one loop that
//! multiplexes I/O readiness, POSIX signal delivery, child-process
//! termination and timer expiry into an ordered sequence of callback
//! invocations, plus the process-lifecycle pieces (daemonization, pid-file
//! persistence) a daemon needs around it.
//!
//! # Architecture
//!
//! - **MainLoop**: the central driver; blocks once per iteration on
//!   `select`, bounded by the nearest timer, then dispatches every event
//!   class in a fixed order
//! - **InterruptHandle**: self-pipe wakeup endpoint, the one operation a
//!   signal handler may perform
//! - **Sources**: `IoSource`/`TimerSource`/`SignalSource`/`ChildSource`
//!   traits through which external bookkeeping modules feed the loop
//! - **PidFile**: atomic pid-file publishing, advisory reads
//! - **daemonize**: double-fork detachment from terminal and session
//! - **MainLoopBuilder**: fluent attachment of event sources

mod builder;
mod daemon;
mod error;
mod interrupt;
mod mainloop;
mod pidfile;
mod sources;

pub use builder::MainLoopBuilder;
pub use daemon::daemonize;
pub use error::{Error, Result};
pub use interrupt::InterruptHandle;
pub use mainloop::{FdSet, FuncId, MainLoop};
pub use pidfile::{PidFile, program_name};
pub use sources::{ChildSource, IoSource, SignalSource, TimerSource};
