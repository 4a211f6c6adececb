//! Process detachment.

use std::process;

use log::warn;

use crate::error::{Error, Result};
use crate::pidfile::PidFile;

/// Detaches the calling process from its terminal and session, leaving a
/// grandchild running with the standard streams bound to `/dev/null`. The
/// grandchild's pid is persisted through `pidfile` on the way.
///
/// Two sequential forks (rather than one) guarantee the surviving process
/// is not a session leader, so a later `open` of a tty can never make that
/// tty its controlling terminal.
///
/// Only the surviving grandchild ever sees `Ok(())`; the parent and the
/// intermediate process exit directly with status 0 and do not return. A
/// fork failure at either point returns [`Error::System`] and the process
/// does not daemonize.
pub fn daemonize(pidfile: &mut PidFile) -> Result<()> {
    // First fork: the parent terminates, detaching us from the caller.
    match unsafe { libc::fork() } {
        -1 => return Err(Error::system("fork")),
        0 => {}
        _ => process::exit(0),
    }

    unsafe {
        // Become leader of a new session with no controlling terminal.
        libc::setsid();

        // When the session leader exits below, SIGHUP goes to every process
        // in its group, including the child we are about to spawn.
        libc::signal(libc::SIGHUP, libc::SIG_IGN);
    }

    // Second fork: the grandchild is guaranteed not to be a session leader,
    // even by accident. The intermediate process records the grandchild's
    // pid before exiting.
    match unsafe { libc::fork() } {
        -1 => return Err(Error::system("fork")),
        0 => {}
        child => {
            if let Err(err) = pidfile.write(child) {
                warn!("unable to write pid file: {err}");
            }

            process::exit(0);
        }
    }

    unsafe {
        // A failed chdir is ignored; there is nothing useful to do about it.
        let _ = libc::chdir(c"/".as_ptr());
        libc::umask(0);

        // Drop the inherited standard streams and bind /dev/null to all
        // three instead; open() hands back fd 0, the dups fill 1 and 2.
        for fd in 0..3 {
            libc::close(fd);
        }
        let null = libc::open(c"/dev/null".as_ptr(), libc::O_RDWR);
        if null >= 0 {
            let _ = libc::dup(null);
            let _ = libc::dup(null);
        }
    }

    Ok(())
}
