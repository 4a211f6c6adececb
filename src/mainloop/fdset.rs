use std::mem::MaybeUninit;
use std::os::unix::io::RawFd;
use std::ptr;
use std::time::Duration;

/// Descriptor set passed to and returned from `select`.
pub struct FdSet(libc::fd_set);

impl FdSet {
    pub fn new() -> Self {
        let mut raw = MaybeUninit::<libc::fd_set>::uninit();

        unsafe {
            libc::FD_ZERO(raw.as_mut_ptr());
            Self(raw.assume_init())
        }
    }

    pub fn insert(&mut self, fd: RawFd) {
        debug_assert!(fd >= 0 && fd < libc::FD_SETSIZE as RawFd);

        unsafe { libc::FD_SET(fd, &mut self.0) }
    }

    pub fn contains(&self, fd: RawFd) -> bool {
        unsafe { libc::FD_ISSET(fd, &self.0) }
    }
}

impl Default for FdSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Blocks on the three sets, bounded by `timeout` when one is given.
///
/// On return the sets hold only the descriptors that are ready. A negative
/// return (EINTR included) leaves the sets in an unspecified state and the
/// caller dispatches nothing.
pub(crate) fn select(
    nfds: i32,
    read: &mut FdSet,
    write: &mut FdSet,
    except: &mut FdSet,
    timeout: Option<Duration>,
) -> i32 {
    let mut tv = timeout.map(|timeout| libc::timeval {
        tv_sec: timeout.as_secs() as libc::time_t,
        tv_usec: timeout.subsec_micros() as libc::suseconds_t,
    });
    let tv_ptr = tv
        .as_mut()
        .map_or(ptr::null_mut(), |tv| tv as *mut libc::timeval);

    unsafe { libc::select(nfds, &mut read.0, &mut write.0, &mut except.0, tv_ptr) }
}
