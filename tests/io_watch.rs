use std::cell::RefCell;
use std::os::unix::io::RawFd;
use std::rc::Rc;

use vigil::{FdSet, IoSource, MainLoop};

struct PipeWatch {
    fd: RawFd,
    delivered: Rc<RefCell<Vec<u8>>>,
}

impl IoSource for PipeWatch {
    fn merge_fds(
        &mut self,
        max_fd: &mut RawFd,
        read: &mut FdSet,
        _write: &mut FdSet,
        _except: &mut FdSet,
    ) {
        read.insert(self.fd);
        if self.fd > *max_fd {
            *max_fd = self.fd;
        }
    }

    fn dispatch_ready(
        &mut self,
        main_loop: &mut MainLoop,
        read: &FdSet,
        _write: &FdSet,
        _except: &FdSet,
    ) {
        if !read.contains(self.fd) {
            return;
        }

        let mut buf = [0u8; 8];
        let n = unsafe { libc::read(self.fd, buf.as_mut_ptr() as *mut libc::c_void, buf.len()) };
        if n > 0 {
            self.delivered.borrow_mut().extend_from_slice(&buf[..n as usize]);
            main_loop.request_exit(0);
        }
    }
}

#[test]
fn ready_descriptors_are_dispatched() {
    let mut fds = [0 as RawFd; 2];
    let rc = unsafe { libc::pipe(fds.as_mut_ptr()) };
    assert_eq!(rc, 0, "pipe() failed");
    let (rfd, wfd) = (fds[0], fds[1]);

    let delivered = Rc::new(RefCell::new(Vec::new()));
    let mut main_loop = MainLoop::builder()
        .io(PipeWatch {
            fd: rfd,
            delivered: delivered.clone(),
        })
        .build();

    let wrote = unsafe { libc::write(wfd, b"!".as_ptr() as *const libc::c_void, 1) };
    assert_eq!(wrote, 1);

    assert_eq!(main_loop.run(), 0);
    assert_eq!(*delivered.borrow(), b"!");

    unsafe {
        libc::close(rfd);
        libc::close(wfd);
    }
}
