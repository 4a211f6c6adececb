use std::cell::RefCell;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use vigil::MainLoop;

#[test]
fn exit_status_is_returned_and_reset_between_runs() {
    let mut main_loop = MainLoop::new();

    main_loop.register_func(|main_loop, id| {
        main_loop.request_exit(42);
        main_loop.remove_func(id);
    });
    main_loop.interrupt_now();
    assert_eq!(main_loop.run(), 42);

    // The first run consumed its exit state; this one starts fresh.
    main_loop.register_func(|main_loop, id| {
        main_loop.request_exit(7);
        main_loop.remove_func(id);
    });
    main_loop.interrupt_now();
    assert_eq!(main_loop.run(), 7);
}

#[test]
fn exit_request_finishes_the_current_pass_first() {
    let mut main_loop = MainLoop::new();
    let later_ran = Rc::new(RefCell::new(false));

    main_loop.register_func(|main_loop, _| main_loop.request_exit(3));

    let later = later_ran.clone();
    main_loop.register_func(move |_, _| *later.borrow_mut() = true);

    main_loop.interrupt_now();
    assert_eq!(main_loop.run(), 3);

    assert!(
        *later_ran.borrow(),
        "the pass should complete before the loop exits"
    );
}

#[test]
fn exit_requested_before_run_is_honored_immediately() {
    let mut main_loop = MainLoop::new();

    // Must return before any iteration; a pass would block on select().
    main_loop.register_func(|_, _| panic!("no iteration should run"));

    main_loop.request_exit(9);
    assert_eq!(main_loop.run(), 9);
}

#[test]
fn interrupt_handle_wakes_a_blocked_run() {
    let mut main_loop = MainLoop::new();
    let handle = main_loop.interrupt_handle();

    main_loop.register_func(|main_loop, _| main_loop.request_exit(0));

    let waker = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        handle.interrupt();
    });

    // No timer and no watched descriptor: only the interrupt can wake us.
    let start = Instant::now();
    assert_eq!(main_loop.run(), 0);
    assert!(
        start.elapsed() < Duration::from_secs(5),
        "blocked run was not woken promptly"
    );

    waker.join().unwrap();
}
