use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use vigil::{MainLoop, TimerSource};

struct FixedTimers {
    due: Vec<(usize, Instant)>,
    fired: Rc<RefCell<Vec<usize>>>,
}

impl TimerSource for FixedTimers {
    fn next_due(&mut self) -> Option<Instant> {
        self.due.iter().map(|&(_, due)| due).min()
    }

    fn dispatch_due(&mut self, _main_loop: &mut MainLoop) {
        let now = Instant::now();
        let fired = &self.fired;

        self.due.retain(|&(id, due)| {
            if due <= now {
                fired.borrow_mut().push(id);
                false
            } else {
                true
            }
        });
    }
}

#[test]
fn wait_is_bounded_by_the_nearest_timer() {
    let start = Instant::now();
    let fired = Rc::new(RefCell::new(Vec::new()));

    let timers = FixedTimers {
        due: vec![
            (1, start + Duration::from_millis(150)),
            (2, start + Duration::from_secs(10)),
        ],
        fired: fired.clone(),
    };

    let mut main_loop = MainLoop::builder().timers(timers).build();

    let fired_watch = fired.clone();
    main_loop.register_func(move |main_loop, _| {
        if fired_watch.borrow().contains(&1) {
            main_loop.request_exit(0);
        }
    });

    assert_eq!(main_loop.run(), 0);

    // The wait must track the 150ms timer, not the 10s one and not forever.
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(150), "woke early: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(5), "overslept: {elapsed:?}");
    assert_eq!(*fired.borrow(), [1]);
}

#[test]
fn an_already_due_timer_fires_without_waiting() {
    let start = Instant::now();
    let fired = Rc::new(RefCell::new(Vec::new()));

    let timers = FixedTimers {
        due: vec![(1, start)],
        fired: fired.clone(),
    };

    let mut main_loop = MainLoop::builder().timers(timers).build();
    main_loop.register_func(|main_loop, _| main_loop.request_exit(0));

    assert_eq!(main_loop.run(), 0);

    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(*fired.borrow(), [1]);
}
