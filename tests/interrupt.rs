#![cfg(unix)]

use std::thread;
use std::time::{Duration, Instant};

use hid_logger::Interrupt;

// Runs in its own test binary: the signal handler can only be installed once per process.
#[test]
fn sigterm_raises_the_interrupt() {
    let interrupt = Interrupt::new();
    interrupt.install_handler().unwrap();

    assert!(!interrupt.is_raised());

    unsafe { libc::raise(libc::SIGTERM) };

    let deadline = Instant::now() + Duration::from_secs(5);
    while !interrupt.is_raised() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }

    assert!(interrupt.is_raised());
}
