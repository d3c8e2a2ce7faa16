use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use lane_shooter::logging::install_panic_hook;

// Panic hooks are process-global, so this file holds a single test.
#[test]
fn panic_hook_hands_off_to_previous_hook() {
    let reached = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&reached);
    panic::set_hook(Box::new(move |_| flag.store(true, Ordering::SeqCst)));

    install_panic_hook();
    let result = panic::catch_unwind(|| panic!("boom"));

    let _ = panic::take_hook();
    assert!(result.is_err());
    assert!(reached.load(Ordering::SeqCst));
}
