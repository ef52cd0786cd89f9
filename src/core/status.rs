use std::sync::atomic::{AtomicBool, Ordering};

/// Set once configuration is loaded and every function route is registered.
///
/// Read by the readiness probe on the status listener.
static FUNCTIONS_LOADED: AtomicBool = AtomicBool::new(false);

/// Mark the host as ready to accept invocations.
pub fn mark_ready(functions: usize) {
    FUNCTIONS_LOADED.store(true, Ordering::SeqCst);
    log::info!("{functions} function(s) loaded, service is ready");
}

pub fn is_ready() -> bool {
    FUNCTIONS_LOADED.load(Ordering::SeqCst)
}

#[cfg(test)]
pub(crate) fn reset() {
    FUNCTIONS_LOADED.store(false, Ordering::SeqCst);
    log::debug!("Readiness status reset");
}

// Readiness is process-wide; serialize tests that flip it.
#[cfg(test)]
pub(crate) static TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_not_ready() {
        let _guard = TEST_LOCK.lock().unwrap();
        reset();
        assert!(!is_ready());
    }

    #[test]
    fn test_mark_ready() {
        let _guard = TEST_LOCK.lock().unwrap();
        reset();
        mark_ready(3);
        assert!(is_ready());
    }

    #[test]
    fn test_multiple_marks_stay_ready() {
        let _guard = TEST_LOCK.lock().unwrap();
        reset();
        mark_ready(1);
        mark_ready(2);
        assert!(is_ready());
    }
}
