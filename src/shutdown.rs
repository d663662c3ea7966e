use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// Process-wide running flag. Transitions running -> stopped at most
/// once; nothing sets it back.
#[derive(Clone)]
pub struct Shutdown {
    inner: Arc<Inner>,
}

struct Inner {
    running: Mutex<bool>,
    changed: Condvar,
}

impl Shutdown {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                running: Mutex::new(true),
                changed: Condvar::new(),
            }),
        }
    }

    /// Idempotent; safe from the signal handler and both threads.
    pub fn request(&self) {
        let mut running = self.inner.running.lock().unwrap_or_else(|e| e.into_inner());
        *running = false;
        self.inner.changed.notify_all();
    }

    pub fn is_running(&self) -> bool {
        *self.inner.running.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Sleeps up to `duration`, waking early on a shutdown request.
    /// Returns whether the process is still running.
    pub fn sleep(&self, duration: Duration) -> bool {
        let running = self.inner.running.lock().unwrap_or_else(|e| e.into_inner());
        let (running, _) = self
            .inner
            .changed
            .wait_timeout_while(running, duration, |running| *running)
            .unwrap_or_else(|e| e.into_inner());
        *running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn starts_running() {
        let shutdown = Shutdown::new();
        assert!(shutdown.is_running());
    }

    #[test]
    fn request_is_idempotent() {
        let shutdown = Shutdown::new();

        shutdown.request();
        assert!(!shutdown.is_running());

        shutdown.request();
        shutdown.request();
        assert!(!shutdown.is_running());
    }

    #[test]
    fn clones_share_the_flag() {
        let shutdown = Shutdown::new();
        let other = shutdown.clone();

        other.request();

        assert!(!shutdown.is_running());
    }

    #[test]
    fn sleep_wakes_early_on_request() {
        let shutdown = Shutdown::new();

        let requester = shutdown.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            requester.request();
        });

        let start = Instant::now();
        let still_running = shutdown.sleep(Duration::from_secs(10));
        handle.join().unwrap();

        assert!(!still_running);
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn sleep_runs_out_while_running() {
        let shutdown = Shutdown::new();

        let still_running = shutdown.sleep(Duration::from_millis(10));

        assert!(still_running);
    }
}
