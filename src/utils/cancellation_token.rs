use std::{
    sync::{Condvar, Mutex},
    time::Duration,
};

/// A cancellation token shared between the sampler thread and whoever owns it.
#[derive(Debug)]
pub struct CancellationToken {
    // Setting this to true marks the token as cancelled.
    mutex: Mutex<bool>,
    cvar: Condvar,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self {
            mutex: Mutex::new(false),
            cvar: Condvar::new(),
        }
    }
}

impl CancellationToken {
    /// Mark the [`CancellationToken`] as cancelled and wake any sleeper.
    ///
    /// This is idempotent, and once cancelled, will stay cancelled.
    pub fn cancel(&self) {
        let mut guard = self
            .mutex
            .lock()
            .expect("cancellation token lock should not be poisoned");

        if !*guard {
            *guard = true;
            self.cvar.notify_all();
        }
    }

    /// Returns whether the token was cancelled. Blocks only for as long as another
    /// thread holds the lock, which is never long.
    pub fn is_cancelled(&self) -> bool {
        *self
            .mutex
            .lock()
            .expect("cancellation token lock should not be poisoned")
    }

    /// Sleeps for `duration` unless cancelled first.
    ///
    /// Returns the cancellation state after either sleeping or being woken up.
    pub fn sleep_with_cancellation(&self, duration: Duration) -> bool {
        let guard = self
            .mutex
            .lock()
            .expect("cancellation token lock should not be poisoned");

        if *guard {
            return true;
        }

        let (result, _) = self
            .cvar
            .wait_timeout_while(guard, duration, |cancelled| !*cancelled)
            .expect("cancellation token lock should not be poisoned");

        *result
    }
}

#[cfg(test)]
mod test {
    use std::{
        sync::Arc,
        thread,
        time::{Duration, Instant},
    };

    use super::*;

    #[test]
    fn sleep_runs_to_completion() {
        let token = CancellationToken::default();
        assert!(!token.sleep_with_cancellation(Duration::from_millis(10)));
        assert!(!token.is_cancelled());
    }

    #[test]
    fn cancel_wakes_sleeper() {
        let token = Arc::new(CancellationToken::default());
        let sleeper = {
            let token = token.clone();
            thread::spawn(move || {
                let start = Instant::now();
                let cancelled = token.sleep_with_cancellation(Duration::from_secs(30));
                (cancelled, start.elapsed())
            })
        };

        thread::sleep(Duration::from_millis(20));
        token.cancel();

        let (cancelled, elapsed) = sleeper.join().unwrap();
        assert!(cancelled);
        assert!(elapsed < Duration::from_secs(30));
    }

    #[test]
    fn cancelled_token_does_not_sleep() {
        let token = CancellationToken::default();
        token.cancel();
        token.cancel();

        let start = Instant::now();
        assert!(token.sleep_with_cancellation(Duration::from_secs(30)));
        assert!(start.elapsed() < Duration::from_secs(30));
    }
}
