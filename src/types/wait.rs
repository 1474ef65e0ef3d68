//! Knobs for waiting on a build to finish.

use std::{
    sync::{Arc, Condvar, Mutex, PoisonError},
    time::{Duration, Instant},
};

/// Timing of the build-completion poll loop.
///
/// Without a `timeout` or a `cancel` token the loop polls until the build
/// reports it is no longer building.
#[derive(Clone, Debug)]
pub struct WaitOptions {
    /// Delay before the first poll, so the server can start the build.
    pub grace: Duration,
    pub poll_interval: Duration,
    pub timeout: Option<Duration>,
    pub cancel: Option<CancellationToken>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(10),
            poll_interval: Duration::from_secs(3),
            timeout: None,
            cancel: None,
        }
    }
}

impl WaitOptions {
    #[must_use]
    pub fn grace(mut self, value: Duration) -> Self {
        self.grace = value;
        self
    }

    #[must_use]
    pub fn poll_interval(mut self, value: Duration) -> Self {
        self.poll_interval = value;
        self
    }

    #[must_use]
    pub fn timeout(mut self, value: Duration) -> Self {
        self.timeout = Some(value);
        self
    }

    #[must_use]
    pub fn cancel_with(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    /// Sleep for `duration`, cut short by cancellation or by `deadline`.
    pub(crate) fn pause(&self, duration: Duration, deadline: Option<Instant>) {
        let duration = match deadline {
            Some(deadline) => duration.min(deadline.saturating_duration_since(Instant::now())),
            None => duration,
        };
        if duration.is_zero() {
            return;
        }
        match &self.cancel {
            Some(token) => token.sleep(duration),
            None => std::thread::sleep(duration),
        }
    }
}

/// Shared flag that stops a build wait from another thread.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (flag, wakeup) = &*self.inner;
        *flag.lock().unwrap_or_else(PoisonError::into_inner) = true;
        wakeup.notify_all();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block for `duration` or until cancelled, whichever comes first.
    fn sleep(&self, duration: Duration) {
        let (flag, wakeup) = &*self.inner;
        let guard = flag.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = wakeup
            .wait_timeout_while(guard, duration, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);
    }
}
