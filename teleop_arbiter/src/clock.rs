//! Time source for refractory checks and settle delays.
//!
//! The arbiter never calls `Instant::now()` or `thread::sleep` directly;
//! everything goes through a [`Clock`] so replays and tests can run on
//! virtual time.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic time plus a blocking wait.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    /// Block the calling thread for `duration` of this clock's time.
    fn sleep(&self, duration: Duration);
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    #[inline]
    fn now(&self) -> Instant {
        (**self).now()
    }

    #[inline]
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

#[derive(Debug, Default)]
struct VirtualTime {
    elapsed: Duration,
    sleepers: usize,
}

/// Virtual clock driven by [`ManualClock::advance`].
///
/// In the default mode `sleep` parks the caller until another thread has
/// advanced time past the wake-up point. In auto-advancing mode `sleep`
/// moves time forward itself and returns at once, which suits single
/// threaded replays.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    auto_advance: bool,
    time: Mutex<VirtualTime>,
    changed: Condvar,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    /// Sleepers block until time is advanced externally.
    pub fn new() -> Self {
        Self::with_mode(false)
    }

    /// Sleepers advance time themselves.
    pub fn auto_advancing() -> Self {
        Self::with_mode(true)
    }

    fn with_mode(auto_advance: bool) -> Self {
        Self {
            origin: Instant::now(),
            auto_advance,
            time: Mutex::new(VirtualTime::default()),
            changed: Condvar::new(),
        }
    }

    /// Move virtual time forward and wake any sleeper whose deadline passed.
    pub fn advance(&self, by: Duration) {
        let mut time = self.time.lock();
        time.elapsed += by;
        self.changed.notify_all();
    }

    /// Virtual time since construction.
    pub fn elapsed(&self) -> Duration {
        self.time.lock().elapsed
    }

    /// Number of threads currently parked in `sleep`.
    pub fn sleepers(&self) -> usize {
        self.time.lock().sleepers
    }

    /// Block until at least `count` threads are parked in `sleep`.
    pub fn wait_for_sleepers(&self, count: usize) {
        let mut time = self.time.lock();
        while time.sleepers < count {
            self.changed.wait(&mut time);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.time.lock().elapsed
    }

    fn sleep(&self, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        let mut time = self.time.lock();
        if self.auto_advance {
            time.elapsed += duration;
            self.changed.notify_all();
            return;
        }

        let deadline = time.elapsed + duration;
        time.sleepers += 1;
        self.changed.notify_all();
        while time.elapsed < deadline {
            self.changed.wait(&mut time);
        }
        time.sleepers -= 1;
        self.changed.notify_all();
    }
}
