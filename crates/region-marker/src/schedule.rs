//! Rescan scheduling.
//!
//! Hosts drive these schedulers from their own event loop by passing the current [`Instant`];
//! nothing here spawns threads or timers. Both schedulers hold at most one pending scan.

use std::time::{Duration, Instant};

/// Quiet period used by the marker engines.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(100);

/// Longest an idle-scheduled scan waits for the host to become idle.
pub const DEFAULT_IDLE_MAX_WAIT: Duration = Duration::from_secs(1);

/// Collapses bursts of notifications into one scan after a quiet period.
///
/// Every [`notify`](Debouncer::notify) moves the deadline to `now + quiet`; the scan fires once
/// the deadline has passed without further notifications.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    /// Create a debouncer with the given quiet period.
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    /// The quiet period.
    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Record a notification, (re)arming the single pending slot.
    pub fn notify(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    /// Whether a scan is pending.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// When the pending scan is due.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Drop the pending scan.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Returns `true` exactly once when the pending scan is due.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}

/// Schedules a scan for the next idle moment, bounded by a maximum wait.
///
/// Unlike [`Debouncer`], notifications arriving while a scan is pending do not postpone it.
#[derive(Debug, Clone)]
pub struct IdleScheduler {
    max_wait: Duration,
    scheduled_at: Option<Instant>,
}

impl IdleScheduler {
    /// Create a scheduler that waits at most `max_wait` for an idle moment.
    pub fn new(max_wait: Duration) -> Self {
        Self {
            max_wait,
            scheduled_at: None,
        }
    }

    /// Schedule a scan unless one is already pending. Returns whether a new one was scheduled.
    pub fn notify(&mut self, now: Instant) -> bool {
        if self.scheduled_at.is_some() {
            return false;
        }
        self.scheduled_at = Some(now);
        true
    }

    /// Whether a scan is pending.
    pub fn is_pending(&self) -> bool {
        self.scheduled_at.is_some()
    }

    /// Latest moment the pending scan runs, idle or not.
    pub fn deadline(&self) -> Option<Instant> {
        self.scheduled_at.map(|at| at + self.max_wait)
    }

    /// Drop the pending scan.
    pub fn cancel(&mut self) {
        self.scheduled_at = None;
    }

    /// Returns `true` once when a pending scan should run now.
    pub fn poll(&mut self, now: Instant, idle: bool) -> bool {
        match self.deadline() {
            Some(deadline) if idle || now >= deadline => {
                self.scheduled_at = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for IdleScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_MAX_WAIT)
    }
}

/// How a session schedules rescans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulePolicy {
    /// Rescan after a quiet period since the last notification.
    Debounce(Duration),
    /// Rescan at the next idle moment, waiting at most `max_wait`.
    Idle {
        /// Upper bound on the wait.
        max_wait: Duration,
    },
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        Self::Debounce(DEFAULT_QUIET_PERIOD)
    }
}

/// A scheduler built from a [`SchedulePolicy`].
#[derive(Debug, Clone)]
pub enum ScanScheduler {
    /// See [`Debouncer`].
    Debounce(Debouncer),
    /// See [`IdleScheduler`].
    Idle(IdleScheduler),
}

impl ScanScheduler {
    /// Build the scheduler for `policy`.
    pub fn new(policy: SchedulePolicy) -> Self {
        match policy {
            SchedulePolicy::Debounce(quiet) => Self::Debounce(Debouncer::new(quiet)),
            SchedulePolicy::Idle { max_wait } => Self::Idle(IdleScheduler::new(max_wait)),
        }
    }

    /// Record a notification.
    pub fn notify(&mut self, now: Instant) {
        match self {
            Self::Debounce(d) => d.notify(now),
            Self::Idle(i) => {
                i.notify(now);
            }
        }
    }

    /// Whether a scan is pending.
    pub fn is_pending(&self) -> bool {
        match self {
            Self::Debounce(d) => d.is_pending(),
            Self::Idle(i) => i.is_pending(),
        }
    }

    /// Latest moment the pending scan is due.
    pub fn deadline(&self) -> Option<Instant> {
        match self {
            Self::Debounce(d) => d.deadline(),
            Self::Idle(i) => i.deadline(),
        }
    }

    /// Drop the pending scan.
    pub fn cancel(&mut self) {
        match self {
            Self::Debounce(d) => d.cancel(),
            Self::Idle(i) => i.cancel(),
        }
    }

    /// Returns `true` once when the pending scan should run. `idle` is ignored when debouncing.
    pub fn poll(&mut self, now: Instant, idle: bool) -> bool {
        match self {
            Self::Debounce(d) => d.poll(now),
            Self::Idle(i) => i.poll(now, idle),
        }
    }
}

impl Default for ScanScheduler {
    fn default() -> Self {
        Self::new(SchedulePolicy::default())
    }
}
