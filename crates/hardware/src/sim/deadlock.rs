//! Forward-progress watchdog.

use std::fmt;

/// Watchdog state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlockState {
    /// The last cycle made progress.
    Running,
    /// This many consecutive cycles made no progress.
    Stalling(u64),
    /// The stall reached the threshold. Absorbing.
    Aborted(u64),
}

impl fmt::Display for DeadlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Stalling(n) => write!(f, "stalling for {n} cycles"),
            Self::Aborted(n) => write!(f, "deadlocked after {n} cycles"),
        }
    }
}

/// Counts consecutive zero-progress cycles and trips at a fixed threshold.
#[derive(Debug, Clone)]
pub struct DeadlockMonitor {
    threshold: u64,
    state: DeadlockState,
}

impl DeadlockMonitor {
    /// Creates a monitor that aborts after `threshold` consecutive stalled cycles.
    pub const fn new(threshold: u64) -> Self {
        Self {
            threshold,
            state: DeadlockState::Running,
        }
    }

    /// Records the total progress of one cycle and returns the new state.
    pub const fn observe(&mut self, progress: u64) -> DeadlockState {
        self.state = match self.state {
            DeadlockState::Aborted(n) => DeadlockState::Aborted(n),
            _ if progress > 0 => DeadlockState::Running,
            DeadlockState::Running => Self::stalled(1, self.threshold),
            DeadlockState::Stalling(n) => Self::stalled(n + 1, self.threshold),
        };
        self.state
    }

    const fn stalled(n: u64, threshold: u64) -> DeadlockState {
        if n >= threshold {
            DeadlockState::Aborted(n)
        } else {
            DeadlockState::Stalling(n)
        }
    }

    /// Current state.
    pub const fn state(&self) -> DeadlockState {
        self.state
    }

    /// Consecutive zero-progress cycles observed so far.
    pub const fn stalled_cycles(&self) -> u64 {
        match self.state {
            DeadlockState::Running => 0,
            DeadlockState::Stalling(n) | DeadlockState::Aborted(n) => n,
        }
    }

    /// Whether the threshold has been reached.
    pub const fn is_aborted(&self) -> bool {
        matches!(self.state, DeadlockState::Aborted(_))
    }
}
