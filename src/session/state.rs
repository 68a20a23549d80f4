//! Session lifecycle state.
//!
//! The state lives in an atomic cell shared between the read loop and any
//! [`CancelHandle`](super::CancelHandle), so that a terminal transition is
//! observed by both sides and happens at most once.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle of a streaming session.
///
/// `Completed`, `Failed` and `Cancelled` are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    Idle = 0,
    Active = 1,
    Completed = 2,
    Failed = 3,
    Cancelled = 4,
}

impl SessionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => SessionState::Idle,
            1 => SessionState::Active,
            2 => SessionState::Completed,
            3 => SessionState::Failed,
            _ => SessionState::Cancelled,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Failed | SessionState::Cancelled
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Active => "active",
            SessionState::Completed => "completed",
            SessionState::Failed => "failed",
            SessionState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Atomically updated [`SessionState`].
#[derive(Debug)]
pub struct SessionStateCell(AtomicU8);

impl Default for SessionStateCell {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStateCell {
    pub fn new() -> Self {
        Self(AtomicU8::new(SessionState::Idle as u8))
    }

    pub fn load(&self) -> SessionState {
        SessionState::from_u8(self.0.load(Ordering::SeqCst))
    }

    /// `Idle -> Active`. Returns false if the session left `Idle` already.
    pub fn activate(&self) -> bool {
        self.0
            .compare_exchange(
                SessionState::Idle as u8,
                SessionState::Active as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
    }

    /// Move to a terminal state.
    ///
    /// Returns true only for the first terminal transition; every later
    /// attempt leaves the state unchanged and returns false.
    pub fn finish(&self, target: SessionState) -> bool {
        debug_assert!(target.is_terminal());
        let mut current = self.0.load(Ordering::SeqCst);
        loop {
            if SessionState::from_u8(current).is_terminal() {
                return false;
            }
            match self.0.compare_exchange(
                current,
                target as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }
}
