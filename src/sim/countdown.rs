//! Countdown timers
//!
//! One-shot callbacks tied to a participant, measured in frames. A timer is
//! `Armed` until its count reaches zero (`Fired`) or its target expires
//! first (`Cancelled`). The scheduler checks the target itself every tick,
//! so callers never have to remember to cancel.

use super::participant::ParticipantId;

/// Lifecycle of a countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownState {
    Armed,
    Fired,
    Cancelled,
}

/// A single countdown timer
#[derive(Debug, Clone)]
pub struct Countdown {
    pub target: ParticipantId,
    pub remaining: u32,
    pub payload: u32,
    pub state: CountdownState,
}

/// A countdown that reached zero this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub target: ParticipantId,
    pub payload: u32,
}

/// Owns every armed countdown for one registry
#[derive(Debug, Default)]
pub struct CountdownScheduler {
    armed: Vec<Countdown>,
}

impl CountdownScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a countdown; zero ticks fires on the next tick
    pub fn arm(&mut self, target: ParticipantId, ticks: u32, payload: u32) {
        self.armed.push(Countdown {
            target,
            remaining: ticks.max(1),
            payload,
            state: CountdownState::Armed,
        });
    }

    /// Cancel every countdown targeting `target`
    pub fn cancel_target(&mut self, target: ParticipantId) -> usize {
        let before = self.armed.len();
        self.armed.retain(|c| c.target != target);
        before - self.armed.len()
    }

    /// Drop every countdown
    pub fn clear(&mut self) {
        self.armed.clear();
    }

    pub fn armed_count(&self) -> usize {
        self.armed.len()
    }

    /// Remaining ticks of the countdowns targeting `target`, in arming order
    pub fn remaining_for(&self, target: ParticipantId) -> Vec<u32> {
        self.armed
            .iter()
            .filter(|c| c.target == target)
            .map(|c| c.remaining)
            .collect()
    }

    /// Advance every armed countdown by one tick
    ///
    /// `is_live` reports whether a target still exists and is not expired.
    /// Countdowns on dead targets are cancelled before they are decremented.
    /// Returns the countdowns that fired, in arming order.
    pub fn tick(&mut self, is_live: impl Fn(ParticipantId) -> bool) -> Vec<Fired> {
        let mut fired = Vec::new();

        for countdown in &mut self.armed {
            if !is_live(countdown.target) {
                countdown.state = CountdownState::Cancelled;
                continue;
            }
            countdown.remaining -= 1;
            if countdown.remaining == 0 {
                countdown.state = CountdownState::Fired;
                fired.push(Fired {
                    target: countdown.target,
                    payload: countdown.payload,
                });
            }
        }

        let cancelled = self
            .armed
            .iter()
            .filter(|c| c.state == CountdownState::Cancelled)
            .count();
        if cancelled > 0 {
            log::trace!("{} countdown(s) cancelled by target expiry", cancelled);
        }

        self.armed.retain(|c| c.state == CountdownState::Armed);
        fired
    }
}
