//! Call-state interruptions.
//!
//! Playback pauses when a call starts ringing or becomes active. It does not
//! resume when the call ends; that is left to the user.

use std::sync::mpsc::Receiver;
use std::thread::{self, JoinHandle};

use log::debug;
use serde::{Deserialize, Serialize};

/// Telephony call state as reported by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallState {
    #[default]
    Idle,
    Ringing,
    Active,
    Ended,
}

impl CallState {
    fn interrupts(self) -> bool {
        matches!(self, CallState::Ringing | CallState::Active)
    }
}

/// Something that pauses when an interruption starts.
pub trait InterruptionTarget: Send + Sync {
    fn on_interruption_start(&self);
}

/// Turns a stream of call states into interruption events.
pub struct InterruptionMonitor<T> {
    target: T,
    last: CallState,
}

impl<T: InterruptionTarget> InterruptionMonitor<T> {
    pub fn new(target: T) -> Self {
        Self {
            target,
            last: CallState::Idle,
        }
    }

    /// Feed one call-state signal. Returns whether an interruption was raised.
    ///
    /// Only a change into `Ringing` or `Active` raises one; the same state
    /// delivered again does not.
    pub fn on_call_state_changed(&mut self, state: CallState) -> bool {
        let previous = std::mem::replace(&mut self.last, state);
        if state == previous || !state.interrupts() {
            return false;
        }
        debug!("call state {:?} -> {:?}", previous, state);
        self.target.on_interruption_start();
        true
    }

    pub fn last_state(&self) -> CallState {
        self.last
    }
}

impl<T: InterruptionTarget + 'static> InterruptionMonitor<T> {
    /// Drain `signals` on a background thread until every sender is gone.
    pub fn spawn(signals: Receiver<CallState>, target: T) -> JoinHandle<()> {
        let mut monitor = Self::new(target);
        thread::spawn(move || {
            for state in signals {
                monitor.on_call_state_changed(state);
            }
            debug!("interruption monitor stopped");
        })
    }
}
