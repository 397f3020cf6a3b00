use std::time::{Duration, Instant};

use crate::domain::value_objects::ConnectionState;

/// State transition record
#[derive(Debug, Clone)]
pub struct StateTransition {
    pub from: ConnectionState,
    pub to: ConnectionState,
    pub timestamp: Instant,
    pub reason: Option<String>,
}

/// Connection state machine of one receive loop.
///
/// Rejects transitions outside the allowed table and keeps a bounded history.
#[derive(Debug)]
pub struct ConnectionLifecycle {
    current_state: ConnectionState,
    state_history: Vec<StateTransition>,
    streaming_since: Option<Instant>,
    consecutive_failures: u32,
    total_reconnects: u64,
}

const HISTORY_LIMIT: usize = 64;

impl ConnectionLifecycle {
    pub fn new() -> Self {
        Self {
            current_state: ConnectionState::Idle,
            state_history: Vec::new(),
            streaming_since: None,
            consecutive_failures: 0,
            total_reconnects: 0,
        }
    }

    pub fn current_state(&self) -> ConnectionState {
        self.current_state
    }

    /// Time spent in the current streaming session
    pub fn uptime(&self) -> Option<Duration> {
        self.streaming_since.map(|start| start.elapsed())
    }

    pub fn history(&self) -> &[StateTransition] {
        &self.state_history
    }

    pub fn last_transition(&self) -> Option<&StateTransition> {
        self.state_history.last()
    }

    /// Poll failures since the last successful allocation
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn total_reconnects(&self) -> u64 {
        self.total_reconnects
    }

    /// Pure business rule: the allowed edges of the state machine
    pub fn is_allowed(from: ConnectionState, to: ConnectionState) -> bool {
        use ConnectionState::*;

        match (from, to) {
            (Stopped, _) => false,
            (_, Stopped) => true,
            // a reconnect request may replace the current stream from any live state
            (Idle | Streaming | Reconnecting | Connecting, Connecting) => true,
            (Connecting, Streaming | Idle | Reconnecting) => true,
            (Streaming, Reconnecting) => true,
            (Reconnecting, Idle) => true,
            _ => false,
        }
    }

    pub fn transition_to_connecting(&mut self, reason: Option<String>) -> bool {
        self.record_transition(ConnectionState::Connecting, reason)
    }

    pub fn transition_to_streaming(&mut self) -> bool {
        let moved = self.record_transition(ConnectionState::Streaming, None);
        if moved {
            self.streaming_since = Some(Instant::now());
            self.consecutive_failures = 0;
        }
        moved
    }

    pub fn transition_to_reconnecting(&mut self, reason: Option<String>) -> bool {
        let moved = self.record_transition(ConnectionState::Reconnecting, reason);
        if moved {
            self.consecutive_failures += 1;
            self.total_reconnects += 1;
        }
        moved
    }

    pub fn transition_to_idle(&mut self, reason: Option<String>) -> bool {
        self.record_transition(ConnectionState::Idle, reason)
    }

    pub fn transition_to_stopped(&mut self, reason: Option<String>) -> bool {
        self.record_transition(ConnectionState::Stopped, reason)
    }

    fn record_transition(&mut self, new_state: ConnectionState, reason: Option<String>) -> bool {
        if !Self::is_allowed(self.current_state, new_state) {
            tracing::warn!(
                from = %self.current_state,
                to = %new_state,
                "Rejected connection state transition"
            );
            return false;
        }

        if !new_state.is_streaming() {
            self.streaming_since = None;
        }

        if self.state_history.len() == HISTORY_LIMIT {
            self.state_history.remove(0);
        }
        self.state_history.push(StateTransition {
            from: self.current_state,
            to: new_state,
            timestamp: Instant::now(),
            reason,
        });
        self.current_state = new_state;
        true
    }
}

impl Default for ConnectionLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
