use std::fmt;

/// Receive loop connection states (pure domain)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No receiver allocated, waiting for a reconnect request
    #[default]
    Idle,
    /// Allocating a receiver for the resolved target
    Connecting,
    /// Receiver allocated, polling frames
    Streaming,
    /// Poll failed, waiting out the backoff before the next allocation
    Reconnecting,
    /// Shut down, terminal
    Stopped,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "IDLE"),
            Self::Connecting => write!(f, "CONNECTING"),
            Self::Streaming => write!(f, "STREAMING"),
            Self::Reconnecting => write!(f, "RECONNECTING"),
            Self::Stopped => write!(f, "STOPPED"),
        }
    }
}

impl ConnectionState {
    /// Convert state to numeric value for metrics
    pub fn as_metric(&self) -> f64 {
        f64::from(self.as_u8())
    }

    /// Compact encoding used to publish the state through an atomic
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Connecting => 1,
            Self::Streaming => 2,
            Self::Reconnecting => 3,
            Self::Stopped => 4,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Idle),
            1 => Some(Self::Connecting),
            2 => Some(Self::Streaming),
            3 => Some(Self::Reconnecting),
            4 => Some(Self::Stopped),
            _ => None,
        }
    }

    /// States in which the loop owns a receiver handle
    pub fn holds_receiver(&self) -> bool {
        matches!(self, Self::Connecting | Self::Streaming)
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self, Self::Streaming)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped)
    }
}
