use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconError {
    /// Malformed fare edge, unknown stop, undefined stop pair, or a stop
    /// without a computed fallback fare.
    InvalidRoute(String),
    /// A tap-off timestamp precedes its paired tap-on (reject policy only).
    OutOfOrderTaps { start_id: i64, end_id: i64, pan: String },
}

impl ReconError {
    pub(crate) fn route(msg: impl Into<String>) -> Self {
        Self::InvalidRoute(msg.into())
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRoute(msg) => write!(f, "invalid route: {msg}"),
            Self::OutOfOrderTaps { start_id, end_id, pan } => write!(
                f,
                "card '{pan}': tap-off {end_id} is earlier than tap-on {start_id}"
            ),
        }
    }
}

impl std::error::Error for ReconError {}
