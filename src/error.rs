use std::fmt;

/// Result type for learner operations
pub type Result<T> = std::result::Result<T, LearnerError>;

/// Main error type for the learning engine
#[derive(Debug, Clone, PartialEq)]
pub enum LearnerError {
    /// An action outside the legal-move set was applied to a state
    InvalidMove(String),

    /// `get_action` was called with no legal actions outside the terminal protocol
    EmptyActionSet,

    /// `child_states` is not index-aligned with `legal_actions`
    MisalignedChildStates {
        actions: usize,
        child_states: usize,
    },

    /// `get_action` was called after a terminal transition without `end_of_episode`
    EpisodeTerminated,

    /// `begin_episode` was called while an episode is still open
    EpisodeInProgress,

    /// `end_of_episode` was called with no episode open
    NoEpisodeInProgress,

    /// The environment does not provide a numeric state encoding
    EncodingUnavailable,

    /// The network critic was used before its parameters were established
    EstimatorUninitialized,

    /// Invalid dimensions for operations
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Invalid parameter value
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// IO errors (file operations)
    IoError(String),

    /// Serialization/deserialization errors
    SerializationError(String),
}

impl fmt::Display for LearnerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LearnerError::InvalidMove(msg) => write!(f, "Invalid move: {}", msg),
            LearnerError::EmptyActionSet => {
                write!(f, "Empty action set: get_action requires at least one legal action")
            }
            LearnerError::MisalignedChildStates { actions, child_states } => write!(
                f,
                "Misaligned child states: {} legal actions but {} child states",
                actions, child_states
            ),
            LearnerError::EpisodeTerminated => {
                write!(f, "Episode already terminated: call end_of_episode before acting again")
            }
            LearnerError::EpisodeInProgress => {
                write!(f, "Episode in progress: call end_of_episode before beginning another")
            }
            LearnerError::NoEpisodeInProgress => {
                write!(f, "No episode in progress: nothing to end")
            }
            LearnerError::EncodingUnavailable => {
                write!(f, "Environment provides no state encoding for the network critic")
            }
            LearnerError::EstimatorUninitialized => {
                write!(f, "Network critic used before begin_episode established its parameters")
            }
            LearnerError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {}, got {}", expected, actual)
            }
            LearnerError::InvalidParameter { name, reason } => {
                write!(f, "Invalid parameter '{}': {}", name, reason)
            }
            LearnerError::IoError(msg) => write!(f, "IO error: {}", msg),
            LearnerError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for LearnerError {}

impl From<std::io::Error> for LearnerError {
    fn from(err: std::io::Error) -> Self {
        LearnerError::IoError(err.to_string())
    }
}

impl From<bincode::Error> for LearnerError {
    fn from(err: bincode::Error) -> Self {
        LearnerError::SerializationError(err.to_string())
    }
}

impl From<serde_json::Error> for LearnerError {
    fn from(err: serde_json::Error) -> Self {
        LearnerError::SerializationError(err.to_string())
    }
}

// Helper functions for common error patterns
impl LearnerError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        LearnerError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        LearnerError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_move<S: Into<String>>(msg: S) -> Self {
        LearnerError::InvalidMove(msg.into())
    }

    /// Contract violations abort the current episode; none of them are retried.
    pub fn aborts_episode(&self) -> bool {
        matches!(
            self,
            LearnerError::InvalidMove(_)
                | LearnerError::EmptyActionSet
                | LearnerError::MisalignedChildStates { .. }
                | LearnerError::EpisodeTerminated
        )
    }
}
