//! Agent error and outcome types.

use thiserror::Error;

use crate::domain::foundation::ValidationError;
use crate::ports::AIError;

/// Failures an agent can hit while talking to the model.
///
/// Agents convert these into [`AgentOutcome::Fallback`] before returning;
/// they only surface from `BaseAgent` helpers.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("{agent}: no API key configured for provider '{provider}'")]
    Configuration { agent: String, provider: String },

    #[error("{agent} failed: {source}")]
    Execution {
        agent: String,
        #[source]
        source: AIError,
    },

    #[error("invalid response: {0}")]
    Validation(#[from] ValidationError),

    #[error("unparseable response: {0}")]
    Parse(String),
}

impl AgentError {
    /// Creates an execution error for the given agent.
    pub fn execution(agent: impl Into<String>, source: AIError) -> Self {
        Self::Execution {
            agent: agent.into(),
            source,
        }
    }

    /// Returns true for failures at the model boundary (config or transport).
    pub fn is_boundary_failure(&self) -> bool {
        matches!(self, Self::Configuration { .. } | Self::Execution { .. })
    }
}

/// Result of a fail-soft agent operation.
///
/// Either the model's answer passed validation, or a deterministic default
/// was substituted and `reason` says why.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentOutcome<T> {
    Validated(T),
    Fallback { value: T, reason: String },
}

impl<T> AgentOutcome<T> {
    pub fn fallback(value: T, reason: impl Into<String>) -> Self {
        Self::Fallback {
            value,
            reason: reason.into(),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Validated(value) | Self::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Validated(value) | Self::Fallback { value, .. } => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    pub fn fallback_reason(&self) -> Option<&str> {
        match self {
            Self::Validated(_) => None,
            Self::Fallback { reason, .. } => Some(reason),
        }
    }
}
