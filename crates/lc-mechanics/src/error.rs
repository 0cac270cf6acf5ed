//! Error types for the combat engine.

use lc_core::{ActorId, CoreError, ItemId};

/// How an error is surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Not surfaced at all (the user cancelled).
    Silent,
    /// A visible warning; nothing was changed.
    Warning,
    /// A visible error.
    Error,
}

/// Errors that can occur while resolving an attack, roll, or macro.
#[derive(Debug, thiserror::Error)]
pub enum MechError {
    /// The user dismissed a prompt.
    #[error("cancelled")]
    Cancelled,

    /// The action is not allowed in the current state (unloaded weapon,
    /// no core power, wrong actor kind).
    #[error("{0}")]
    Validation(String),

    /// The speaker could not be resolved.
    #[error("failed to find actor {0} for macro")]
    ActorNotFound(ActorId),

    /// The item could not be resolved on the speaker.
    #[error("could not find item {item} owned by actor {actor}")]
    ItemNotFound {
        /// The actor that was searched.
        actor: ActorId,
        /// The missing item.
        item: ItemId,
    },

    /// Any other failed lookup (stat key, action index, target).
    #[error("lookup failed: {0}")]
    Lookup(String),

    /// A macro function name outside the allow-list.
    #[error("refusing to call non-allow-listed macro function \"{0}\"")]
    Rejected(String),

    /// A dice formula could not be parsed.
    #[error("invalid dice formula \"{formula}\": {message}")]
    Formula {
        /// The offending formula.
        formula: String,
        /// What went wrong.
        message: String,
    },

    /// A macro token or reroll payload could not be decoded.
    #[error("invalid macro data: {0}")]
    Codec(String),

    /// Macro arguments of the wrong shape.
    #[error("invalid arguments for {function}: {message}")]
    Arguments {
        /// The macro function being invoked.
        function: String,
        /// What went wrong.
        message: String,
    },

    /// The unit store refused a writeback.
    #[error("failed to persist changes: {0}")]
    Persist(#[from] CoreError),
}

impl MechError {
    /// Shorthand for a [`MechError::Formula`].
    pub fn formula(formula: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Formula {
            formula: formula.into(),
            message: message.into(),
        }
    }

    /// How this error should be surfaced.
    pub fn severity(&self) -> Severity {
        match self {
            Self::Cancelled => Severity::Silent,
            Self::Validation(_) | Self::ActorNotFound(_) => Severity::Warning,
            Self::ItemNotFound { .. }
            | Self::Lookup(_)
            | Self::Rejected(_)
            | Self::Formula { .. }
            | Self::Codec(_)
            | Self::Arguments { .. }
            | Self::Persist(_) => Severity::Error,
        }
    }
}

/// Convenience result type for engine operations.
pub type MechResult<T> = Result<T, MechError>;
