use crate::actor::ActorId;
use crate::item::ItemId;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when looking up or mutating roster state.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The requested actor ID does not exist in the roster.
    #[error("actor not found: {0}")]
    ActorNotFound(ActorId),

    /// No actor with the given name exists in the roster.
    #[error("no actor named \"{0}\"")]
    ActorNameNotFound(String),

    /// An actor with the same name already exists.
    #[error("actor already exists: \"{0}\"")]
    DuplicateName(String),

    /// The item is not owned by the actor (nor by the actor's pilot).
    #[error("item {item} is not owned by actor \"{actor}\"")]
    ItemNotFound {
        /// Name of the actor that was searched.
        actor: String,
        /// The item that could not be found.
        item: ItemId,
    },

    /// A named item could not be found on the actor.
    #[error("actor \"{actor}\" has no item named \"{name}\"")]
    ItemNameNotFound {
        /// Name of the actor that was searched.
        actor: String,
        /// The unresolved item name.
        name: String,
    },

    /// A generic validation error with a descriptive message.
    #[error("validation error: {0}")]
    Validation(String),
}
