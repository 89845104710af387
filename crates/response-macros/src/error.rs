//! Macro errors.

use crate::dice::InvalidDie;
use thiserror::Error;

/// A user-facing failure raised while expanding a macro.
///
/// The `Display` output is sent verbatim as the bot's reply in place of the
/// response template.
#[derive(Error, Debug)]
pub enum MacroError {
    /// A die description could not be rolled.
    #[error(transparent)]
    InvalidDie(#[from] InvalidDie),

    /// `%ROLL%` was used without any dice.
    #[error("You need to tell me what dice to roll")]
    NoDice,

    /// `%CHOICE%` was used without anything to choose from.
    #[error("You didn't give me any choices")]
    NoChoices,

    /// The parameters don't make sense for this macro.
    #[error("{0}")]
    BadInput(String),

    /// The external service has nothing for the request.
    #[error("{0}")]
    NotFound(String),

    /// The external service could not be reached.
    #[error("Sorry, I couldn't reach {0}")]
    Unreachable(String),

    /// Expansion ran past the configured timeout.
    #[error("Sorry, that took too long")]
    Timeout,
}

/// Errors raised while building a [`crate::MacroRegistry`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Macro token {0} is already registered")]
    DuplicateToken(String),

    #[error("Macro token {0:?} must look like %NAME%")]
    InvalidToken(String),
}
