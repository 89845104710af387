//! Command table and channel authorization for the responder.
//!
//! A [`RulesSnapshot`] holds everything loaded from the rules file: the
//! command prefix, every command group, which channels may use which groups,
//! and the admin and ignore lists. Snapshots are immutable; [`RulesStore`]
//! swaps in a new one on reload.

mod error;
mod matcher;
mod rules;
mod store;
mod types;

pub use error::RulesError;
pub use matcher::{tokenize, CommandMatch, PendingMatch};
pub use rules::{Permissions, RulesFile, Settings, DEFAULT_COMMAND_PREFIX};
pub use store::RulesStore;
pub use types::*;
