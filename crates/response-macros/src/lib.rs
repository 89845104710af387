//! Macro expansion for canned chat responses.
//!
//! Response templates carry `%TOKEN%` markers. A [`MacroRegistry`] maps each
//! marker to a [`Macro`], and the [`ResponseSynthesizer`] picks a template and
//! expands the markers it contains.

mod dice;
mod error;
mod registry;
mod synthesizer;
mod types;
pub mod builtin;

pub use dice::{render_rolls, roll, roll_with, DieSpec, InvalidDie};
pub use error::{MacroError, RegistryError};
pub use registry::MacroRegistry;
pub use synthesizer::ResponseSynthesizer;
pub use types::*;
