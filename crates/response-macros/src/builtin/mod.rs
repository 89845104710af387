//! Built-in macros.

mod choice;
mod input;
mod roll;
mod sender;
mod wiki;
mod xkcd;

pub use choice::ChoiceMacro;
pub use input::InputMacro;
pub use roll::RollMacro;
pub use sender::SenderMacro;
pub use wiki::WikiMacro;
pub use xkcd::{XkcdMacro, XkcdMode};

use crate::types::Macro;
use std::sync::Arc;

/// Macros that run without touching the network.
pub fn local_macros() -> Vec<Arc<dyn Macro>> {
    vec![
        Arc::new(SenderMacro),
        Arc::new(InputMacro),
        Arc::new(ChoiceMacro),
        Arc::new(RollMacro),
    ]
}
