//! Rule-driven chat responder for Signal.
//!
//! Messages starting with the command prefix are matched against the rules
//! file and answered with an expanded response template. Double-prefixed
//! direct messages reach the system commands.

pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod gateway;
pub mod inbox;
pub mod lanes;
pub mod macros;
pub mod outbox;

pub use dispatcher::{Dispatch, Dispatcher, Flow};
pub use gateway::{ChannelInfo, ChatGateway};
pub use inbox::Inbox;
pub use outbox::Outbox;
