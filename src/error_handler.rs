//! Command error hook: classify a failed command and answer the user.

mod framework;
mod handler;
mod kind;

pub use framework::on_error;
pub use handler::{Disposition, Responder, handle_command_error};
pub use kind::{CommandError, HelpTarget, Invocation, ResolvedCommand, UserInputError};
