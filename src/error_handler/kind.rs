//! Error kinds and per-invocation state seen by the command error hook.

use thiserror::Error;

use crate::error::BotError;

/// A user-input error that is not a plain bad argument.
#[derive(Error, Debug)]
pub enum UserInputError {
    /// Arguments that could not be matched to parameters, such as a missing
    /// or an extra argument.
    #[error("{0}")]
    ArgumentMismatch(String),

    #[error("A subcommand is required")]
    SubcommandRequired,

    #[error("Command structure mismatch: {0}")]
    StructureMismatch(String),
}

/// The kind of error a command attempt failed with.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Command not found")]
    CommandNotFound,

    #[error("{0}")]
    BadArgument(String),

    #[error("{0}")]
    UserInput(UserInputError),

    #[error("This command cannot be used in private messages.")]
    NoPrivateMessage,

    #[error("Bot requires {missing:?} permission(s) to run this command.")]
    BotMissingPermissions { missing: Vec<String> },

    /// The command body itself returned an error.
    #[error("Command raised an exception: {0}")]
    CommandInvoke(#[source] BotError),

    #[error("{0}")]
    Other(String),
}

/// The command a message resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommand {
    pub name: String,
    /// Qualified name of the parent command, for subcommands.
    pub parent: Option<String>,
    pub has_local_error_handler: bool,
}

impl ResolvedCommand {
    /// Build from a space separated qualified name such as `tags get`.
    #[must_use]
    pub fn from_qualified_name(qualified_name: &str, has_local_error_handler: bool) -> Self {
        let (parent, name) = match qualified_name.rsplit_once(' ') {
            Some((parent, name)) => (Some(parent.to_string()), name),
            None => (None, qualified_name),
        };

        Self {
            name: name.to_string(),
            parent,
            has_local_error_handler,
        }
    }
}

/// State for one command attempt, handed to the error hook.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    pub command: Option<ResolvedCommand>,
    /// The name the user typed in place of a command.
    pub invoked_with: String,
    /// Set once the attempt has been rerouted by the error hook.
    pub invoked_from_error_handler: bool,
}

impl Invocation {
    #[must_use]
    pub fn resolved(command: ResolvedCommand, invoked_with: impl Into<String>) -> Self {
        Self {
            command: Some(command),
            invoked_with: invoked_with.into(),
            invoked_from_error_handler: false,
        }
    }

    #[must_use]
    pub fn unresolved(invoked_with: impl Into<String>) -> Self {
        Self {
            command: None,
            invoked_with: invoked_with.into(),
            invoked_from_error_handler: false,
        }
    }

    /// Help scoped to the resolved command and its parent.
    #[must_use]
    pub fn help_target(&self) -> HelpTarget {
        match &self.command {
            Some(command) => HelpTarget {
                parent: command.parent.clone(),
                command: Some(command.name.clone()),
            },
            None => HelpTarget::default(),
        }
    }
}

/// Arguments for a help invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HelpTarget {
    pub parent: Option<String>,
    pub command: Option<String>,
}

impl HelpTarget {
    /// The help query string, or `None` for the general help page.
    #[must_use]
    pub fn query(&self) -> Option<String> {
        match (&self.parent, &self.command) {
            (Some(parent), Some(command)) => Some(format!("{parent} {command}")),
            (None, Some(command)) => Some(command.clone()),
            _ => None,
        }
    }
}
