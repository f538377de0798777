//! Classification of command errors into chat responses.

use std::future::Future;

use log::debug;
use reqwest::StatusCode;

use crate::error::{BotError, Result};

use super::kind::{CommandError, HelpTarget, Invocation};

const NO_PRIVATE_MESSAGE: &str = "Sorry, this command can't be used in a private message!";
const NOT_FOUND: &str = "There does not seem to be anything matching your query.";
const UNKNOWN_API_ERROR: &str = "BEEP BEEP UNKNOWN API ERROR!=?!??!?!?!?";

/// Side effects the error hook can perform in the originating channel.
pub trait Responder: Send {
    /// Send a chat message.
    fn send(&mut self, text: &str) -> impl Future<Output = Result<()>> + Send;

    /// Run the help command.
    fn invoke_help(&mut self, target: HelpTarget) -> impl Future<Output = Result<()>> + Send;

    /// Run `tags get` with the given tag name.
    fn invoke_tag_get(&mut self, tag_name: &str) -> impl Future<Output = Result<()>> + Send;
}

/// What the caller should do with the error once the hook is done.
#[derive(Debug)]
pub enum Disposition {
    /// Fully handled, nothing to propagate.
    Handled,
    /// Propagate the error the hook was given.
    Reraise(CommandError),
    /// Propagate the error a command body failed with.
    ReraiseOriginal(BotError),
}

/// Respond to a failed command attempt.
///
/// Cases are checked in order and the first match wins. Everything that is
/// not explicitly handled is returned as [`Disposition::Reraise`], including
/// errors that were already answered in chat.
///
/// # Errors
///
/// Returns an error if sending a message or invoking a command fails.
pub async fn handle_command_error<R: Responder>(
    invocation: &mut Invocation,
    error: CommandError,
    responder: &mut R,
) -> Result<Disposition> {
    if let Some(command) = &invocation.command
        && command.has_local_error_handler
    {
        debug!(
            "Command {} has a local error handler, ignoring.",
            command.name
        );
        return Ok(Disposition::Handled);
    }

    let help = invocation.help_target();

    match &error {
        CommandError::CommandNotFound if !invocation.invoked_from_error_handler => {
            invocation.invoked_from_error_handler = true;
            debug!(
                "No command named '{}', falling back to tag lookup",
                invocation.invoked_with
            );
            responder.invoke_tag_get(&invocation.invoked_with).await?;
            return Ok(Disposition::Handled);
        }
        CommandError::BadArgument(message) => {
            responder.send(&format!("Bad argument: {message}\n")).await?;
            responder.invoke_help(help).await?;
        }
        CommandError::UserInput(_) => {
            responder.invoke_help(help).await?;
        }
        CommandError::NoPrivateMessage => {
            responder.send(NO_PRIVATE_MESSAGE).await?;
        }
        CommandError::BotMissingPermissions { missing } => {
            responder
                .send(&format!(
                    "Sorry, it looks like I don't have the permissions I need to do that.\n\n\
                     Here's what I'm missing: **{missing:?}**"
                ))
                .await?;
        }
        CommandError::CommandInvoke(original) => match original.http_status() {
            Some(StatusCode::NOT_FOUND) => {
                responder.send(NOT_FOUND).await?;
                return Ok(Disposition::Handled);
            }
            Some(status) => {
                debug!("API request failed with status {status}");
                responder.send(UNKNOWN_API_ERROR).await?;
                return Ok(Disposition::Handled);
            }
            None => {
                responder
                    .send(&format!(
                        "Sorry, an unexpected error occurred. Please let us know!\n\n```{error}```"
                    ))
                    .await?;
            }
        },
        _ => {}
    }

    match error {
        CommandError::CommandInvoke(original) => Ok(Disposition::ReraiseOriginal(original)),
        error => Ok(Disposition::Reraise(error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handler::kind::{ResolvedCommand, UserInputError};

    #[derive(Debug, PartialEq, Eq)]
    enum Action {
        Send(String),
        Help(HelpTarget),
        TagGet(String),
    }

    #[derive(Default)]
    struct Recorder {
        actions: Vec<Action>,
        fail_sends: bool,
    }

    impl Responder for Recorder {
        async fn send(&mut self, text: &str) -> Result<()> {
            if self.fail_sends {
                return Err(BotError::Config("send failed".to_string()));
            }
            self.actions.push(Action::Send(text.to_string()));
            Ok(())
        }

        async fn invoke_help(&mut self, target: HelpTarget) -> Result<()> {
            self.actions.push(Action::Help(target));
            Ok(())
        }

        async fn invoke_tag_get(&mut self, tag_name: &str) -> Result<()> {
            self.actions.push(Action::TagGet(tag_name.to_string()));
            Ok(())
        }
    }

    fn subcommand_invocation() -> Invocation {
        Invocation::resolved(ResolvedCommand::from_qualified_name("tags get", false), "get")
    }

    fn scoped_help() -> HelpTarget {
        HelpTarget {
            parent: Some("tags".to_string()),
            command: Some("get".to_string()),
        }
    }

    fn site_api_error(status: StatusCode) -> BotError {
        BotError::SiteApi {
            status,
            message: String::new(),
        }
    }

    #[tokio::test]
    async fn unknown_command_falls_back_to_tag_lookup() -> Result<()> {
        let mut invocation = Invocation::unresolved("python");
        let mut recorder = Recorder::default();

        let disposition =
            handle_command_error(&mut invocation, CommandError::CommandNotFound, &mut recorder)
                .await?;

        assert!(matches!(disposition, Disposition::Handled));
        assert!(invocation.invoked_from_error_handler);
        assert_eq!(recorder.actions, vec![Action::TagGet("python".to_string())]);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_command_is_rerouted_only_once() -> Result<()> {
        let mut invocation = Invocation::unresolved("python");
        let mut recorder = Recorder::default();

        handle_command_error(&mut invocation, CommandError::CommandNotFound, &mut recorder)
            .await?;
        let disposition =
            handle_command_error(&mut invocation, CommandError::CommandNotFound, &mut recorder)
                .await?;

        assert!(matches!(
            disposition,
            Disposition::Reraise(CommandError::CommandNotFound)
        ));
        assert_eq!(recorder.actions.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn bad_argument_replies_shows_help_and_reraises() -> Result<()> {
        let mut invocation = subcommand_invocation();
        let mut recorder = Recorder::default();

        let disposition = handle_command_error(
            &mut invocation,
            CommandError::BadArgument("expected an integer".to_string()),
            &mut recorder,
        )
        .await?;

        assert_eq!(
            recorder.actions,
            vec![
                Action::Send("Bad argument: expected an integer\n".to_string()),
                Action::Help(scoped_help()),
            ]
        );
        assert!(matches!(
            disposition,
            Disposition::Reraise(CommandError::BadArgument(ref message)) if message == "expected an integer"
        ));
        Ok(())
    }

    #[tokio::test]
    async fn user_input_error_shows_help_only() -> Result<()> {
        let mut invocation = subcommand_invocation();
        let mut recorder = Recorder::default();

        let disposition = handle_command_error(
            &mut invocation,
            CommandError::UserInput(UserInputError::ArgumentMismatch(
                "Too few arguments were supplied".to_string(),
            )),
            &mut recorder,
        )
        .await?;

        assert_eq!(recorder.actions, vec![Action::Help(scoped_help())]);
        assert!(matches!(
            disposition,
            Disposition::Reraise(CommandError::UserInput(UserInputError::ArgumentMismatch(_)))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn user_input_error_without_command_shows_general_help() -> Result<()> {
        let mut invocation = Invocation::unresolved("");
        let mut recorder = Recorder::default();

        handle_command_error(
            &mut invocation,
            CommandError::UserInput(UserInputError::SubcommandRequired),
            &mut recorder,
        )
        .await?;

        assert_eq!(recorder.actions, vec![Action::Help(HelpTarget::default())]);
        Ok(())
    }

    #[tokio::test]
    async fn private_message_is_refused_and_reraised() -> Result<()> {
        let mut invocation = subcommand_invocation();
        let mut recorder = Recorder::default();

        let disposition =
            handle_command_error(&mut invocation, CommandError::NoPrivateMessage, &mut recorder)
                .await?;

        assert_eq!(
            recorder.actions,
            vec![Action::Send(NO_PRIVATE_MESSAGE.to_string())]
        );
        assert!(matches!(
            disposition,
            Disposition::Reraise(CommandError::NoPrivateMessage)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn missing_permissions_are_listed() -> Result<()> {
        let missing = vec!["Send Messages".to_string(), "Embed Links".to_string()];
        let mut invocation = subcommand_invocation();
        let mut recorder = Recorder::default();

        let disposition = handle_command_error(
            &mut invocation,
            CommandError::BotMissingPermissions {
                missing: missing.clone(),
            },
            &mut recorder,
        )
        .await?;

        let [Action::Send(text)] = recorder.actions.as_slice() else {
            panic!("expected a single message, got {:?}", recorder.actions);
        };
        assert!(text.contains(&format!("{missing:?}")));
        assert!(matches!(
            disposition,
            Disposition::Reraise(CommandError::BotMissingPermissions { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn not_found_api_response_is_handled() -> Result<()> {
        let mut invocation = subcommand_invocation();
        let mut recorder = Recorder::default();

        let disposition = handle_command_error(
            &mut invocation,
            CommandError::CommandInvoke(site_api_error(StatusCode::NOT_FOUND)),
            &mut recorder,
        )
        .await?;

        assert_eq!(recorder.actions, vec![Action::Send(NOT_FOUND.to_string())]);
        assert!(matches!(disposition, Disposition::Handled));
        Ok(())
    }

    #[tokio::test]
    async fn other_api_status_is_handled_generically() -> Result<()> {
        let mut invocation = subcommand_invocation();
        let mut recorder = Recorder::default();

        let disposition = handle_command_error(
            &mut invocation,
            CommandError::CommandInvoke(site_api_error(StatusCode::INTERNAL_SERVER_ERROR)),
            &mut recorder,
        )
        .await?;

        assert_eq!(
            recorder.actions,
            vec![Action::Send(UNKNOWN_API_ERROR.to_string())]
        );
        assert!(matches!(disposition, Disposition::Handled));
        Ok(())
    }

    #[tokio::test]
    async fn unexpected_error_reraises_the_original() -> Result<()> {
        let mut invocation = subcommand_invocation();
        let mut recorder = Recorder::default();

        let disposition = handle_command_error(
            &mut invocation,
            CommandError::CommandInvoke(BotError::TagNameEmpty),
            &mut recorder,
        )
        .await?;

        let [Action::Send(text)] = recorder.actions.as_slice() else {
            panic!("expected a single message, got {:?}", recorder.actions);
        };
        assert!(text.starts_with("Sorry, an unexpected error occurred."));
        assert!(text.contains(&BotError::TagNameEmpty.to_string()));
        assert!(matches!(
            disposition,
            Disposition::ReraiseOriginal(BotError::TagNameEmpty)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn unrecognized_error_is_reraised_silently() -> Result<()> {
        let mut invocation = subcommand_invocation();
        let mut recorder = Recorder::default();

        let disposition = handle_command_error(
            &mut invocation,
            CommandError::Other("cooldown".to_string()),
            &mut recorder,
        )
        .await?;

        assert!(recorder.actions.is_empty());
        assert!(matches!(disposition, Disposition::Reraise(CommandError::Other(_))));
        Ok(())
    }

    #[tokio::test]
    async fn command_with_local_handler_is_left_alone() -> Result<()> {
        let mut invocation =
            Invocation::resolved(ResolvedCommand::from_qualified_name("tags get", true), "get");
        let mut recorder = Recorder::default();

        let disposition = handle_command_error(
            &mut invocation,
            CommandError::CommandInvoke(BotError::TagNameEmpty),
            &mut recorder,
        )
        .await?;

        assert!(recorder.actions.is_empty());
        assert!(matches!(disposition, Disposition::Handled));
        Ok(())
    }

    #[tokio::test]
    async fn failing_send_is_propagated() {
        let mut invocation = subcommand_invocation();
        let mut recorder = Recorder {
            fail_sends: true,
            ..Recorder::default()
        };

        let result =
            handle_command_error(&mut invocation, CommandError::NoPrivateMessage, &mut recorder)
                .await;

        assert!(matches!(result, Err(BotError::Config(_))));
    }
}
