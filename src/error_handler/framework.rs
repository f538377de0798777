//! Glue between poise's `on_error` hook and the command error handler.

use std::error::Error as StdError;

use log::{debug, error};
use poise::{
    FrameworkError,
    serenity_prelude::{self as serenity, CreateMessage, Permissions},
};
use reqwest::StatusCode;

use crate::{
    bot::Data,
    error::{BotError, Result},
    help::{help_configuration, help_entries, render_help},
    tags::send_tag,
};

use super::{
    handler::{Disposition, Responder, handle_command_error},
    kind::{CommandError, HelpTarget, Invocation, ResolvedCommand, UserInputError},
};

/// Context type for command-scoped responses.
type Context<'a> = poise::Context<'a, Data, BotError>;

/// Framework-wide error hook, registered as `FrameworkOptions::on_error`.
pub async fn on_error(error: FrameworkError<'_, Data, BotError>) {
    match error {
        FrameworkError::UnknownCommand {
            ctx,
            msg,
            prefix,
            msg_content,
            framework,
            ..
        } => {
            let mut invocation = Invocation::unresolved(invoked_name(msg_content));
            let mut responder = MessageResponder {
                ctx,
                msg,
                data: framework.user_data,
                commands: &framework.options.commands,
                prefix,
            };
            respond(&mut invocation, CommandError::CommandNotFound, &mut responder).await;
        }
        FrameworkError::ArgumentParse {
            error, input, ctx, ..
        } => {
            let kind = argument_parse_kind(error.as_ref(), input.as_deref());
            respond_in_command(ctx, kind).await;
        }
        FrameworkError::SubcommandRequired { ctx, .. } => {
            respond_in_command(
                ctx,
                CommandError::UserInput(UserInputError::SubcommandRequired),
            )
            .await;
        }
        FrameworkError::CommandStructureMismatch {
            description, ctx, ..
        } => {
            respond_in_command(
                poise::Context::Application(ctx),
                CommandError::UserInput(UserInputError::StructureMismatch(
                    description.to_string(),
                )),
            )
            .await;
        }
        FrameworkError::GuildOnly { ctx, .. } => {
            respond_in_command(ctx, CommandError::NoPrivateMessage).await;
        }
        FrameworkError::MissingBotPermissions {
            missing_permissions,
            ctx,
            ..
        } => {
            let missing = missing_permission_names(missing_permissions);
            respond_in_command(ctx, CommandError::BotMissingPermissions { missing }).await;
        }
        FrameworkError::Command { error, ctx, .. } => {
            respond_in_command(ctx, CommandError::CommandInvoke(error)).await;
        }
        other => {
            debug!("Delegating unclassified framework error to poise");
            if let Err(e) = poise::builtins::on_error(other).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

async fn respond_in_command(ctx: Context<'_>, kind: CommandError) {
    let command = ctx.command();
    let resolved =
        ResolvedCommand::from_qualified_name(&command.qualified_name, command.on_error.is_some());
    let mut invocation = Invocation::resolved(resolved, ctx.invoked_command_name());
    let mut responder = CommandResponder { ctx };
    respond(&mut invocation, kind, &mut responder).await;
}

/// Run the handler and report whatever it propagates.
async fn respond<R: Responder>(invocation: &mut Invocation, kind: CommandError, responder: &mut R) {
    match handle_command_error(invocation, kind, responder).await {
        Ok(Disposition::Handled) => {}
        Ok(Disposition::Reraise(error)) => {
            error!(
                "Ignoring error in command '{}': {error}",
                invocation.invoked_with
            );
        }
        Ok(Disposition::ReraiseOriginal(original)) => {
            error!(
                "Command '{}' raised an exception: {original:?}",
                invocation.invoked_with
            );
        }
        Err(e) => {
            error!(
                "Error while responding to failed command '{}': {e}",
                invocation.invoked_with
            );
        }
    }
}

/// Classify a failed argument parse by whether the offending input is known.
fn argument_parse_kind(error: &(dyn StdError + Send + Sync), input: Option<&str>) -> CommandError {
    match input {
        Some(_) => CommandError::BadArgument(error.to_string()),
        None => CommandError::UserInput(UserInputError::ArgumentMismatch(error.to_string())),
    }
}

fn missing_permission_names(missing: Permissions) -> Vec<String> {
    missing
        .get_permission_names()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Fallback lookups that found no tag, which the raw-message path ignores.
fn is_silent_fallback_miss(error: &BotError) -> bool {
    matches!(error, BotError::TagNameEmpty) || error.http_status() == Some(StatusCode::NOT_FOUND)
}

/// First word of the message after the prefix.
fn invoked_name(msg_content: &str) -> &str {
    msg_content.split_whitespace().next().unwrap_or_default()
}

/// Responds through a poise command context.
struct CommandResponder<'a> {
    ctx: Context<'a>,
}

impl Responder for CommandResponder<'_> {
    async fn send(&mut self, text: &str) -> Result<()> {
        self.ctx.say(text).await?;
        Ok(())
    }

    async fn invoke_help(&mut self, target: HelpTarget) -> Result<()> {
        let query = target.query();
        poise::builtins::help(self.ctx, query.as_deref(), help_configuration()).await?;
        Ok(())
    }

    async fn invoke_tag_get(&mut self, tag_name: &str) -> Result<()> {
        send_tag(self.ctx, tag_name).await
    }
}

/// Responds to a raw message that never resolved to a command.
struct MessageResponder<'a> {
    ctx: &'a serenity::Context,
    msg: &'a serenity::Message,
    data: &'a Data,
    commands: &'a [poise::Command<Data, BotError>],
    prefix: &'a str,
}

impl Responder for MessageResponder<'_> {
    async fn send(&mut self, text: &str) -> Result<()> {
        self.msg.channel_id.say(&self.ctx.http, text).await?;
        Ok(())
    }

    async fn invoke_help(&mut self, target: HelpTarget) -> Result<()> {
        let text = render_help(&help_entries(self.commands), self.prefix, &target);
        self.msg.channel_id.say(&self.ctx.http, text).await?;
        Ok(())
    }

    async fn invoke_tag_get(&mut self, tag_name: &str) -> Result<()> {
        // Stray prefixed messages that name neither a command nor a tag stay quiet.
        let tag = match self.data.tags.get(tag_name).await {
            Ok(tag) => tag,
            Err(e) if is_silent_fallback_miss(&e) => {
                debug!("No tag named '{tag_name}' either: {e}");
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        let message = CreateMessage::new()
            .embed(tag.to_embed())
            .reference_message(self.msg);
        self.msg
            .channel_id
            .send_message(&self.ctx.http, message)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoked_name_takes_first_word() {
        assert_eq!(invoked_name("python is neat"), "python");
        assert_eq!(invoked_name("  pep8"), "pep8");
    }

    #[test]
    fn argument_parse_with_input_is_bad_argument() {
        let error = BotError::Config("invalid digit found in string".to_string());
        let kind = argument_parse_kind(&error, Some("abc"));
        assert!(matches!(
            kind,
            CommandError::BadArgument(ref message) if message == &error.to_string()
        ));
    }

    #[test]
    fn argument_parse_without_input_keeps_error_text() {
        let error = BotError::Config("Too many arguments were supplied".to_string());
        let kind = argument_parse_kind(&error, None);
        assert!(matches!(
            kind,
            CommandError::UserInput(UserInputError::ArgumentMismatch(ref message))
                if message == &error.to_string()
        ));
        assert_eq!(kind.to_string(), error.to_string());
    }

    #[test]
    fn missing_permissions_are_named() {
        let names =
            missing_permission_names(Permissions::SEND_MESSAGES | Permissions::EMBED_LINKS);
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"Send Messages".to_string()));
        assert!(names.contains(&"Embed Links".to_string()));
    }

    #[test]
    fn no_missing_permissions_yield_no_names() {
        assert!(missing_permission_names(Permissions::empty()).is_empty());
    }

    #[test]
    fn empty_tag_name_and_not_found_are_silent_misses() {
        assert!(is_silent_fallback_miss(&BotError::TagNameEmpty));
        assert!(is_silent_fallback_miss(&BotError::SiteApi {
            status: StatusCode::NOT_FOUND,
            message: String::new(),
        }));
    }

    #[test]
    fn other_fallback_failures_are_reported() {
        assert!(!is_silent_fallback_miss(&BotError::SiteApi {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: String::new(),
        }));
        assert!(!is_silent_fallback_miss(&BotError::Config(
            "missing".to_string()
        )));
    }

    #[test]
    fn invoked_name_of_empty_content_is_empty() {
        assert_eq!(invoked_name(""), "");
        assert_eq!(invoked_name("   "), "");
    }
}
