//! Help command and a plain-text fallback renderer.

use poise::builtins::{self, HelpConfiguration};

use crate::bot::Data;
use crate::error::{BotError, Result};
use crate::error_handler::HelpTarget;

/// Context type for the help command.
type Context<'a> = poise::Context<'a, Data, BotError>;

const NO_DESCRIPTION: &str = "No description available.";

/// Help settings shared by the command and the error hook.
#[must_use]
pub fn help_configuration() -> HelpConfiguration<'static> {
    HelpConfiguration {
        extra_text_at_bottom: "Use `help <command>` for more info on a command.",
        ..Default::default()
    }
}

/// Show help for all commands or a specific one.
#[poise::command(prefix_command, slash_command, track_edits)]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Command to show help about"]
    #[autocomplete = "poise::builtins::autocomplete_command"]
    #[rest]
    command: Option<String>,
) -> Result<()> {
    builtins::help(ctx, command.as_deref(), help_configuration()).await?;
    Ok(())
}

/// A command's name and description, flattened out of the command tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpEntry {
    pub qualified_name: String,
    pub description: Option<String>,
}

/// Flatten registered commands, subcommands included.
#[must_use]
pub fn help_entries(commands: &[poise::Command<Data, BotError>]) -> Vec<HelpEntry> {
    let mut entries = Vec::new();
    for command in commands {
        if command.hide_in_help {
            continue;
        }
        entries.push(HelpEntry {
            qualified_name: command.qualified_name.clone(),
            description: command.description.clone(),
        });
        entries.extend(help_entries(&command.subcommands));
    }
    entries
}

/// Render help as plain text, for replies outside a command context.
///
/// A target that names no known command falls back to the full listing.
#[must_use]
pub fn render_help(entries: &[HelpEntry], prefix: &str, target: &HelpTarget) -> String {
    if let Some(query) = target.query()
        && let Some(entry) = entries.iter().find(|entry| entry.qualified_name == query)
    {
        let mut text = format!(
            "`{prefix}{}`\n{}",
            entry.qualified_name,
            entry.description.as_deref().unwrap_or(NO_DESCRIPTION)
        );

        let children = format!("{query} ");
        let subcommands: Vec<&HelpEntry> = entries
            .iter()
            .filter(|entry| entry.qualified_name.starts_with(&children))
            .collect();
        if !subcommands.is_empty() {
            text.push_str("\n\nSubcommands:");
            for sub in subcommands {
                text.push_str(&format!(
                    "\n  `{prefix}{}` {}",
                    sub.qualified_name,
                    sub.description.as_deref().unwrap_or(NO_DESCRIPTION)
                ));
            }
        }
        return text;
    }

    let mut text = String::from("Commands:");
    for entry in entries
        .iter()
        .filter(|entry| !entry.qualified_name.contains(' '))
    {
        text.push_str(&format!(
            "\n  `{prefix}{}` {}",
            entry.qualified_name,
            entry.description.as_deref().unwrap_or(NO_DESCRIPTION)
        ));
    }
    text.push_str(&format!(
        "\n\nUse `{prefix}help <command>` for more info on a command."
    ));
    text
}
