//! Poise commands for looking up tags.

use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use log::{info, warn};
use poise::CreateReply;

use crate::bot::Data;
use crate::error::{BotError, Result};

/// Context type for tag commands.
type Context<'a> = poise::Context<'a, Data, BotError>;

const AUTOCOMPLETE_LIMIT: usize = 25;

// Discord's message limit is 2000 characters
const MAX_LIST_LENGTH: usize = 1900;

/// Look up a tag and post its embed in the current channel.
///
/// # Errors
///
/// Returns an error if the tag cannot be fetched or the reply fails.
pub async fn send_tag(ctx: Context<'_>, tag_name: &str) -> Result<()> {
    let tag = ctx.data().tags.get(tag_name).await?;
    ctx.send(CreateReply::default().embed(tag.to_embed()))
        .await?;
    info!(
        "Sent tag '{}' to {} in channel {}",
        tag.title,
        ctx.author().tag(),
        ctx.channel_id()
    );
    Ok(())
}

async fn autocomplete_tag(ctx: Context<'_>, partial: &str) -> Vec<String> {
    match ctx.data().tags.list().await {
        Ok(tags) => {
            let titles: Vec<String> = tags.into_iter().map(|tag| tag.title).collect();
            rank_tag_names(&titles, partial, AUTOCOMPLETE_LIMIT)
        }
        Err(e) => {
            warn!("Failed to fetch tags for autocomplete: {e}");
            Vec::new()
        }
    }
}

/// Show tags stored on the site.
#[poise::command(prefix_command, slash_command, subcommands("get", "list"), subcommand_required)]
pub async fn tags(_ctx: Context<'_>) -> Result<()> {
    Ok(())
}

/// Show a tag by name.
#[poise::command(prefix_command, slash_command)]
pub async fn get(
    ctx: Context<'_>,
    #[description = "Name of the tag"]
    #[autocomplete = "autocomplete_tag"]
    #[rest]
    tag_name: String,
) -> Result<()> {
    send_tag(ctx, &tag_name).await
}

/// List all tags.
#[poise::command(prefix_command, slash_command)]
pub async fn list(ctx: Context<'_>) -> Result<()> {
    let mut titles: Vec<String> = ctx
        .data()
        .tags
        .list()
        .await?
        .into_iter()
        .map(|tag| tag.title)
        .collect();
    titles.sort();

    ctx.say(format_tag_list(&titles)).await?;
    Ok(())
}

/// Get available tag commands.
#[must_use]
pub fn tag_commands() -> Vec<poise::Command<Data, BotError>> {
    vec![tags()]
}

/// Tag names matching `partial`, best match first.
fn rank_tag_names(names: &[String], partial: &str, limit: usize) -> Vec<String> {
    let partial = partial.trim();
    if partial.is_empty() {
        let mut names = names.to_vec();
        names.sort();
        names.truncate(limit);
        return names;
    }

    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<(&String, i64)> = names
        .iter()
        .filter_map(|name| matcher.fuzzy_match(name, partial).map(|score| (name, score)))
        .collect();

    scored.sort_by(|(left_name, left_score), (right_name, right_score)| {
        right_score
            .cmp(left_score)
            .then_with(|| left_name.cmp(right_name))
    });

    scored
        .into_iter()
        .take(limit)
        .map(|(name, _)| name.clone())
        .collect()
}

fn format_tag_list(titles: &[String]) -> String {
    if titles.is_empty() {
        return "There are no tags yet.".to_string();
    }

    let mut text = String::from("**Available tags:**\n");
    for (idx, title) in titles.iter().enumerate() {
        let entry = format!("`{title}`");
        if text.len() + entry.len() + 2 > MAX_LIST_LENGTH {
            text.push_str(&format!("\n…and {} more", titles.len() - idx));
            break;
        }
        if idx > 0 {
            text.push_str(", ");
        }
        text.push_str(&entry);
    }
    text
}
