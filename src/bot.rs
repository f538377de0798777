//! Discord bot setup and command registration.

use log::{debug, info};
use poise::{
    Framework, FrameworkOptions, PrefixFrameworkOptions, builtins,
    serenity_prelude::{ClientBuilder, GatewayIntents},
};

use crate::config::Config;
use crate::error::{BotError, Result};
use crate::error_handler;
use crate::help;
use crate::tags::{TagClient, tag_commands};

/// Shared state available to every command.
pub struct Data {
    pub(crate) tags: TagClient,
}

fn commands() -> Vec<poise::Command<Data, BotError>> {
    let mut commands = vec![help::help()];
    commands.extend(tag_commands());
    commands
}

/// Run the Discord bot.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the Discord client fails.
pub async fn run() -> Result<()> {
    info!("Initializing bot");
    let config = Config::from_env()?;

    debug!("Initializing site API client");
    let tags = TagClient::new(&config.site_api_url, config.site_api_key.clone())?;

    debug!("Setting up gateway intents");
    let intents = GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT;

    debug!("Building framework");
    let framework = Framework::builder()
        .options(FrameworkOptions {
            commands: commands(),
            prefix_options: PrefixFrameworkOptions {
                prefix: Some(config.prefix.clone()),
                ..Default::default()
            },
            on_error: |error| Box::pin(error_handler::on_error(error)),
            pre_command: |ctx| {
                Box::pin(async move {
                    debug!(
                        "Running command '{}' for {}",
                        ctx.command().qualified_name,
                        ctx.author().tag()
                    );
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                info!("Bot is ready and connected to Discord");
                debug!("Registering commands globally");
                builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Commands registered successfully");
                Ok(Data { tags })
            })
        })
        .build();

    debug!("Creating Discord client");
    let mut client = ClientBuilder::new(config.discord_token, intents)
        .framework(framework)
        .await?;

    info!("Starting Discord client");

    tokio::select! {
        result = client.start() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, shutting down...");
        }
    }

    Ok(())
}
