use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Serenity error: {0}")]
    Serenity(Box<poise::serenity_prelude::Error>),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Site API error ({status}): {message}")]
    SiteApi {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Tag name cannot be empty")]
    TagNameEmpty,
}

impl From<poise::serenity_prelude::Error> for BotError {
    fn from(err: poise::serenity_prelude::Error) -> Self {
        BotError::Serenity(Box::new(err))
    }
}

impl BotError {
    /// Status code of the HTTP response this error came from, if any.
    #[must_use]
    pub fn http_status(&self) -> Option<StatusCode> {
        match self {
            BotError::SiteApi { status, .. } => Some(*status),
            BotError::Reqwest(err) => err.status(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, BotError>;
