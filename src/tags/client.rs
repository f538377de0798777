//! HTTP client for the site API's tag endpoints.

use log::debug;
use poise::serenity_prelude::CreateEmbed;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, de::DeserializeOwned};
use url::Url;

use crate::error::{BotError, Result};

/// Embed content stored for a tag.
#[derive(Debug, Clone, Deserialize)]
pub struct TagEmbed {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: String,
}

/// A tag as served by the site API.
#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    pub title: String,
    pub embed: TagEmbed,
}

impl Tag {
    /// Build the Discord embed for this tag.
    #[must_use]
    pub fn to_embed(&self) -> CreateEmbed {
        let title = self.embed.title.as_deref().unwrap_or(&self.title);
        CreateEmbed::new()
            .title(title)
            .description(&self.embed.description)
    }
}

#[derive(Debug)]
pub struct TagClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl TagClient {
    /// Create a client for the site API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a usable base URL.
    pub fn new(base_url: &str, api_key: String) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(BotError::Config(format!(
                "Site API URL cannot be used as a base: {base_url}"
            )));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
        })
    }

    /// Fetch a single tag by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty, the request fails, or the API
    /// answers with a non-success status.
    pub async fn get(&self, name: &str) -> Result<Tag> {
        let name = normalize_tag_name(name)?;
        let url = self.endpoint(&["bot", "tags", &name])?;
        self.fetch(url).await
    }

    /// Fetch every tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API answers with a
    /// non-success status.
    pub async fn list(&self) -> Result<Vec<Tag>> {
        let url = self.endpoint(&["bot", "tags"])?;
        self.fetch(url).await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                BotError::Config(format!(
                    "Site API URL cannot be used as a base: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn fetch<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("Sending request to site API: {url}");

        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("Token {}", self.api_key))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .text()
                .await
                .unwrap_or_else(|e| format!("Failed to read error response: {e}"));
            return Err(BotError::SiteApi { status, message });
        }

        Ok(response.json().await?)
    }
}

/// Trim and lowercase a tag name, rejecting empty names.
///
/// # Errors
///
/// Returns [`BotError::TagNameEmpty`] if nothing is left after trimming.
pub fn normalize_tag_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(BotError::TagNameEmpty);
    }
    Ok(name.to_lowercase())
}
