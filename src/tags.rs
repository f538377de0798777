//! Tag lookups backed by the site API.

mod client;
mod commands;

pub use client::{Tag, TagClient, TagEmbed};
pub use commands::{send_tag, tag_commands};
