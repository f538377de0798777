pub mod bot;
pub mod config;
pub mod error;
pub mod error_handler;
pub mod help;
pub mod tags;

pub use bot::run;
