//! Google Calendar gateway for gameplan.
//!
//! Credentials and sessions live under `~/.config/gameplan/google/`:
//! - `app_config.toml` holds the OAuth client id and secret
//! - `session/{account}.toml` holds the tokens of one account

pub mod app_config;
pub mod auth;
pub mod batch;
mod convert;
mod gateway;
mod session;

pub use auth::authenticate;
pub use gateway::GoogleGateway;
