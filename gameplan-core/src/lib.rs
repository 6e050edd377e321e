//! Core types for gameplan.
//!
//! This crate holds everything that is independent of a concrete calendar
//! provider:
//! - `game` and `calendar` for the two persisted record types
//! - `store` for the SQLite-backed Game Store and Calendar Registry
//! - `gateway` for the provider-facing trait the engine drives
//! - `sync` for the reconciliation engine itself
//! - `bootstrap`, `ingest`, `source` and `notify` for the rest of a run

pub mod bootstrap;
pub mod calendar;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod game;
pub mod gateway;
pub mod ingest;
pub mod notify;
pub mod run;
pub mod source;
pub mod store;
pub mod sync;

pub use calendar::Calendar;
pub use error::{GameplanError, GameplanResult};
pub use event::{Event, EventTime, Reminder};
pub use game::{Game, GameId, Role};
