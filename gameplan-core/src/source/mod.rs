//! Schedule sources.

mod html;
mod probasket;

pub use probasket::{ProbasketSource, parse_schedule, strip_jsonp};
