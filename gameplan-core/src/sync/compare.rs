//! Staleness check between a stored game and its remote event.

use crate::event::Event;
use crate::game::Game;

/// Whether the remote event still reflects the game.
///
/// Only the start instant and the gym are compared. Team names, league and
/// result are not, so editing them never triggers an update. Instants are
/// compared, not their textual form, so `+02:00` and `Z` representations of
/// the same moment are equal.
pub fn matches(game: &Game, event: &Event) -> bool {
    let same_start = match (game.date, event.start.instant()) {
        (Some(game_start), Some(event_start)) => game_start == event_start,
        _ => false,
    };

    same_start && game.gym == event.location.as_deref().unwrap_or_default()
}
