//! Decides, per game and role, what has to happen remotely.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::calendar::Calendar;
use crate::event::Event;
use crate::game::{Game, Role};
use crate::gateway::EventOperation;
use crate::store::Store;
use crate::sync::compare::matches;
use crate::sync::payload::{EventSettings, build_event};
use crate::sync::{GameDiff, RunContext};

/// Fetched remote events, by remote calendar id and then event id.
#[derive(Debug, Default)]
pub struct RemoteEvents(HashMap<String, HashMap<String, Event>>);

impl RemoteEvents {
    pub fn insert_calendar(&mut self, calendar_id: &str, events: Vec<Event>) {
        let by_id = events.into_iter().map(|e| (e.id.clone(), e)).collect();
        self.0.insert(calendar_id.to_string(), by_id);
    }

    pub fn get(&self, calendar_id: &str, event_id: &str) -> Option<&Event> {
        self.0.get(calendar_id)?.get(event_id)
    }
}

/// Snapshot of the calendar registry for one pass.
pub struct Registry<'a> {
    pub club: &'a Calendar,
    by_key: HashMap<&'a str, &'a Calendar>,
    by_league: HashMap<&'a str, &'a Calendar>,
}

impl<'a> Registry<'a> {
    pub fn new(club: &'a Calendar, calendars: &'a [Calendar]) -> Self {
        let by_key = calendars.iter().map(|c| (c.id.as_str(), c)).collect();
        let by_league = calendars
            .iter()
            .filter_map(|c| c.league.as_deref().map(|league| (league, c)))
            .collect();

        Registry {
            club,
            by_key,
            by_league,
        }
    }

    fn team_calendar(&self, game: &Game) -> Option<&'a Calendar> {
        game.team_calendar_id
            .as_deref()
            .and_then(|key| self.by_key.get(key).copied())
            .filter(|c| !c.is_club_calendar)
    }

    fn calendar_for_league(&self, league: &str) -> Option<&'a Calendar> {
        self.by_league.get(league).copied()
    }
}

pub struct Planner<'a> {
    pub store: &'a Store,
    pub registry: &'a Registry<'a>,
    pub remote: &'a RemoteEvents,
    pub settings: &'a EventSettings,
}

impl Planner<'_> {
    /// Queue the actions for every game. Unchanged, undated, unresolved and
    /// missing cases are counted on `ctx` right away.
    pub fn plan(&self, games: &mut [Game], ctx: &mut RunContext) -> Vec<GameDiff> {
        let mut diffs = Vec::new();

        for game in games.iter_mut() {
            let Some(team_calendar) = self.resolve_team_calendar(game) else {
                warn!(game = %game.id, league = %game.league, "No calendar for league, skipping game");
                ctx.counters.skipped_no_calendar += 1;
                continue;
            };

            let Some(date) = game.date else {
                ctx.counters.no_date += 1;
                self.plan_retraction(game, team_calendar, &mut diffs);
                continue;
            };

            for role in Role::ALL {
                let calendar = match role {
                    Role::Club => self.registry.club,
                    Role::Team => team_calendar,
                };

                match game.event_id(role) {
                    None => {
                        let event = build_event(game, date, self.settings);
                        diffs.push(GameDiff {
                            game_id: game.id.clone(),
                            role,
                            operation: EventOperation::Create {
                                calendar_id: calendar.google_calendar_id.clone(),
                                event,
                            },
                        });
                    }
                    Some(event_id) => {
                        let Some(existing) = self.remote.get(&calendar.google_calendar_id, event_id)
                        else {
                            warn!(
                                game = %game.id,
                                %role,
                                event_id,
                                "Stored event not found remotely"
                            );
                            ctx.counters.missing += 1;
                            continue;
                        };

                        if matches(game, existing) {
                            ctx.counters.unchanged(role);
                            continue;
                        }

                        let mut event = build_event(game, date, self.settings);
                        event.id = event_id.to_string();
                        diffs.push(GameDiff {
                            game_id: game.id.clone(),
                            role,
                            operation: EventOperation::Update {
                                calendar_id: calendar.google_calendar_id.clone(),
                                event_id: event_id.to_string(),
                                event,
                            },
                        });
                    }
                }
            }
        }

        debug!(queued = diffs.len(), "Planned reconciliation");
        diffs
    }

    /// Find the league calendar of a game, persisting the reference when it
    /// was not known yet.
    fn resolve_team_calendar<'c>(&'c self, game: &mut Game) -> Option<&'c Calendar> {
        if let Some(calendar) = self.registry.team_calendar(game) {
            return Some(calendar);
        }

        let calendar = self.registry.calendar_for_league(&game.league)?;

        match self.store.set_team_calendar(&game.id, &calendar.id) {
            Ok(()) => info!(game = %game.id, calendar = %calendar.id, "Resolved team calendar"),
            Err(e) => warn!(game = %game.id, error = %e, "Could not persist team calendar"),
        }
        game.team_calendar_id = Some(calendar.id.clone());

        Some(calendar)
    }

    /// A game without a date cannot be a timed event: remove whatever
    /// events it already has.
    fn plan_retraction(&self, game: &Game, team_calendar: &Calendar, diffs: &mut Vec<GameDiff>) {
        for role in Role::ALL {
            let Some(event_id) = game.event_id(role) else {
                continue;
            };

            let calendar = match role {
                Role::Club => self.registry.club,
                Role::Team => team_calendar,
            };

            diffs.push(GameDiff {
                game_id: game.id.clone(),
                role,
                operation: EventOperation::Delete {
                    calendar_id: calendar.google_calendar_id.clone(),
                    event_id: event_id.to_string(),
                },
            });
        }
    }
}
