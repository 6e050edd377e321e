//! Colored terminal rendering for gameplan types.

use gameplan_core::Calendar;
use gameplan_core::Game;
use gameplan_core::gateway::RemoteCalendar;
use gameplan_core::sync::{ActionFailure, DiffKind, RunCounters};
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for DiffKind {
    fn render(&self) -> String {
        let symbol = self.symbol();
        match self {
            DiffKind::Create => symbol.green().to_string(),
            DiffKind::Update => symbol.yellow().to_string(),
            DiffKind::Delete => symbol.red().to_string(),
        }
    }
}

impl Render for Calendar {
    fn render(&self) -> String {
        let shared = if self.is_shared {
            " (shared)".dimmed().to_string()
        } else {
            String::new()
        };
        format!(
            "📅 {} {}{}",
            self.label().bold(),
            self.google_calendar_id.dimmed(),
            shared
        )
    }
}

impl Render for RemoteCalendar {
    fn render(&self) -> String {
        let primary = if self.primary {
            " (primary)".dimmed().to_string()
        } else {
            String::new()
        };
        format!("📅 {} {}{}", self.name, self.id.dimmed(), primary)
    }
}

impl Render for Game {
    fn render(&self) -> String {
        let date = match self.date {
            Some(date) => date.format("%a %d.%m.%Y %H:%M").to_string(),
            None => "no date".red().to_string(),
        };

        let synced = match (&self.club_calendar_event_id, &self.team_calendar_event_id) {
            (Some(_), Some(_)) => "●".green().to_string(),
            (None, None) => "○".dimmed().to_string(),
            _ => "◐".yellow().to_string(),
        };

        let mut line = format!("{synced} {date}  {self}");
        if !self.gym.is_empty() {
            line.push_str(&format!(" {}", format!("@ {}", self.gym).dimmed()));
        }
        if !self.result.is_empty() {
            line.push_str(&format!(" {}", self.result.bold()));
        }
        line
    }
}

impl Render for ActionFailure {
    fn render(&self) -> String {
        format!(
            "{} {} [{}] {}",
            self.kind.render(),
            self.game_id,
            self.role,
            self.error.red()
        )
    }
}

impl Render for RunCounters {
    fn render(&self) -> String {
        let mut lines = Vec::new();

        if self.games_inserted > 0 || self.games_updated > 0 {
            lines.push(format!(
                "Games: {} new, {} refreshed",
                self.games_inserted, self.games_updated
            ));
        }
        if self.calendars_created > 0 || self.calendars_shared > 0 {
            lines.push(format!(
                "Calendars: {} created, {} shared",
                self.calendars_created, self.calendars_shared
            ));
        }

        lines.push(format!(
            "{} {} created  {} {} updated  {} unchanged",
            DiffKind::Create.render(),
            self.created(),
            DiffKind::Update.render(),
            self.updated(),
            self.unchanged_total().to_string().dimmed()
        ));

        if self.deleted > 0 || self.no_date > 0 {
            lines.push(format!(
                "{} {} deleted ({} without date)",
                DiffKind::Delete.render(),
                self.deleted,
                self.no_date
            ));
        }
        if self.skipped_no_calendar > 0 {
            lines.push(
                format!("{} games skipped, no league calendar", self.skipped_no_calendar)
                    .yellow()
                    .to_string(),
            );
        }
        if self.missing > 0 {
            lines.push(
                format!("{} stored events not found remotely", self.missing)
                    .yellow()
                    .to_string(),
            );
        }
        if self.failed > 0 {
            lines.push(format!("{} operations failed", self.failed).red().to_string());
        }

        lines.join("\n")
    }
}
