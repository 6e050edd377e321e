use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{Span, info_span, warn};

use crate::game::{GameId, Role};
use crate::sync::{ActionFailure, DiffKind, RunCounters};

/// State of one run, threaded through every component by reference.
pub struct RunContext {
    pub started_at: DateTime<Utc>,
    timer: Instant,
    pub counters: RunCounters,
    pub failures: Vec<ActionFailure>,
    span: Span,
}

impl RunContext {
    pub fn new() -> Self {
        let started_at = Utc::now();
        RunContext {
            started_at,
            timer: Instant::now(),
            counters: RunCounters::default(),
            failures: Vec::new(),
            span: info_span!("run", started_at = %started_at.to_rfc3339()),
        }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn elapsed(&self) -> Duration {
        self.timer.elapsed()
    }

    pub fn record_failure(
        &mut self,
        game_id: &GameId,
        role: Role,
        kind: DiffKind,
        error: impl ToString,
    ) {
        let failure = ActionFailure {
            game_id: game_id.clone(),
            role,
            kind,
            error: error.to_string(),
        };
        warn!(parent: &self.span, failure = %failure, "Operation failed");
        self.counters.failed += 1;
        self.failures.push(failure);
    }

    /// Plain-text body for the end-of-run notification.
    pub fn summary(&self) -> String {
        let mut body = format!(
            "{}\nDuration: {:.1}s",
            self.counters,
            self.elapsed().as_secs_f64()
        );

        for failure in &self.failures {
            body.push_str(&format!("\n! {failure}"));
        }

        body
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_failure_counts_and_lists() {
        let mut ctx = RunContext::new();
        ctx.record_failure(&GameId::from("g1"), Role::Team, DiffKind::Create, "boom");

        assert_eq!(ctx.counters.failed, 1);
        assert_eq!(ctx.failures.len(), 1);
        assert!(ctx.summary().contains("create g1 [team]: boom"));
    }
}
