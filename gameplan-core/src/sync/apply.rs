//! Drives queued diffs through the gateway and writes results back.

use std::collections::HashMap;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::{GameplanError, GameplanResult};
use crate::event::Event;
use crate::game::{GameId, Role};
use crate::gateway::{BatchOutcome, BatchRequest};
use crate::sync::{DiffKind, GameDiff, Reconciler, RunContext};

/// Tracks whether every delete queued for a retracted game went through.
#[derive(Default)]
struct Retractions(HashMap<GameId, bool>);

impl Retractions {
    fn record(&mut self, game_id: &GameId, ok: bool) {
        let entry = self.0.entry(game_id.clone()).or_insert(true);
        *entry &= ok;
    }
}

impl Reconciler<'_> {
    /// One provider round trip per diff. A failure only affects its own diff.
    pub(crate) async fn apply_sequential(&self, diffs: &[GameDiff], ctx: &mut RunContext) {
        let mut retractions = Retractions::default();

        for diff in diffs {
            debug!(%diff, "Applying");
            let result = self.gateway.apply_single(&diff.operation).await;
            self.settle(diff, result, ctx, &mut retractions);
        }

        self.finish_retractions(retractions);
    }

    /// Groups diffs into club-create, club-update, team-create, team-update
    /// and delete lists and submits each list as one batch.
    pub(crate) async fn apply_batched(&self, diffs: &[GameDiff], ctx: &mut RunContext) {
        let groups: [(&str, Vec<&GameDiff>); 5] = [
            ("club-create", select(diffs, Some(Role::Club), DiffKind::Create)),
            ("club-update", select(diffs, Some(Role::Club), DiffKind::Update)),
            ("team-create", select(diffs, Some(Role::Team), DiffKind::Create)),
            ("team-update", select(diffs, Some(Role::Team), DiffKind::Update)),
            ("delete", select(diffs, None, DiffKind::Delete)),
        ];

        let mut retractions = Retractions::default();

        for (name, group) in groups {
            if group.is_empty() {
                continue;
            }
            self.submit_batch(name, &group, ctx, &mut retractions).await;
        }

        self.finish_retractions(retractions);
    }

    async fn submit_batch(
        &self,
        name: &str,
        group: &[&GameDiff],
        ctx: &mut RunContext,
        retractions: &mut Retractions,
    ) {
        // Token -> originating diff. Lives only for this call.
        let mut pending: HashMap<String, &GameDiff> = HashMap::with_capacity(group.len());
        let mut requests = Vec::with_capacity(group.len());

        for diff in group {
            let token = Uuid::new_v4().to_string();
            requests.push(BatchRequest {
                token: token.clone(),
                operation: diff.operation.clone(),
            });
            pending.insert(token, *diff);
        }

        info!(batch = name, size = requests.len(), "Submitting batch");

        let outcomes = match self.gateway.apply_batch(&requests).await {
            Ok(outcomes) => outcomes,
            Err(e) => {
                error!(batch = name, error = %e, "Batch failed, all operations indeterminate");
                for diff in group {
                    ctx.record_failure(&diff.game_id, diff.role, diff.kind(), &e);
                    if diff.kind() == DiffKind::Delete {
                        retractions.record(&diff.game_id, false);
                    }
                }
                return;
            }
        };

        for (token, outcome) in outcomes {
            let Some(diff) = pending.remove(&token) else {
                warn!(batch = name, token, "Outcome for unknown token ignored");
                continue;
            };

            let result = match outcome {
                BatchOutcome::Success(event) => Ok(event),
                BatchOutcome::Failure(detail) => Err(GameplanError::Provider(detail)),
            };
            self.settle(diff, result, ctx, retractions);
        }

        // Never silently drop an operation the provider did not answer.
        for diff in pending.into_values() {
            self.settle(
                diff,
                Err(GameplanError::Provider("No outcome returned for operation".into())),
                ctx,
                retractions,
            );
        }
    }

    /// Count the outcome of one diff and persist what it produced.
    fn settle(
        &self,
        diff: &GameDiff,
        result: GameplanResult<Option<Event>>,
        ctx: &mut RunContext,
        retractions: &mut Retractions,
    ) {
        let kind = diff.kind();

        let remote = match result {
            Ok(remote) => remote,
            Err(e) => {
                ctx.record_failure(&diff.game_id, diff.role, kind, e);
                if kind == DiffKind::Delete {
                    retractions.record(&diff.game_id, false);
                }
                return;
            }
        };

        match kind {
            DiffKind::Create => {
                let Some(event_id) = remote.map(|e| e.id).filter(|id| !id.is_empty()) else {
                    ctx.record_failure(
                        &diff.game_id,
                        diff.role,
                        kind,
                        "Provider acknowledged create without an event id",
                    );
                    return;
                };

                // The remote event exists from here on, even if the write-back fails.
                ctx.counters.record(diff.role, kind);

                match self.store.set_event_id(&diff.game_id, diff.role, Some(&event_id)) {
                    Ok(()) => info!(game = %diff.game_id, role = %diff.role, event_id, "Created event"),
                    Err(e) => ctx.record_failure(&diff.game_id, diff.role, kind, e),
                }
            }
            DiffKind::Update => {
                ctx.counters.record(diff.role, kind);
                info!(game = %diff.game_id, role = %diff.role, "Updated event");
            }
            DiffKind::Delete => {
                ctx.counters.record(diff.role, kind);
                info!(game = %diff.game_id, role = %diff.role, "Deleted event");

                if let Err(e) = self.store.set_event_id(&diff.game_id, diff.role, None) {
                    warn!(game = %diff.game_id, error = %e, "Could not clear event id");
                }
                retractions.record(&diff.game_id, true);
            }
        }
    }

    /// Drop games that have been removed from every calendar.
    fn finish_retractions(&self, retractions: Retractions) {
        for (game_id, all_deleted) in retractions.0 {
            if !all_deleted {
                debug!(game = %game_id, "Keeping game, some deletes failed");
                continue;
            }

            match self.store.delete_game(&game_id) {
                Ok(_) => info!(game = %game_id, "Retracted game"),
                Err(e) => warn!(game = %game_id, error = %e, "Could not remove retracted game"),
            }
        }
    }
}

fn select(diffs: &[GameDiff], role: Option<Role>, kind: DiffKind) -> Vec<&GameDiff> {
    diffs
        .iter()
        .filter(|d| d.kind() == kind && role.is_none_or(|r| d.role == r))
        .collect()
}
