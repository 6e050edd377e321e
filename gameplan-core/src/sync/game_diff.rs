use std::fmt;

use crate::game::{GameId, Role};
use crate::gateway::EventOperation;
use crate::sync::DiffKind;

/// One queued action for a (game, role) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct GameDiff {
    pub game_id: GameId,
    pub role: Role,
    pub operation: EventOperation,
}

impl GameDiff {
    pub fn kind(&self) -> DiffKind {
        match self.operation {
            EventOperation::Create { .. } => DiffKind::Create,
            EventOperation::Update { .. } => DiffKind::Update,
            EventOperation::Delete { .. } => DiffKind::Delete,
        }
    }
}

impl fmt::Display for GameDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}]: {}",
            self.kind().symbol(),
            self.game_id,
            self.role,
            self.operation
        )
    }
}
