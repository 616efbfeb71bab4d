use super::identifiers::*;
use screeps::{Direction, Position};
use serde::{Deserialize, Serialize};

/// Primitive action a unit may be asked to perform this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntentAction {
    Move,
    RangedAttack,
    MeleeAttack,
    Heal,
}

impl IntentAction {
    /// Resolution priority, higher wins. Attacks share a tier.
    pub fn priority(self) -> u8 {
        match self {
            IntentAction::Heal => 3,
            IntentAction::RangedAttack | IntentAction::MeleeAttack => 2,
            IntentAction::Move => 1,
        }
    }

    /// The target kind this action must be paired with.
    pub fn accepts(self, kind: TargetKind) -> bool {
        match self {
            IntentAction::Move => matches!(kind, TargetKind::Direction | TargetKind::Position),
            IntentAction::RangedAttack | IntentAction::MeleeAttack => kind == TargetKind::HostileId,
            IntentAction::Heal => kind == TargetKind::UnitName,
        }
    }
}

/// How an intent's target reference is to be interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    Direction,
    Position,
    HostileId,
    UnitName,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum IntentTarget {
    Direction(Direction),
    Position(Position),
    Hostile(TargetId),
    Unit(UnitName),
}

impl IntentTarget {
    pub fn kind(&self) -> TargetKind {
        match self {
            IntentTarget::Direction(_) => TargetKind::Direction,
            IntentTarget::Position(_) => TargetKind::Position,
            IntentTarget::Hostile(_) => TargetKind::HostileId,
            IntentTarget::Unit(_) => TargetKind::UnitName,
        }
    }
}

/// A single unit's requested action for the current tick. Intents live for
/// one tick and are only ever cleared as a whole stack.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub action: IntentAction,
    pub target: IntentTarget,
    pub target_kind: TargetKind,
}

impl Intent {
    pub fn move_direction(direction: Direction) -> Intent {
        Intent {
            action: IntentAction::Move,
            target: IntentTarget::Direction(direction),
            target_kind: TargetKind::Direction,
        }
    }

    pub fn move_to(position: Position) -> Intent {
        Intent {
            action: IntentAction::Move,
            target: IntentTarget::Position(position),
            target_kind: TargetKind::Position,
        }
    }

    pub fn ranged_attack(target: TargetId) -> Intent {
        Intent {
            action: IntentAction::RangedAttack,
            target: IntentTarget::Hostile(target),
            target_kind: TargetKind::HostileId,
        }
    }

    pub fn melee_attack(target: TargetId) -> Intent {
        Intent {
            action: IntentAction::MeleeAttack,
            target: IntentTarget::Hostile(target),
            target_kind: TargetKind::HostileId,
        }
    }

    /// Heal a unit by name. A unit healing itself passes its own name.
    pub fn heal(target: UnitName) -> Intent {
        Intent {
            action: IntentAction::Heal,
            target: IntentTarget::Unit(target),
            target_kind: TargetKind::UnitName,
        }
    }

    /// The discriminator agrees with both the action and the carried reference.
    pub fn is_well_formed(&self) -> bool {
        self.target.kind() == self.target_kind && self.action.accepts(self.target_kind)
    }
}
