use super::error::MilitaryError;
use super::intent::*;
use super::squad::Squad;
use super::world::*;
use log::*;
use screeps::Position;
use std::cmp::Reverse;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub executed: usize,
    pub failed: usize,
    /// Lower priority intents discarded in favour of the winner.
    pub dropped: usize,
    pub malformed: usize,
}

impl DispatchSummary {
    pub fn merge(&mut self, other: DispatchSummary) {
        self.executed += other.executed;
        self.failed += other.failed;
        self.dropped += other.dropped;
        self.malformed += other.malformed;
    }
}

/// Highest priority well-formed intent. Earlier intents win ties.
pub fn select_intent(intents: &[Intent]) -> Option<&Intent> {
    intents
        .iter()
        .enumerate()
        .filter(|(_, intent)| intent.is_well_formed())
        .min_by_key(|(index, intent)| (Reverse(intent.action.priority()), *index))
        .map(|(_, intent)| intent)
}

/// Turns an intent into a concrete action. Position moves take the first
/// step of a path and resolve to nothing when there is none.
pub fn resolve_action(intent: &Intent, unit_pos: Position, oracle: &dyn MovementOracle) -> Option<UnitAction> {
    match (intent.action, &intent.target) {
        (IntentAction::Move, IntentTarget::Direction(direction)) => Some(UnitAction::Move(*direction)),
        (IntentAction::Move, IntentTarget::Position(target)) => oracle
            .next_step_direction(unit_pos, *target, PathOptions::range(0))
            .map(UnitAction::Move),
        (IntentAction::RangedAttack, IntentTarget::Hostile(id)) => Some(UnitAction::RangedAttack(id.clone())),
        (IntentAction::MeleeAttack, IntentTarget::Hostile(id)) => Some(UnitAction::MeleeAttack(id.clone())),
        (IntentAction::Heal, IntentTarget::Unit(name)) => Some(UnitAction::Heal(name.clone())),
        _ => None,
    }
}

/// Issues at most one action per member. Executor failures are not retried.
pub fn dispatch_squad(
    squad: &Squad,
    registry: &dyn UnitRegistry,
    oracle: &dyn MovementOracle,
    executor: &mut dyn UnitExecutor,
    log_intents: bool,
) -> DispatchSummary {
    let mut summary = DispatchSummary::default();

    for member in squad.members().iter().filter(|m| !m.intents.is_empty()) {
        let well_formed = member.intents.iter().filter(|i| i.is_well_formed()).count();
        let malformed = member.intents.len() - well_formed;

        if malformed > 0 {
            error!(
                "{} - Operation: {} - Count: {}",
                MilitaryError::MalformedIntent {
                    squad: squad.id(),
                    unit: member.name.clone(),
                },
                squad.operation(),
                malformed
            );

            summary.malformed += malformed;
        }

        let handle = match registry.resolve(&member.name) {
            Some(handle) => handle,
            None => continue,
        };

        let action = match select_intent(&member.intents).and_then(|intent| resolve_action(intent, handle.pos, oracle)) {
            Some(action) => action,
            None => continue,
        };

        summary.dropped += well_formed.saturating_sub(1);

        if log_intents {
            debug!("Dispatching {:?} for {} - Squad: {}", action, member.name, squad.id());
        }

        match executor.execute(&member.name, &action) {
            Ok(()) => summary.executed += 1,
            Err(err) => {
                debug!("Action failed for {}: {} - Squad: {}", member.name, err, squad.id());

                summary.failed += 1;
            }
        }
    }

    summary
}
