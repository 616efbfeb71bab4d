use super::formation::FORMATION_ADJACENCY;
use super::squad::*;
use serde::{Deserialize, Serialize};

/// Squad lifecycle state, derived fresh every tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SquadStatus {
    /// Forming up or converging on the rally position.
    Rallying,
    /// Rallied and travelling toward the target room.
    Advancing,
    /// At least one member is in the target room.
    Engaging,
    /// No members remain or the objective is resolved.
    Disbanded,
}

/// Status as a pure function of persisted squad state and this tick's live
/// members. A squad that never recruited anyone is still forming and stays
/// rallying.
pub fn evaluate_status(squad: &Squad, living: &[LivingMember], composition_size: usize) -> SquadStatus {
    if squad.objective_resolved() {
        return SquadStatus::Disbanded;
    }

    if living.is_empty() {
        return if squad.total_members_added() > 0 {
            SquadStatus::Disbanded
        } else {
            SquadStatus::Rallying
        };
    }

    if living.iter().any(|m| m.pos().room_name() == squad.target_room()) {
        return SquadStatus::Engaging;
    }

    if squad.rally_complete() || squad.rally_pos().is_none() {
        return SquadStatus::Advancing;
    }

    if living.len() >= composition_size && is_rallied(squad, living) {
        SquadStatus::Advancing
    } else {
        SquadStatus::Rallying
    }
}

/// Every slotted live member stands within adjacency of its rally target.
/// Members the formation cannot place are left to orchestration to report.
pub fn is_rallied(squad: &Squad, living: &[LivingMember]) -> bool {
    living.iter().all(|member| match squad.rally_target(member) {
        Ok(Some(target)) => member.pos().get_range_to(target) <= FORMATION_ADJACENCY,
        Ok(None) | Err(_) => true,
    })
}
