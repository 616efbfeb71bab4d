//! Squad manager variants. Each archetype fixes a composition and spawn
//! priority, and decides the order in which the movement and combat
//! algorithms may queue intents for its members.

pub mod domestic_defender;
pub mod solo_stalker;
pub mod solo_zealot;
pub mod tower_drainer;

use super::combat::*;
use super::error::*;
use super::formation::*;
use super::identifiers::*;
use super::intent::Intent;
use super::squad::*;
use super::status::*;
use super::threatmap::*;
use super::world::*;
use crate::features::MilitaryFeatures;
use screeps::RoomName;

pub const SPAWN_PRIORITY_HIGH: u32 = 75;
pub const SPAWN_PRIORITY_MEDIUM: u32 = 50;
pub const SPAWN_PRIORITY_LOW: u32 = 25;

/// Below this fraction of health a healer tends to itself before anything else.
pub const SELF_PRESERVATION_THRESHOLD: f32 = 0.5;

/// Everything a manager may consult while orchestrating a squad.
pub struct SquadTickContext<'a> {
    pub oracle: &'a dyn MovementOracle,
    pub registry: &'a dyn UnitRegistry,
    pub threats: &'a ThreatMap,
    pub features: &'a MilitaryFeatures,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SquadArchetype {
    /// Single melee striker.
    SoloZealot,
    /// Single ranged kiter that heals itself.
    SoloStalker,
    /// Single melee unit clearing hostiles from a home room.
    DomesticDefender,
    /// Four units in a quadrant draining tower energy.
    TowerDrainerQuad,
}

const ARCHETYPES: [SquadArchetype; 4] = [
    SquadArchetype::SoloZealot,
    SquadArchetype::SoloStalker,
    SquadArchetype::DomesticDefender,
    SquadArchetype::TowerDrainerQuad,
];

const SOLO_ZEALOT_COMPOSITION: [SquadSlot; 1] = [SquadSlot {
    role: SquadRole::Zealot,
    formation_slot: 0,
}];

const SOLO_STALKER_COMPOSITION: [SquadSlot; 1] = [SquadSlot {
    role: SquadRole::Stalker,
    formation_slot: 0,
}];

const TOWER_DRAINER_COMPOSITION: [SquadSlot; 4] = [
    SquadSlot {
        role: SquadRole::TowerTank,
        formation_slot: 0,
    },
    SquadSlot {
        role: SquadRole::TowerTank,
        formation_slot: 1,
    },
    SquadSlot {
        role: SquadRole::TowerMedic,
        formation_slot: 2,
    },
    SquadSlot {
        role: SquadRole::TowerMedic,
        formation_slot: 3,
    },
];

impl SquadArchetype {
    pub fn name(self) -> &'static str {
        match self {
            SquadArchetype::SoloZealot => "solo_zealot",
            SquadArchetype::SoloStalker => "solo_stalker",
            SquadArchetype::DomesticDefender => "domestic_defender",
            SquadArchetype::TowerDrainerQuad => "tower_drainer_quad",
        }
    }

    pub fn from_name(name: &str) -> Option<SquadArchetype> {
        ARCHETYPES.iter().copied().find(|archetype| archetype.name() == name)
    }

    pub fn spawn_composition(self) -> &'static [SquadSlot] {
        match self {
            SquadArchetype::SoloZealot | SquadArchetype::DomesticDefender => &SOLO_ZEALOT_COMPOSITION,
            SquadArchetype::SoloStalker => &SOLO_STALKER_COMPOSITION,
            SquadArchetype::TowerDrainerQuad => &TOWER_DRAINER_COMPOSITION,
        }
    }

    pub fn spawn_priority(self) -> u32 {
        match self {
            SquadArchetype::DomesticDefender => SPAWN_PRIORITY_HIGH,
            SquadArchetype::TowerDrainerQuad => SPAWN_PRIORITY_MEDIUM,
            SquadArchetype::SoloZealot | SquadArchetype::SoloStalker => SPAWN_PRIORITY_LOW,
        }
    }

    /// Members hold quadrant slots oriented toward the target.
    pub fn uses_formation(self) -> bool {
        matches!(self, SquadArchetype::TowerDrainerQuad)
    }

    pub fn create_instance(self, target_room: RoomName, operation: OperationId, sequence: u32) -> Squad {
        Squad::new(SquadId::generate(operation, sequence), operation, self, target_room)
    }

    /// Binds the unit to the first composition slot nobody holds yet. Units
    /// beyond the composition join without a slot.
    pub fn add_member(self, squad: &mut Squad, unit: UnitName) -> Option<usize> {
        let free = self.missing_composition(squad).first().copied();

        let (role, slot) = match free {
            Some(entry) => (entry.role, Some(entry.formation_slot)),
            None => (self.spawn_composition()[0].role, None),
        };

        squad.add_binding(unit, role, slot);

        slot
    }

    /// Composition entries without a bound member, for the spawning layer.
    pub fn missing_composition(self, squad: &Squad) -> Vec<SquadSlot> {
        self.spawn_composition()
            .iter()
            .filter(|entry| !squad.members().iter().any(|m| m.formation_slot == Some(entry.formation_slot)))
            .copied()
            .collect()
    }

    /// Picks the rally position between `home_room` and the target, plus the
    /// formation orientation where one is needed. Returns whether a rally
    /// position was set.
    pub fn assign_rally(self, squad: &mut Squad, home_room: RoomName, oracle: &dyn MovementOracle) -> Result<bool, MilitaryError> {
        if self == SquadArchetype::DomesticDefender {
            return Ok(false);
        }

        let rally_pos = match find_rally_location(oracle, home_room, squad.target_room()) {
            Some(pos) => pos,
            None => return Ok(false),
        };

        let orientation = if self.uses_formation() {
            let side = oracle
                .find_exit_side(rally_pos, squad.target_room())
                .map_err(|reason| MilitaryError::ExitUnavailable {
                    operation: squad.operation(),
                    squad: squad.id(),
                    reason,
                })?;

            Some(side)
        } else {
            None
        };

        squad.set_rally(rally_pos, orientation);

        Ok(true)
    }

    pub fn evaluate_status(self, squad: &Squad, living: &[LivingMember]) -> SquadStatus {
        evaluate_status(squad, living, self.spawn_composition().len())
    }

    pub fn orchestrate_tick(
        self,
        squad: &mut Squad,
        living: &[LivingMember],
        status: SquadStatus,
        ctx: &SquadTickContext,
    ) -> Result<(), MilitaryError> {
        match self {
            SquadArchetype::SoloZealot => solo_zealot::orchestrate(squad, living, status, ctx),
            SquadArchetype::SoloStalker => solo_stalker::orchestrate(squad, living, status, ctx),
            SquadArchetype::DomesticDefender => domestic_defender::orchestrate(squad, living, status, ctx),
            SquadArchetype::TowerDrainerQuad => tower_drainer::orchestrate(squad, living, status, ctx),
        }
    }
}

/// One squad's tick: reset intents, derive status, latch the rally, and let
/// the archetype queue intents. Any error aborts only this squad.
pub fn run_squad(squad: &mut Squad, ctx: &SquadTickContext) -> Result<SquadStatus, MilitaryError> {
    squad.reset_intents();

    let archetype = squad.archetype()?;

    let living = squad.living_members(ctx.registry);
    let status = archetype.evaluate_status(squad, &living);

    if status == SquadStatus::Advancing && squad.rally_pos().is_some() && !squad.rally_complete() {
        squad.mark_rally_complete();
    }

    if status != SquadStatus::Disbanded {
        archetype.orchestrate_tick(squad, &living, status, ctx)?;
    }

    Ok(status)
}

// ─── Shared orchestration steps ─────────────────────────────────────────────

pub(crate) fn queue(squad: &mut Squad, member: &LivingMember, intent: Option<Intent>) -> Result<(), MilitaryError> {
    match intent {
        Some(intent) => squad.push_intent(&member.name, intent),
        None => Ok(()),
    }
}

pub(crate) fn allies_of(living: &[LivingMember]) -> Vec<UnitHandle> {
    living.iter().map(|m| m.handle.clone()).collect()
}

pub(crate) fn rally_step(squad: &Squad, member: &LivingMember, status: SquadStatus, ctx: &SquadTickContext) -> Result<Option<Intent>, MilitaryError> {
    if status != SquadStatus::Rallying {
        return Ok(None);
    }

    let target = squad.rally_target(member)?;

    Ok(target.and_then(|target| converge_to_rally(ctx.oracle, member.pos(), target, status)))
}

pub(crate) fn travel_step(member: &LivingMember, status: SquadStatus, target_room: RoomName, ctx: &SquadTickContext) -> Option<Intent> {
    if status == SquadStatus::Rallying {
        return None;
    }

    move_toward_target_room(ctx.oracle, member.pos(), target_room)
}

pub(crate) fn melee_attack_step(member: &LivingMember, best: Option<&HostileCreepInfo>, local: &[HostileCreepInfo]) -> Option<Intent> {
    best.filter(|target| is_in_attack_range(member.pos(), target.position, true))
        .or_else(|| alternate_closest_target(local, member.pos(), MELEE_RANGE))
        .map(|target| Intent::melee_attack(target.id.clone()))
}

pub(crate) fn ranged_attack_step(member: &LivingMember, best: Option<&HostileCreepInfo>, local: &[HostileCreepInfo]) -> Option<Intent> {
    best.filter(|target| is_in_attack_range(member.pos(), target.position, false))
        .or_else(|| alternate_closest_target(local, member.pos(), RANGED_RANGE))
        .map(|target| Intent::ranged_attack(target.id.clone()))
}

/// Closes in on `target` until within `range`.
pub(crate) fn approach_step(member: &LivingMember, target: Option<&HostileCreepInfo>, range: u32, ctx: &SquadTickContext) -> Option<Intent> {
    let target = target?;

    if member.pos().get_range_to(target.position) <= range {
        return None;
    }

    ctx.oracle
        .next_step_direction(member.pos(), target.position, PathOptions::range(range))
        .map(Intent::move_direction)
}

/// Steps away from the closest hostile when it is melee-only and within
/// `KITING_TRIGGER_RANGE`. Ranged hostiles are shot, not kited.
pub(crate) fn kite_step(member: &LivingMember, local: &[HostileCreepInfo], ctx: &SquadTickContext) -> Option<Intent> {
    if !ctx.features.kiting {
        return None;
    }

    let threat = closest_hostile(local, member.pos()).filter(|h| h.is_melee_only())?;

    if member.pos().get_range_to(threat.position) > KITING_TRIGGER_RANGE {
        return None;
    }

    kiting_direction(ctx.oracle, member.pos(), threat.position).map(Intent::move_direction)
}

pub(crate) fn self_preservation_step(member: &LivingMember) -> Option<Intent> {
    let handle = &member.handle;

    if handle.can_heal() && handle.health_fraction() < SELF_PRESERVATION_THRESHOLD {
        Some(Intent::heal(member.name.clone()))
    } else {
        None
    }
}

pub(crate) fn heal_self_step(member: &LivingMember, local: &[HostileCreepInfo], ctx: &SquadTickContext) -> Option<Intent> {
    let on_rampart = is_on_rampart(ctx.oracle, member.pos());

    if should_heal_self(&member.handle, !local.is_empty(), on_rampart) {
        Some(Intent::heal(member.name.clone()))
    } else {
        None
    }
}
