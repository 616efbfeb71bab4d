use super::error::*;
use super::formation::quadrant_rally_positions;
use super::identifiers::*;
use super::intent::*;
use super::managers::SquadArchetype;
use super::world::*;
use screeps::{Direction, Position, RoomName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Role a unit plays within a squad.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SquadRole {
    /// Melee striker with ATTACK.
    Zealot,
    /// Ranged kiter with RANGED_ATTACK and HEAL.
    Stalker,
    /// Front row of a tower drain, soaks damage with TOUGH + HEAL.
    TowerTank,
    /// Back row of a tower drain, heals the front row.
    TowerMedic,
}

/// A composition entry: the role required in a formation slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquadSlot {
    pub role: SquadRole,
    pub formation_slot: usize,
}

/// Side of a room a formation faces while crossing toward its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExitSide {
    Top,
    Right,
    Bottom,
    Left,
}

impl ExitSide {
    pub fn direction(self) -> Direction {
        match self {
            ExitSide::Top => Direction::Top,
            ExitSide::Right => Direction::Right,
            ExitSide::Bottom => Direction::Bottom,
            ExitSide::Left => Direction::Left,
        }
    }
}

/// Binds a unit name to its intent stack for the current tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SquadStack {
    pub name: UnitName,
    pub role: SquadRole,
    /// Fixed at recruitment. `None` for units beyond the composition.
    pub formation_slot: Option<usize>,
    pub intents: Vec<Intent>,
}

/// A member that resolved against the registry this tick.
#[derive(Clone, Debug, PartialEq)]
pub struct LivingMember {
    pub name: UnitName,
    pub role: SquadRole,
    pub formation_slot: Option<usize>,
    pub handle: UnitHandle,
}

impl LivingMember {
    pub fn pos(&self) -> Position {
        self.handle.pos
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Squad {
    uuid: SquadId,
    operation_uuid: OperationId,
    archetype: String,
    target_room: RoomName,
    rally_pos: Option<Position>,
    orientation: Option<ExitSide>,
    rally_complete: bool,
    objective_resolved: bool,
    total_members_added: u32,
    members: Vec<SquadStack>,
}

impl Squad {
    pub fn new(uuid: SquadId, operation_uuid: OperationId, archetype: SquadArchetype, target_room: RoomName) -> Squad {
        Squad {
            uuid,
            operation_uuid,
            archetype: archetype.name().to_owned(),
            target_room,
            rally_pos: None,
            orientation: None,
            rally_complete: false,
            objective_resolved: false,
            total_members_added: 0,
            members: Vec::new(),
        }
    }

    pub fn id(&self) -> SquadId {
        self.uuid
    }

    pub fn operation(&self) -> OperationId {
        self.operation_uuid
    }

    pub fn archetype_name(&self) -> &str {
        &self.archetype
    }

    pub fn archetype(&self) -> Result<SquadArchetype, MilitaryError> {
        SquadArchetype::from_name(&self.archetype).ok_or_else(|| MilitaryError::UnknownArchetype(self.archetype.clone()))
    }

    pub fn target_room(&self) -> RoomName {
        self.target_room
    }

    pub fn rally_pos(&self) -> Option<Position> {
        self.rally_pos
    }

    pub fn orientation(&self) -> Option<ExitSide> {
        self.orientation
    }

    pub(crate) fn set_rally(&mut self, rally_pos: Position, orientation: Option<ExitSide>) {
        self.rally_pos = Some(rally_pos);
        self.orientation = orientation;
        self.rally_complete = false;
    }

    pub fn rally_complete(&self) -> bool {
        self.rally_complete
    }

    pub(crate) fn mark_rally_complete(&mut self) {
        self.rally_complete = true;
    }

    pub fn objective_resolved(&self) -> bool {
        self.objective_resolved
    }

    pub(crate) fn resolve_objective(&mut self) {
        self.objective_resolved = true;
    }

    /// Count of every unit ever recruited, including the dead.
    pub fn total_members_added(&self) -> u32 {
        self.total_members_added
    }

    pub fn members(&self) -> &[SquadStack] {
        &self.members
    }

    pub fn binding(&self, name: &UnitName) -> Option<&SquadStack> {
        self.members.iter().find(|m| &m.name == name)
    }

    pub(crate) fn add_binding(&mut self, name: UnitName, role: SquadRole, formation_slot: Option<usize>) {
        self.members.push(SquadStack {
            name,
            role,
            formation_slot,
            intents: Vec::new(),
        });

        self.total_members_added += 1;
    }

    /// Resolves every binding in order, leaving `None` for dead units.
    pub fn resolve_members(&self, registry: &dyn UnitRegistry) -> Vec<Option<UnitHandle>> {
        self.members.iter().map(|m| registry.resolve(&m.name)).collect()
    }

    pub fn living_members(&self, registry: &dyn UnitRegistry) -> Vec<LivingMember> {
        self.members
            .iter()
            .filter_map(|m| {
                registry.resolve(&m.name).map(|handle| LivingMember {
                    name: m.name.clone(),
                    role: m.role,
                    formation_slot: m.formation_slot,
                    handle,
                })
            })
            .collect()
    }

    /// Drops bindings whose unit no longer resolves. Survivors keep their
    /// order and intent stacks. Returns the number removed.
    pub fn prune_dead(&mut self, registry: &dyn UnitRegistry) -> usize {
        let before = self.members.len();

        self.members.retain(|m| registry.resolve(&m.name).is_some());

        before - self.members.len()
    }

    pub fn reset_intents(&mut self) {
        for member in self.members.iter_mut() {
            member.intents.clear();
        }
    }

    pub fn push_intent(&mut self, unit: &UnitName, intent: Intent) -> Result<(), MilitaryError> {
        match self.members.iter_mut().find(|m| &m.name == unit) {
            Some(member) => {
                member.intents.push(intent);
                Ok(())
            }
            None => Err(MilitaryError::BindingNotFound {
                operation: self.operation_uuid,
                squad: self.uuid,
                unit: unit.clone(),
            }),
        }
    }

    /// Where a member should stand while rallying. Formation squads need the
    /// member's slot; others share the rally position.
    pub fn rally_target(&self, member: &LivingMember) -> Result<Option<Position>, MilitaryError> {
        let rally_pos = match self.rally_pos {
            Some(pos) => pos,
            None => return Ok(None),
        };

        match self.orientation {
            Some(orientation) => {
                let slots = quadrant_rally_positions(rally_pos, orientation);

                member
                    .formation_slot
                    .and_then(|slot| slots.get(slot).copied())
                    .map(Some)
                    .ok_or_else(|| self.slot_not_assigned(&member.name))
            }
            None => Ok(Some(rally_pos)),
        }
    }

    pub fn slot_not_assigned(&self, unit: &UnitName) -> MilitaryError {
        MilitaryError::SlotNotAssigned {
            operation: self.operation_uuid,
            squad: self.uuid,
            unit: unit.clone(),
        }
    }
}

/// Slot 0 leads. If it is dead the lowest live slot takes over.
pub fn lead_member(living: &[LivingMember]) -> Option<&LivingMember> {
    living
        .iter()
        .filter(|m| m.formation_slot.is_some())
        .min_by_key(|m| m.formation_slot)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationOutcome {
    Won,
    Abandoned,
}

/// A campaign against one target room, grouping one or more squads.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Operation {
    uuid: OperationId,
    target_room: RoomName,
    squads: BTreeMap<SquadId, Squad>,
    outcome: Option<OperationOutcome>,
}

impl Operation {
    pub fn new(uuid: OperationId, target_room: RoomName) -> Operation {
        Operation {
            uuid,
            target_room,
            squads: BTreeMap::new(),
            outcome: None,
        }
    }

    pub fn id(&self) -> OperationId {
        self.uuid
    }

    pub fn target_room(&self) -> RoomName {
        self.target_room
    }

    pub fn outcome(&self) -> Option<OperationOutcome> {
        self.outcome
    }

    pub(crate) fn set_outcome(&mut self, outcome: OperationOutcome) {
        self.outcome.get_or_insert(outcome);
    }

    pub fn squads(&self) -> impl Iterator<Item = &Squad> {
        self.squads.values()
    }

    pub(crate) fn squads_mut(&mut self) -> impl Iterator<Item = &mut Squad> {
        self.squads.values_mut()
    }

    pub fn squad(&self, id: SquadId) -> Option<&Squad> {
        self.squads.get(&id)
    }

    pub(crate) fn squad_mut(&mut self, id: SquadId) -> Option<&mut Squad> {
        self.squads.get_mut(&id)
    }

    pub(crate) fn insert_squad(&mut self, squad: Squad) {
        self.squads.insert(squad.id(), squad);
    }

    pub(crate) fn remove_squad(&mut self, id: SquadId) -> Option<Squad> {
        self.squads.remove(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.squads.is_empty()
    }
}
