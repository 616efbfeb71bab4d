//! In-memory stand-ins for the game world.

use crate::features::MilitaryFeatures;
use crate::memorysystem::SegmentStorage;
use crate::military::identifiers::*;
use crate::military::managers::*;
use crate::military::squad::*;
use crate::military::threatmap::*;
use crate::military::world::*;
use screeps::*;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

pub fn room(name: &str) -> RoomName {
    RoomName::new(name).unwrap()
}

pub fn pos(x: u8, y: u8, room_name: &str) -> Position {
    Position::new(RoomCoordinate::new(x).unwrap(), RoomCoordinate::new(y).unwrap(), room(room_name))
}

pub fn unit(name: &str, pos: Position) -> UnitHandle {
    UnitHandle {
        name: UnitName::from(name),
        pos,
        hits: 1500,
        hits_max: 1500,
        melee_parts: 0,
        ranged_parts: 0,
        heal_parts: 0,
    }
}

pub fn melee_unit(name: &str, pos: Position) -> UnitHandle {
    UnitHandle {
        melee_parts: 10,
        ..unit(name, pos)
    }
}

pub fn ranged_unit(name: &str, pos: Position) -> UnitHandle {
    UnitHandle {
        ranged_parts: 10,
        heal_parts: 5,
        ..unit(name, pos)
    }
}

pub fn hostile(id: &str, position: Position, hits: u32) -> HostileCreepInfo {
    HostileCreepInfo {
        id: TargetId::new(id),
        position,
        owner: "Invader".to_owned(),
        hits,
        hits_max: hits.max(1),
        melee_damage: 0,
        ranged_damage: 10,
        heal_per_tick: 0,
        boosted: false,
    }
}

pub fn melee_hostile(id: &str, position: Position, hits: u32) -> HostileCreepInfo {
    HostileCreepInfo {
        melee_damage: 30,
        ranged_damage: 0,
        ..hostile(id, position, hits)
    }
}

pub fn add_hostile(threats: &mut ThreatMap, hostile: HostileCreepInfo) {
    threats.entry(hostile.position.room_name()).or_default().hostile_creeps.push(hostile);
}

pub fn new_squad(archetype: SquadArchetype, target_room: &str) -> Squad {
    let target_room = room(target_room);

    archetype.create_instance(target_room, OperationId::generate(target_room, 0), 0)
}

pub fn context<'a>(
    oracle: &'a dyn MovementOracle,
    registry: &'a dyn UnitRegistry,
    threats: &'a ThreatMap,
    features: &'a MilitaryFeatures,
) -> SquadTickContext<'a> {
    SquadTickContext {
        oracle,
        registry,
        threats,
        features,
    }
}

/// Open terrain everywhere except the walls and obstacle structures added.
/// Ramparts count as friendly. Paths are straight lines.
#[derive(Clone, Default)]
pub struct FakeOracle {
    walls: HashSet<Position>,
    structures: HashMap<Position, Vec<StructureType>>,
    routes: HashMap<(RoomName, RoomName), Vec<RoomName>>,
    exits: HashMap<(RoomName, RoomName), Result<ExitSide, ExitError>>,
    blocked: bool,
}

impl FakeOracle {
    pub fn new() -> FakeOracle {
        FakeOracle::default()
    }

    pub fn add_wall(&mut self, pos: Position) {
        self.walls.insert(pos);
    }

    pub fn add_structure(&mut self, pos: Position, structure: StructureType) {
        self.structures.entry(pos).or_default().push(structure);
    }

    pub fn add_route(&mut self, from: RoomName, to: RoomName, rooms: &[&str]) {
        self.routes.insert((from, to), rooms.iter().map(|name| room(name)).collect());
    }

    pub fn set_exit(&mut self, from: RoomName, to: RoomName, side: Result<ExitSide, ExitError>) {
        self.exits.insert((from, to), side);
    }

    /// Every path search fails from now on.
    pub fn block_paths(&mut self) {
        self.blocked = true;
    }
}

impl MovementOracle for FakeOracle {
    fn next_step_direction(&self, from: Position, to: Position, options: PathOptions) -> Option<Direction> {
        if self.blocked || from.get_range_to(to) <= options.range {
            return None;
        }

        from.get_direction_to(to)
    }

    fn find_exit_side(&self, from: Position, to_room: RoomName) -> Result<ExitSide, ExitError> {
        self.exits.get(&(from.room_name(), to_room)).copied().unwrap_or(Err(ExitError::NoPath))
    }

    fn find_route(&self, from: RoomName, to: RoomName) -> Option<Vec<RoomName>> {
        if from == to {
            return Some(vec![from]);
        }

        self.routes.get(&(from, to)).cloned()
    }

    fn structures_at(&self, pos: Position) -> Vec<StructureType> {
        self.structures.get(&pos).cloned().unwrap_or_default()
    }

    fn is_walkable(&self, pos: Position) -> bool {
        !self.walls.contains(&pos) && !self.structures_at(pos).into_iter().any(|structure| blocks_movement(structure, true))
    }
}

#[derive(Default)]
pub struct FakeRegistry {
    units: HashMap<UnitName, UnitHandle>,
}

impl FakeRegistry {
    pub fn new() -> FakeRegistry {
        FakeRegistry::default()
    }

    /// Adds or replaces a unit.
    pub fn add(&mut self, handle: UnitHandle) {
        self.units.insert(handle.name.clone(), handle);
    }

    pub fn kill(&mut self, name: &str) {
        self.units.remove(&UnitName::from(name));
    }
}

impl UnitRegistry for FakeRegistry {
    fn resolve(&self, name: &UnitName) -> Option<UnitHandle> {
        self.units.get(name).cloned()
    }
}

/// Records every action, failed ones included. Clones share the record.
#[derive(Clone, Default)]
pub struct RecordingExecutor {
    calls: Rc<RefCell<Vec<(UnitName, UnitAction)>>>,
    failing: HashSet<UnitName>,
}

impl RecordingExecutor {
    pub fn new() -> RecordingExecutor {
        RecordingExecutor::default()
    }

    pub fn fail_for(&mut self, name: &str) {
        self.failing.insert(UnitName::from(name));
    }

    pub fn calls(&self) -> Vec<(UnitName, UnitAction)> {
        self.calls.borrow().clone()
    }
}

impl UnitExecutor for RecordingExecutor {
    fn execute(&mut self, unit: &UnitName, action: &UnitAction) -> Result<(), ActionError> {
        self.calls.borrow_mut().push((unit.clone(), action.clone()));

        if self.failing.contains(unit) {
            Err(ActionError::Rejected("ERR_NOT_IN_RANGE".to_owned()))
        } else {
            Ok(())
        }
    }
}

#[derive(Default)]
pub struct MemorySegments {
    data: HashMap<u8, String>,
    active: Vec<u8>,
}

impl MemorySegments {
    pub fn new() -> MemorySegments {
        MemorySegments::default()
    }
}

impl SegmentStorage for MemorySegments {
    fn active_segments(&self) -> Vec<u8> {
        self.active.clone()
    }

    fn get(&self, segment: u8) -> Option<String> {
        self.data.get(&segment).cloned()
    }

    fn set(&mut self, segment: u8, data: String) {
        self.data.insert(segment, data);
    }

    fn set_active_segments(&mut self, segments: &[u8]) {
        self.active = segments.to_vec();
    }
}
