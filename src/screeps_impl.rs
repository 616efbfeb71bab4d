//! Live game bindings for the world boundaries. Only built for wasm32.

use crate::game_loop::*;
use crate::memorysystem::*;
use crate::military::identifiers::*;
use crate::military::squad::ExitSide;
use crate::military::threatmap::*;
use crate::military::world::*;
use log::*;
use screeps::pathfinder::{MultiRoomCostResult, SearchOptions};
use screeps::*;
use std::str::FromStr;

pub struct RawMemorySegments;

impl SegmentStorage for RawMemorySegments {
    fn active_segments(&self) -> Vec<u8> {
        RawMemory::segments().keys().collect()
    }

    fn get(&self, segment: u8) -> Option<String> {
        RawMemory::segments().get(segment)
    }

    fn set(&mut self, segment: u8, data: String) {
        RawMemory::segments().set(segment, data);
    }

    fn set_active_segments(&mut self, segments: &[u8]) {
        RawMemory::set_active_segments(segments);
    }
}

fn is_obstacle(structure: &StructureObject) -> bool {
    let passable_rampart = match structure {
        StructureObject::StructureRampart(rampart) => rampart.my() || rampart.is_public(),
        _ => false,
    };

    blocks_movement(structure.as_structure().structure_type(), passable_rampart)
}

/// Marks every visible obstacle structure impassable. Rooms without vision
/// fall back to terrain costs.
fn structure_cost_matrix(room_name: RoomName) -> MultiRoomCostResult {
    let room = match game::rooms().get(room_name) {
        Some(room) => room,
        None => return MultiRoomCostResult::Default,
    };

    let mut cost_matrix = LocalCostMatrix::new();

    for structure in room.find(find::STRUCTURES, None).iter().filter(|structure| is_obstacle(structure)) {
        cost_matrix.set(structure.as_structure().pos().xy(), 255);
    }

    MultiRoomCostResult::CostMatrix(cost_matrix.into())
}

pub struct ScreepsOracle;

impl MovementOracle for ScreepsOracle {
    fn next_step_direction(&self, from: Position, to: Position, options: PathOptions) -> Option<Direction> {
        if from.get_range_to(to) <= options.range {
            return None;
        }

        let search_options = SearchOptions::new(structure_cost_matrix);
        let result = pathfinder::search(from, to, options.range, Some(search_options));

        if result.incomplete() {
            return None;
        }

        result.path().first().and_then(|step| from.get_direction_to(*step))
    }

    fn find_exit_side(&self, from: Position, to_room: RoomName) -> Result<ExitSide, ExitError> {
        if from.room_name() == to_room {
            return Err(ExitError::InvalidArgs);
        }

        let route = game::map::find_route(from.room_name(), to_room, Some(FindRouteOptions::default())).map_err(|_| ExitError::NoPath)?;

        let step = route.first().ok_or(ExitError::NoPath)?;

        match step.exit {
            ExitDirection::Top => Ok(ExitSide::Top),
            ExitDirection::Right => Ok(ExitSide::Right),
            ExitDirection::Bottom => Ok(ExitSide::Bottom),
            ExitDirection::Left => Ok(ExitSide::Left),
        }
    }

    fn find_route(&self, from: RoomName, to: RoomName) -> Option<Vec<RoomName>> {
        if from == to {
            return Some(vec![from]);
        }

        let route = game::map::find_route(from, to, Some(FindRouteOptions::default())).ok()?;

        Some(std::iter::once(from).chain(route.iter().map(|step| step.room)).collect())
    }

    fn structures_at(&self, pos: Position) -> Vec<StructureType> {
        game::rooms()
            .get(pos.room_name())
            .map(|room| {
                room.look_for_at_xy(look::STRUCTURES, pos.x().u8(), pos.y().u8())
                    .iter()
                    .map(|structure| structure.as_structure().structure_type())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn is_walkable(&self, pos: Position) -> bool {
        let open_terrain = game::map::get_room_terrain(pos.room_name())
            .map(|terrain| terrain.get(pos.x().u8(), pos.y().u8()) != Terrain::Wall)
            .unwrap_or(false);

        let blocked = game::rooms()
            .get(pos.room_name())
            .map(|room| {
                room.look_for_at_xy(look::STRUCTURES, pos.x().u8(), pos.y().u8())
                    .iter()
                    .any(is_obstacle)
            })
            .unwrap_or(false);

        open_terrain && !blocked
    }
}

fn find_creep(name: &UnitName) -> Option<Creep> {
    game::creeps().get(name.as_str().to_owned())
}

fn find_hostile(id: &TargetId) -> Option<Creep> {
    ObjectId::<Creep>::from_str(id.as_str()).ok()?.resolve()
}

pub struct ScreepsRegistry;

impl UnitRegistry for ScreepsRegistry {
    fn resolve(&self, name: &UnitName) -> Option<UnitHandle> {
        let creep = find_creep(name)?;

        let active_parts = |part: Part| creep.body().iter().filter(|p| p.hits() > 0 && p.part() == part).count() as u32;

        Some(UnitHandle {
            name: name.clone(),
            pos: creep.pos(),
            hits: creep.hits(),
            hits_max: creep.hits_max(),
            melee_parts: active_parts(Part::Attack),
            ranged_parts: active_parts(Part::RangedAttack),
            heal_parts: active_parts(Part::Heal),
        })
    }
}

pub struct ScreepsExecutor;

impl UnitExecutor for ScreepsExecutor {
    fn execute(&mut self, unit: &UnitName, action: &UnitAction) -> Result<(), ActionError> {
        let creep = find_creep(unit).ok_or(ActionError::UnitNotFound)?;

        let result = match action {
            UnitAction::Move(direction) => creep.move_direction(*direction),
            UnitAction::MeleeAttack(id) => creep.attack(&find_hostile(id).ok_or(ActionError::TargetNotFound)?),
            UnitAction::RangedAttack(id) => creep.ranged_attack(&find_hostile(id).ok_or(ActionError::TargetNotFound)?),
            UnitAction::Heal(target) => creep.heal(&find_creep(target).ok_or(ActionError::TargetNotFound)?),
        };

        result.map_err(|err| ActionError::Rejected(format!("{:?}", err)))
    }
}

/// Snapshot of one hostile creep. Only parts with hits left count.
pub fn analyze_hostile_creep(creep: &Creep) -> Option<HostileCreepInfo> {
    let mut melee_damage = 0;
    let mut ranged_damage = 0;
    let mut heal_per_tick = 0;
    let mut boosted = false;

    for part_info in creep.body().iter().filter(|part_info| part_info.hits() > 0) {
        boosted |= part_info.boost().is_some();

        match part_info.part() {
            Part::Attack => melee_damage += ATTACK_POWER,
            Part::RangedAttack => ranged_damage += RANGED_ATTACK_POWER,
            Part::Heal => heal_per_tick += HEAL_POWER,
            _ => {}
        }
    }

    Some(HostileCreepInfo {
        id: TargetId::new(creep.try_id()?.to_string()),
        position: creep.pos(),
        owner: creep.owner().username(),
        hits: creep.hits(),
        hits_max: creep.hits_max(),
        melee_damage,
        ranged_damage,
        heal_per_tick,
        boosted,
    })
}

pub fn gather_threats() -> ThreatMap {
    let mut threats = ThreatMap::new();
    let now = game::time();

    for room in game::rooms().values() {
        let hostile_creeps = room
            .find(find::HOSTILE_CREEPS, None)
            .iter()
            .filter_map(analyze_hostile_creep)
            .collect();

        threats.insert(
            room.name(),
            RoomThreatData {
                hostile_creeps,
                last_seen: now,
            },
        );
    }

    threats
}

pub fn run_tick() {
    let mut memory_arbiter = MemoryArbiter::new(RawMemorySegments);

    let environment = TickEnvironment {
        oracle: Box::new(ScreepsOracle),
        registry: Box::new(ScreepsRegistry),
        executor: Box::new(ScreepsExecutor),
        threats: gather_threats(),
    };

    if let Some(report) = tick(&mut memory_arbiter, environment) {
        if report.failed > 0 || report.dispatch.failed > 0 {
            warn!(
                "Military tick - Squads failed: {} - Actions failed: {} - Actions executed: {}",
                report.failed, report.dispatch.failed, report.dispatch.executed
            );
        }
    }
}
