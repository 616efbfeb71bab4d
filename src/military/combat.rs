use super::formation::*;
use super::threatmap::HostileCreepInfo;
use super::world::*;
use screeps::*;
use std::cmp::Reverse;

pub const MELEE_RANGE: u32 = 1;
pub const RANGED_RANGE: u32 = 3;
/// Heal range for the adjacent heal action.
pub const HEAL_RANGE: u32 = 1;
/// Ranged units step away from melee hostiles at or inside this range.
pub const KITING_TRIGGER_RANGE: u32 = 2;

pub fn attack_range(melee: bool) -> u32 {
    if melee {
        MELEE_RANGE
    } else {
        RANGED_RANGE
    }
}

pub fn is_in_attack_range(unit_pos: Position, pos: Position, melee: bool) -> bool {
    unit_pos.get_range_to(pos) <= attack_range(melee)
}

/// Average member position, clamped off the room edge. Uses the first
/// member's room.
pub fn squad_centroid(positions: &[Position]) -> Option<Position> {
    let first = positions.first()?;

    let count = positions.len() as u32;
    let sum_x: u32 = positions.iter().map(|p| p.x().u8() as u32).sum();
    let sum_y: u32 = positions.iter().map(|p| p.y().u8() as u32).sum();

    let x = (sum_x / count).clamp(1, 48) as u8;
    let y = (sum_y / count).clamp(1, 48) as u8;

    Some(Position::new(
        RoomCoordinate::new(x).ok()?,
        RoomCoordinate::new(y).ok()?,
        first.room_name(),
    ))
}

/// Focus-fire target: among hostiles in the target room that at least one
/// armed ally can hit this tick, the one with the lowest effective hits. Ties go
/// to the hostile closest to the squad centroid.
pub fn best_attack_target<'a>(
    hostiles: &'a [HostileCreepInfo],
    allies: &[UnitHandle],
    target_room: RoomName,
) -> Option<&'a HostileCreepInfo> {
    let positions: Vec<Position> = allies.iter().map(|a| a.pos).collect();
    let centroid = squad_centroid(&positions);

    hostiles
        .iter()
        .filter(|h| h.position.room_name() == target_room)
        .filter(|h| {
            allies
                .iter()
                .filter(|a| a.can_attack())
                .any(|a| is_in_attack_range(a.pos, h.position, a.is_melee()))
        })
        .min_by_key(|h| {
            let distance = centroid.map(|c| c.get_range_to(h.position)).unwrap_or(0);

            (h.effective_hits(), distance)
        })
}

/// First hostile within `max_range` of the unit. No tie-break.
pub fn alternate_closest_target(hostiles: &[HostileCreepInfo], unit_pos: Position, max_range: u32) -> Option<&HostileCreepInfo> {
    hostiles.iter().find(|h| unit_pos.get_range_to(h.position) <= max_range)
}

pub fn closest_hostile(hostiles: &[HostileCreepInfo], unit_pos: Position) -> Option<&HostileCreepInfo> {
    hostiles.iter().min_by_key(|h| unit_pos.get_range_to(h.position))
}

/// Single step that puts the most distance between the unit and `threat`,
/// staying in the unit's room and off exit tiles. `None` if no step gains
/// distance.
pub fn kiting_direction(oracle: &dyn MovementOracle, unit_pos: Position, threat: Position) -> Option<Direction> {
    let current = unit_pos.get_range_to(threat);

    ALL_DIRECTIONS
        .iter()
        .filter_map(|direction| {
            let (dx, dy) = direction_offset(*direction);
            let candidate = offset_position(unit_pos, dx, dy)?;

            if is_exit_tile(candidate) || !oracle.is_walkable(candidate) {
                return None;
            }

            Some((*direction, candidate.get_range_to(threat)))
        })
        .filter(|(_, range)| *range > current)
        .min_by_key(|(_, range)| Reverse(*range))
        .map(|(direction, _)| direction)
}

pub fn is_on_rampart(oracle: &dyn MovementOracle, pos: Position) -> bool {
    oracle.structures_at(pos).contains(&StructureType::Rampart)
}

/// Heal self when exposed to hostiles off a rampart, or when damaged.
pub fn should_heal_self(unit: &UnitHandle, hostiles_present: bool, on_rampart: bool) -> bool {
    unit.can_heal() && ((hostiles_present && !on_rampart) || unit.is_damaged())
}

/// Ally (self included) missing the most hits within `range`.
pub fn most_damaged_ally<'a>(unit_pos: Position, allies: &'a [UnitHandle], range: u32) -> Option<&'a UnitHandle> {
    allies
        .iter()
        .filter(|a| a.is_damaged() && unit_pos.get_range_to(a.pos) <= range)
        .min_by_key(|a| Reverse(a.missing_hits()))
}
