use super::intent::Intent;
use super::squad::ExitSide;
use super::status::SquadStatus;
use super::world::*;
use screeps::*;

const ROOM_EDGE_MAX: i32 = 49;

/// Tolerance around a room's center when travelling toward it.
pub const TARGET_ROOM_RANGE: u32 = 23;

/// Formation slots are adjacent to their target when within this range.
pub const FORMATION_ADJACENCY: u32 = 1;

pub const ALL_DIRECTIONS: [Direction; 8] = [
    Direction::Top,
    Direction::TopRight,
    Direction::Right,
    Direction::BottomRight,
    Direction::Bottom,
    Direction::BottomLeft,
    Direction::Left,
    Direction::TopLeft,
];

// ─── Tile geometry ──────────────────────────────────────────────────────────

pub fn direction_offset(direction: Direction) -> (i32, i32) {
    match direction {
        Direction::Top => (0, -1),
        Direction::TopRight => (1, -1),
        Direction::Right => (1, 0),
        Direction::BottomRight => (1, 1),
        Direction::Bottom => (0, 1),
        Direction::BottomLeft => (-1, 1),
        Direction::Left => (-1, 0),
        Direction::TopLeft => (-1, -1),
    }
}

pub fn direction_from_offset(dx: i32, dy: i32) -> Option<Direction> {
    ALL_DIRECTIONS.iter().copied().find(|d| direction_offset(*d) == (dx.signum(), dy.signum()))
}

/// Offsets `pos` within its own room. `None` if the result leaves the room.
pub fn offset_position(pos: Position, dx: i32, dy: i32) -> Option<Position> {
    let x = pos.x().u8() as i32 + dx;
    let y = pos.y().u8() as i32 + dy;

    if !(0..=ROOM_EDGE_MAX).contains(&x) || !(0..=ROOM_EDGE_MAX).contains(&y) {
        return None;
    }

    Some(Position::new(
        RoomCoordinate::new(x as u8).ok()?,
        RoomCoordinate::new(y as u8).ok()?,
        pos.room_name(),
    ))
}

pub fn room_center(room: RoomName) -> Option<Position> {
    Some(Position::new(RoomCoordinate::new(25).ok()?, RoomCoordinate::new(25).ok()?, room))
}

pub fn is_exit_tile(pos: Position) -> bool {
    let x = pos.x().u8() as i32;
    let y = pos.y().u8() as i32;

    x == 0 || y == 0 || x == ROOM_EDGE_MAX || y == ROOM_EDGE_MAX
}

// ─── Exit tiles ─────────────────────────────────────────────────────────────

/// Inward step off an exit tile, preferring straight over diagonal.
pub fn direction_off_exit_tile(oracle: &dyn MovementOracle, pos: Position) -> Option<Direction> {
    let x = pos.x().u8() as i32;
    let y = pos.y().u8() as i32;

    let inward = |v: i32| {
        if v == 0 {
            1
        } else if v == ROOM_EDGE_MAX {
            -1
        } else {
            0
        }
    };

    let (dx, dy) = (inward(x), inward(y));

    let candidates: Vec<(i32, i32)> = match (dx, dy) {
        (0, 0) => return None,
        (dx, 0) => vec![(dx, 0), (dx, -1), (dx, 1)],
        (0, dy) => vec![(0, dy), (-1, dy), (1, dy)],
        (dx, dy) => vec![(dx, dy), (dx, 0), (0, dy)],
    };

    candidates
        .into_iter()
        .filter(|(cx, cy)| offset_position(pos, *cx, *cy).map(|p| oracle.is_walkable(p)).unwrap_or(false))
        .find_map(|(cx, cy)| direction_from_offset(cx, cy))
}

pub fn move_off_exit_tile(oracle: &dyn MovementOracle, unit_pos: Position) -> Option<Intent> {
    if !is_exit_tile(unit_pos) {
        return None;
    }

    direction_off_exit_tile(oracle, unit_pos).map(Intent::move_direction)
}

// ─── Rally ──────────────────────────────────────────────────────────────────

/// Steps toward the unit's rally target while the squad is rallying.
pub fn converge_to_rally(oracle: &dyn MovementOracle, unit_pos: Position, rally_pos: Position, status: SquadStatus) -> Option<Intent> {
    if status != SquadStatus::Rallying || unit_pos == rally_pos {
        return None;
    }

    oracle
        .next_step_direction(unit_pos, rally_pos, PathOptions::range(0))
        .map(Intent::move_direction)
}

/// Rally point between home and target: the home room when the target is at
/// most two rooms out, otherwise the room just before the target. Routes
/// include the home room.
pub fn find_rally_location(oracle: &dyn MovementOracle, home_room: RoomName, target_room: RoomName) -> Option<Position> {
    let route = oracle.find_route(home_room, target_room)?;

    let rally_room = if route.len() <= 3 {
        home_room
    } else {
        route[route.len() - 2]
    };

    room_center(rally_room)
}

// ─── Quadrant formation ─────────────────────────────────────────────────────

/// Offsets indexed by formation slot. Slots 0 and 1 form the row facing the
/// exit, slots 2 and 3 the row behind them.
pub fn formation_offsets(exit_side: ExitSide) -> [(i32, i32); 4] {
    match exit_side {
        ExitSide::Top => [(0, 0), (1, 0), (0, 1), (1, 1)],
        ExitSide::Bottom => [(0, 0), (-1, 0), (0, -1), (-1, -1)],
        ExitSide::Right => [(0, 0), (0, 1), (-1, 0), (-1, 1)],
        ExitSide::Left => [(0, 0), (0, -1), (1, 0), (1, -1)],
    }
}

/// Moves the anchor just far enough that every slot avoids the exit tiles.
fn clamp_to_formation_bounds(anchor: Position, offsets: &[(i32, i32); 4]) -> Position {
    let clamp_delta = |v: i32, lo: i32, hi: i32| v.clamp(lo, hi) - v;

    let min_dx = offsets.iter().map(|o| o.0).min().unwrap_or(0);
    let max_dx = offsets.iter().map(|o| o.0).max().unwrap_or(0);
    let min_dy = offsets.iter().map(|o| o.1).min().unwrap_or(0);
    let max_dy = offsets.iter().map(|o| o.1).max().unwrap_or(0);

    let dx = clamp_delta(anchor.x().u8() as i32, 1 - min_dx, ROOM_EDGE_MAX - 1 - max_dx);
    let dy = clamp_delta(anchor.y().u8() as i32, 1 - min_dy, ROOM_EDGE_MAX - 1 - max_dy);

    offset_position(anchor, dx, dy).unwrap_or(anchor)
}

/// Four formation slots around `anchor` (slot 0), oriented toward `exit_side`.
/// Near a room edge the anchor is shifted inward so no slot is an exit tile.
pub fn quadrant_rally_positions(anchor: Position, exit_side: ExitSide) -> [Position; 4] {
    let offsets = formation_offsets(exit_side);
    let anchor = clamp_to_formation_bounds(anchor, &offsets);

    offsets.map(|(dx, dy)| offset_position(anchor, dx, dy).unwrap_or(anchor))
}

/// Slot 0 position implied by a member standing in `slot`.
pub fn formation_anchor(member_pos: Position, slot: usize, exit_side: ExitSide) -> Option<Position> {
    let (dx, dy) = formation_offsets(exit_side).get(slot).copied()?;

    offset_position(member_pos, -dx, -dy)
}

/// Every member is within adjacency of its slot.
pub fn formation_intact(oracle: &dyn MovementOracle, placements: &[(Position, Position)]) -> bool {
    placements
        .iter()
        .all(|(unit_pos, slot_pos)| oracle.range_between(*unit_pos, *slot_pos) <= FORMATION_ADJACENCY)
}

/// Once the formation is intact every member steps along the shared leg
/// direction. Until then members regroup onto their slots.
pub fn move_into_formation(
    oracle: &dyn MovementOracle,
    unit_pos: Position,
    slot_pos: Position,
    intact: bool,
    leg: Option<Direction>,
    status: SquadStatus,
) -> Option<Intent> {
    if !matches!(status, SquadStatus::Advancing | SquadStatus::Engaging) {
        return None;
    }

    if intact {
        return leg.map(Intent::move_direction);
    }

    if unit_pos == slot_pos {
        return None;
    }

    oracle
        .next_step_direction(unit_pos, slot_pos, PathOptions::range(0))
        .map(Intent::move_direction)
}

// ─── Travel ─────────────────────────────────────────────────────────────────

pub fn direction_toward_target_room(oracle: &dyn MovementOracle, unit_pos: Position, target_room: RoomName) -> Option<Direction> {
    if unit_pos.room_name() == target_room {
        return None;
    }

    let center = room_center(target_room)?;

    if oracle.range_between(unit_pos, center) <= TARGET_ROOM_RANGE {
        return None;
    }

    oracle.next_step_direction(unit_pos, center, PathOptions::range(TARGET_ROOM_RANGE))
}

pub fn move_toward_target_room(oracle: &dyn MovementOracle, unit_pos: Position, target_room: RoomName) -> Option<Intent> {
    direction_toward_target_room(oracle, unit_pos, target_room).map(Intent::move_direction)
}
