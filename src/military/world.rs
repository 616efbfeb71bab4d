//! Boundaries to the live world: pathing and topology, the unit registry and
//! action execution. The game provides these on wasm32; tests use fakes.

use super::identifiers::*;
use super::squad::ExitSide;
use screeps::{Direction, Position, RoomName, StructureType};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PathOptions {
    /// Accept any tile within this range of the destination.
    pub range: u32,
}

impl PathOptions {
    pub fn range(range: u32) -> PathOptions {
        PathOptions { range }
    }
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ExitError {
    #[error("no path")]
    NoPath,
    #[error("invalid arguments")]
    InvalidArgs,
}

/// Pathfinding and topology oracle.
pub trait MovementOracle {
    /// First step of the shortest path, or `None` when there is no path or
    /// `from` is already within range.
    fn next_step_direction(&self, from: Position, to: Position, options: PathOptions) -> Option<Direction>;

    fn range_between(&self, a: Position, b: Position) -> u32 {
        a.get_range_to(b)
    }

    /// Side of `from`'s room that leads toward `to_room`.
    fn find_exit_side(&self, from: Position, to_room: RoomName) -> Result<ExitSide, ExitError>;

    /// Rooms from `from` to `to`, both inclusive.
    fn find_route(&self, from: RoomName, to: RoomName) -> Option<Vec<RoomName>>;

    fn structures_at(&self, pos: Position) -> Vec<StructureType>;

    fn is_walkable(&self, pos: Position) -> bool;
}

/// Whether units can stand on a structure. Ramparts only block units that
/// neither own them nor find them public.
pub fn blocks_movement(structure: StructureType, passable_rampart: bool) -> bool {
    match structure {
        StructureType::Road | StructureType::Container => false,
        StructureType::Rampart => !passable_rampart,
        _ => true,
    }
}

/// Snapshot of a live unit for this tick.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitHandle {
    pub name: UnitName,
    pub pos: Position,
    pub hits: u32,
    pub hits_max: u32,
    pub melee_parts: u32,
    pub ranged_parts: u32,
    pub heal_parts: u32,
}

impl UnitHandle {
    pub fn is_damaged(&self) -> bool {
        self.hits < self.hits_max
    }

    pub fn missing_hits(&self) -> u32 {
        self.hits_max.saturating_sub(self.hits)
    }

    pub fn health_fraction(&self) -> f32 {
        if self.hits_max == 0 {
            0.0
        } else {
            self.hits as f32 / self.hits_max as f32
        }
    }

    pub fn can_heal(&self) -> bool {
        self.heal_parts > 0
    }

    pub fn can_attack(&self) -> bool {
        self.melee_parts > 0 || self.ranged_parts > 0
    }

    /// Melee units only threaten adjacent tiles.
    pub fn is_melee(&self) -> bool {
        self.melee_parts > 0 && self.ranged_parts == 0
    }
}

pub trait UnitRegistry {
    /// `None` for dead or unknown units.
    fn resolve(&self, name: &UnitName) -> Option<UnitHandle>;
}

/// A resolved action, ready for the execution boundary.
#[derive(Clone, Debug, PartialEq)]
pub enum UnitAction {
    Move(Direction),
    RangedAttack(TargetId),
    MeleeAttack(TargetId),
    Heal(UnitName),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("unit not found")]
    UnitNotFound,
    #[error("target not found")]
    TargetNotFound,
    #[error("action rejected: {0}")]
    Rejected(String),
}

pub trait UnitExecutor {
    fn execute(&mut self, unit: &UnitName, action: &UnitAction) -> Result<(), ActionError>;
}
