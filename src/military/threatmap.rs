use super::identifiers::TargetId;
use screeps::*;
use serde::{Deserialize, Serialize};
use shrinkwraprs::Shrinkwrap;
use std::collections::HashMap;

/// Analyzed information about a single hostile creep.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HostileCreepInfo {
    pub id: TargetId,
    pub position: Position,
    pub owner: String,
    pub hits: u32,
    pub hits_max: u32,
    /// Melee damage per tick (ATTACK parts * 30).
    pub melee_damage: u32,
    /// Ranged damage per tick (RANGED_ATTACK parts * 10).
    pub ranged_damage: u32,
    /// Heal per tick (HEAL parts * 12).
    pub heal_per_tick: u32,
    /// Whether any body part is boosted.
    pub boosted: bool,
}

impl HostileCreepInfo {
    /// Hits remaining after one tick of self-healing.
    pub fn effective_hits(&self) -> u32 {
        self.hits.saturating_add(self.heal_per_tick)
    }

    pub fn is_melee_only(&self) -> bool {
        self.melee_damage > 0 && self.ranged_damage == 0
    }
}

/// Hostile intelligence for one visible room.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomThreatData {
    #[serde(default)]
    pub hostile_creeps: Vec<HostileCreepInfo>,
    /// Game tick when this data was last updated.
    #[serde(default)]
    pub last_seen: u32,
}

/// Threat data for every room visible this tick. Rooms without an entry are
/// not visible.
#[derive(Shrinkwrap, Clone, Debug, Default)]
#[shrinkwrap(mutable)]
pub struct ThreatMap(pub HashMap<RoomName, RoomThreatData>);

impl ThreatMap {
    pub fn new() -> ThreatMap {
        ThreatMap(HashMap::new())
    }

    pub fn hostiles_in(&self, room: RoomName) -> &[HostileCreepInfo] {
        self.0.get(&room).map(|data| data.hostile_creeps.as_slice()).unwrap_or(&[])
    }

    /// Visible with no hostiles. Rooms without vision are never clear.
    pub fn is_clear(&self, room: RoomName) -> bool {
        self.0.get(&room).map(|data| data.hostile_creeps.is_empty()).unwrap_or(false)
    }
}
