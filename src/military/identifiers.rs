use screeps::RoomName;
use serde::{Deserialize, Serialize};
use shrinkwraprs::Shrinkwrap;
use std::fmt;
use uuid::Uuid;

/// Identifies a military operation. Unique across the store.
#[derive(Shrinkwrap, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationId(Uuid);

impl OperationId {
    /// Deterministically derives an operation id from the target room and a
    /// store-wide sequence number.
    pub fn generate(target_room: RoomName, sequence: u32) -> OperationId {
        let name = format!("operation:{}:{}", target_room, sequence);

        OperationId(Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()))
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies a squad. Unique within its operation, derived in the
/// operation's namespace.
#[derive(Shrinkwrap, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SquadId(Uuid);

impl SquadId {
    pub fn generate(operation: OperationId, sequence: u32) -> SquadId {
        let name = format!("squad:{}", sequence);

        SquadId(Uuid::new_v5(&operation.0, name.as_bytes()))
    }
}

impl fmt::Display for SquadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name of a unit. Bindings hold names rather than live references since the
/// unit may not exist this tick.
#[derive(Shrinkwrap, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitName(String);

impl UnitName {
    pub fn new<T: Into<String>>(name: T) -> UnitName {
        UnitName(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UnitName {
    fn from(name: &str) -> UnitName {
        UnitName(name.to_owned())
    }
}

impl fmt::Display for UnitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Game object id of a hostile.
#[derive(Shrinkwrap, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(String);

impl TargetId {
    pub fn new<T: Into<String>>(id: T) -> TargetId {
        TargetId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
