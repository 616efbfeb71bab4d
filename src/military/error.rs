use super::identifiers::*;
use super::world::ExitError;
use thiserror::Error;

/// Invariant violations. Raising one aborts the current squad's orchestration
/// for the tick; other squads continue.
#[derive(Debug, Error, PartialEq)]
pub enum MilitaryError {
    #[error("Could not find binding for unit {unit} - Operation: {operation} - Squad: {squad}")]
    BindingNotFound {
        operation: OperationId,
        squad: SquadId,
        unit: UnitName,
    },
    #[error("Operation not found: {0}")]
    OperationNotFound(OperationId),
    #[error("Squad not found - Operation: {operation} - Squad: {squad}")]
    SquadNotFound { operation: OperationId, squad: SquadId },
    #[error("Unhandled squad manager: {0}")]
    UnknownArchetype(String),
    #[error("Unit {unit} has no formation slot - Operation: {operation} - Squad: {squad}")]
    SlotNotAssigned {
        operation: OperationId,
        squad: SquadId,
        unit: UnitName,
    },
    #[error("No exit toward target room - Operation: {operation} - Squad: {squad} - Reason: {reason}")]
    ExitUnavailable {
        operation: OperationId,
        squad: SquadId,
        reason: ExitError,
    },
    #[error("Malformed intent for unit {unit} - Squad: {squad}")]
    MalformedIntent { squad: SquadId, unit: UnitName },
}
