use super::error::*;
use super::identifiers::*;
use super::intent::*;
use super::managers::SquadArchetype;
use super::squad::*;
use super::world::*;
use log::*;
use screeps::RoomName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The single mutable home of operations, squads and member intent stacks.
/// Loaded at tick start and persisted at tick end.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SquadStore {
    operations: BTreeMap<OperationId, Operation>,
    next_sequence: u32,
}

impl SquadStore {
    pub fn new() -> SquadStore {
        SquadStore::default()
    }

    fn allocate_sequence(&mut self) -> u32 {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);
        sequence
    }

    pub fn launch_operation(&mut self, target_room: RoomName) -> OperationId {
        let sequence = self.allocate_sequence();
        let id = OperationId::generate(target_room, sequence);

        info!("Launching operation {} against {}", id, target_room);

        self.operations.insert(id, Operation::new(id, target_room));

        id
    }

    pub fn create_squad(&mut self, operation: OperationId, archetype: SquadArchetype) -> Result<SquadId, MilitaryError> {
        let sequence = self.allocate_sequence();

        let operation_data = self
            .operations
            .get_mut(&operation)
            .ok_or(MilitaryError::OperationNotFound(operation))?;

        let squad = archetype.create_instance(operation_data.target_room(), operation, sequence);
        let id = squad.id();

        operation_data.insert_squad(squad);

        Ok(id)
    }

    /// Gives up on an operation. Its squads disband on their next evaluation.
    pub fn abandon_operation(&mut self, operation: OperationId) -> Result<(), MilitaryError> {
        let operation_data = self
            .operations
            .get_mut(&operation)
            .ok_or(MilitaryError::OperationNotFound(operation))?;

        operation_data.set_outcome(OperationOutcome::Abandoned);

        for squad in operation_data.squads_mut() {
            squad.resolve_objective();
        }

        Ok(())
    }

    pub fn operation(&self, id: OperationId) -> Option<&Operation> {
        self.operations.get(&id)
    }

    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.values()
    }

    pub(crate) fn operations_mut(&mut self) -> impl Iterator<Item = &mut Operation> {
        self.operations.values_mut()
    }

    pub(crate) fn remove_operation(&mut self, id: OperationId) -> Option<Operation> {
        self.operations.remove(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Every (operation, squad) key, in a stable order.
    pub fn squad_keys(&self) -> Vec<(OperationId, SquadId)> {
        self.operations
            .values()
            .flat_map(|operation| operation.squads().map(move |squad| (operation.id(), squad.id())))
            .collect()
    }

    pub fn get(&self, operation: OperationId, squad: SquadId) -> Option<&Squad> {
        self.operations.get(&operation)?.squad(squad)
    }

    pub fn get_mut(&mut self, operation: OperationId, squad: SquadId) -> Option<&mut Squad> {
        self.operations.get_mut(&operation)?.squad_mut(squad)
    }

    fn squad(&self, operation: OperationId, squad: SquadId) -> Result<&Squad, MilitaryError> {
        self.get(operation, squad).ok_or(MilitaryError::SquadNotFound { operation, squad })
    }

    fn squad_mut(&mut self, operation: OperationId, squad: SquadId) -> Result<&mut Squad, MilitaryError> {
        self.get_mut(operation, squad).ok_or(MilitaryError::SquadNotFound { operation, squad })
    }

    /// Members in binding order, with `None` holes for dead units.
    pub fn get_members(
        &self,
        operation: OperationId,
        squad: SquadId,
        registry: &dyn UnitRegistry,
    ) -> Result<Vec<Option<UnitHandle>>, MilitaryError> {
        Ok(self.squad(operation, squad)?.resolve_members(registry))
    }

    /// Recruits a unit. Returns the formation slot it was given.
    pub fn add_member(&mut self, operation: OperationId, squad: SquadId, unit: UnitName) -> Result<Option<usize>, MilitaryError> {
        let squad = self.squad_mut(operation, squad)?;
        let archetype = squad.archetype()?;

        Ok(archetype.add_member(squad, unit))
    }

    /// Picks the squad's rally position on the way from `home_room` to its
    /// target. Returns whether a rally position was set.
    pub fn assign_rally(
        &mut self,
        operation: OperationId,
        squad: SquadId,
        home_room: RoomName,
        oracle: &dyn MovementOracle,
    ) -> Result<bool, MilitaryError> {
        let squad = self.squad_mut(operation, squad)?;
        let archetype = squad.archetype()?;

        archetype.assign_rally(squad, home_room, oracle)
    }

    pub fn prune_dead(&mut self, operation: OperationId, squad: SquadId, registry: &dyn UnitRegistry) -> Result<usize, MilitaryError> {
        Ok(self.squad_mut(operation, squad)?.prune_dead(registry))
    }

    pub fn reset_intents(&mut self, operation: OperationId, squad: SquadId) -> Result<(), MilitaryError> {
        self.squad_mut(operation, squad)?.reset_intents();

        Ok(())
    }

    pub fn push_intent(&mut self, operation: OperationId, squad: SquadId, unit: &UnitName, intent: Intent) -> Result<(), MilitaryError> {
        self.squad_mut(operation, squad)?.push_intent(unit, intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use screeps::Direction;

    fn store_with_squad(archetype: SquadArchetype, members: &[&str]) -> (SquadStore, OperationId, SquadId) {
        let mut store = SquadStore::new();
        let operation = store.launch_operation(room("W3N1"));
        let squad = store.create_squad(operation, archetype).unwrap();

        for name in members {
            store.add_member(operation, squad, UnitName::from(*name)).unwrap();
        }

        (store, operation, squad)
    }

    #[test]
    fn push_intent_for_unknown_unit_fails_without_side_effects() {
        let (mut store, operation, squad) = store_with_squad(SquadArchetype::TowerDrainerQuad, &["a", "b"]);

        store.push_intent(operation, squad, &UnitName::from("a"), Intent::move_direction(Direction::Top)).unwrap();
        let before = store.get(operation, squad).unwrap().members().to_vec();

        let result = store.push_intent(operation, squad, &UnitName::from("ghost"), Intent::move_direction(Direction::Left));

        assert_eq!(
            result,
            Err(MilitaryError::BindingNotFound {
                operation,
                squad,
                unit: UnitName::from("ghost"),
            })
        );
        assert_eq!(store.get(operation, squad).unwrap().members(), before.as_slice());
    }

    #[test]
    fn reset_intents_is_idempotent() {
        let (mut store, operation, squad) = store_with_squad(SquadArchetype::TowerDrainerQuad, &["a", "b"]);

        store.push_intent(operation, squad, &UnitName::from("b"), Intent::move_direction(Direction::Top)).unwrap();

        for _ in 0..2 {
            store.reset_intents(operation, squad).unwrap();

            assert!(store.get(operation, squad).unwrap().members().iter().all(|m| m.intents.is_empty()));
        }
    }

    #[test]
    fn prune_dead_keeps_survivor_order_and_intents() {
        let (mut store, operation, squad) = store_with_squad(SquadArchetype::TowerDrainerQuad, &["a", "b", "c", "d"]);
        let mut registry = FakeRegistry::new();

        for name in ["a", "b", "c", "d"] {
            registry.add(unit(name, pos(20, 20, "W1N1")));
        }

        store.push_intent(operation, squad, &UnitName::from("a"), Intent::move_direction(Direction::Top)).unwrap();
        store.push_intent(operation, squad, &UnitName::from("c"), Intent::heal(UnitName::from("a"))).unwrap();
        store.push_intent(operation, squad, &UnitName::from("c"), Intent::move_direction(Direction::Left)).unwrap();

        let before = store.get(operation, squad).unwrap().members().to_vec();

        registry.kill("b");
        registry.kill("d");

        assert_eq!(store.prune_dead(operation, squad, &registry).unwrap(), 2);

        let after = store.get(operation, squad).unwrap().members();

        assert_eq!(after, &[before[0].clone(), before[2].clone()]);
    }

    #[test]
    fn members_resolve_with_holes() {
        let (store, operation, squad) = store_with_squad(SquadArchetype::TowerDrainerQuad, &["a", "b", "c"]);
        let mut registry = FakeRegistry::new();
        registry.add(unit("a", pos(20, 20, "W1N1")));
        registry.add(unit("c", pos(21, 20, "W1N1")));

        let members = store.get_members(operation, squad, &registry).unwrap();

        assert_eq!(members.len(), 3);
        assert!(members[0].is_some());
        assert!(members[1].is_none());
        assert_eq!(members[2].as_ref().map(|m| m.name.as_str()), Some("c"));
    }

    #[test]
    fn members_fill_composition_slots_in_order() {
        let (mut store, operation, squad) = store_with_squad(SquadArchetype::TowerDrainerQuad, &["a", "b", "c", "d"]);

        let extra = store.add_member(operation, squad, UnitName::from("e")).unwrap();
        let slots: Vec<_> = store.get(operation, squad).unwrap().members().iter().map(|m| m.formation_slot).collect();

        assert_eq!(slots, vec![Some(0), Some(1), Some(2), Some(3), None]);
        assert_eq!(extra, None);
    }

    #[test]
    fn rally_assignment_through_the_store() {
        let (mut store, operation, squad) = store_with_squad(SquadArchetype::TowerDrainerQuad, &["a"]);
        let mut oracle = FakeOracle::new();
        oracle.add_route(room("W1N1"), room("W3N1"), &["W1N1", "W2N1", "W3N1"]);
        oracle.set_exit(room("W1N1"), room("W3N1"), Ok(ExitSide::Right));

        assert_eq!(store.assign_rally(operation, squad, room("W1N1"), &oracle), Ok(true));

        let assigned = store.get(operation, squad).unwrap();

        assert_eq!(assigned.rally_pos(), Some(pos(25, 25, "W1N1")));
        assert_eq!(assigned.orientation(), Some(ExitSide::Right));

        let stray = SquadId::generate(operation, 99);

        assert_eq!(
            store.assign_rally(operation, stray, room("W1N1"), &oracle),
            Err(MilitaryError::SquadNotFound { operation, squad: stray })
        );
    }

    #[test]
    fn abandoning_resolves_every_squad() {
        let (mut store, operation, squad) = store_with_squad(SquadArchetype::SoloZealot, &["a"]);

        store.abandon_operation(operation).unwrap();

        assert!(store.get(operation, squad).unwrap().objective_resolved());
        assert_eq!(store.operation(operation).unwrap().outcome(), Some(OperationOutcome::Abandoned));
    }

    #[test]
    fn missing_squads_report_identifiers() {
        let (mut store, operation, _) = store_with_squad(SquadArchetype::SoloZealot, &[]);
        let stray = SquadId::generate(operation, 99);

        assert_eq!(
            store.reset_intents(operation, stray),
            Err(MilitaryError::SquadNotFound { operation, squad: stray })
        );
    }

    #[test]
    fn squad_records_round_trip_through_json() {
        let (mut store, operation, squad) = store_with_squad(SquadArchetype::TowerDrainerQuad, &["a", "b"]);

        store
            .get_mut(operation, squad)
            .unwrap()
            .set_rally(pos(25, 25, "W2N1"), Some(ExitSide::Left));
        store.push_intent(operation, squad, &UnitName::from("a"), Intent::move_to(pos(10, 10, "W2N1"))).unwrap();
        store.push_intent(operation, squad, &UnitName::from("b"), Intent::heal(UnitName::from("a"))).unwrap();

        let json = serde_json::to_string(&store).unwrap();
        let restored: SquadStore = serde_json::from_str(&json).unwrap();

        let original = store.get(operation, squad).unwrap();
        let loaded = restored.get(operation, squad).unwrap();

        assert_eq!(loaded.archetype_name(), original.archetype_name());
        assert_eq!(loaded.operation(), operation);
        assert_eq!(loaded.target_room(), original.target_room());
        assert_eq!(loaded.rally_pos(), original.rally_pos());
        assert_eq!(loaded.orientation(), Some(ExitSide::Left));
        assert_eq!(loaded.members(), original.members());
    }
}
