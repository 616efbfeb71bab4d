use super::dispatch::*;
use super::identifiers::*;
use super::managers::*;
use super::squad::*;
use super::status::SquadStatus;
use super::store::SquadStore;
use super::threatmap::ThreatMap;
use super::world::*;
use crate::features::MilitaryFeatures;
use log::*;
use specs::prelude::*;
use std::collections::BTreeMap;

/// Read-only view of the live world for this tick.
pub struct MilitaryEnvironment {
    pub oracle: Box<dyn MovementOracle>,
    pub registry: Box<dyn UnitRegistry>,
    pub threats: ThreatMap,
    pub features: MilitaryFeatures,
}

impl MilitaryEnvironment {
    pub fn context(&self) -> SquadTickContext<'_> {
        SquadTickContext {
            oracle: self.oracle.as_ref(),
            registry: self.registry.as_ref(),
            threats: &self.threats,
            features: &self.features,
        }
    }
}

pub struct ExecutorResource(pub Box<dyn UnitExecutor>);

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SquadTickReport {
    pub statuses: BTreeMap<(OperationId, SquadId), SquadStatus>,
    /// Squads whose run aborted with an error.
    pub failed: usize,
    pub pruned: usize,
    pub dispatch: DispatchSummary,
    pub removed_squads: usize,
    pub completed_operations: Vec<(OperationId, OperationOutcome)>,
}

#[derive(SystemData)]
pub struct SquadSystemData<'a> {
    store: WriteExpect<'a, SquadStore>,
    environment: ReadExpect<'a, MilitaryEnvironment>,
    report: Write<'a, SquadTickReport>,
}

/// Drops bindings of dead units before any squad evaluates.
pub struct PreRunSquadSystem;

impl<'a> System<'a> for PreRunSquadSystem {
    type SystemData = SquadSystemData<'a>;

    fn run(&mut self, mut data: Self::SystemData) {
        let registry = data.environment.registry.as_ref();

        for operation in data.store.operations_mut() {
            for squad in operation.squads_mut() {
                data.report.pruned += squad.prune_dead(registry);
            }
        }
    }
}

pub struct RunSquadSystem;

impl<'a> System<'a> for RunSquadSystem {
    type SystemData = SquadSystemData<'a>;

    fn run(&mut self, mut data: Self::SystemData) {
        let ctx = data.environment.context();

        for operation in data.store.operations_mut() {
            for squad in operation.squads_mut() {
                match run_squad(squad, &ctx) {
                    Ok(status) => {
                        data.report.statuses.insert((squad.operation(), squad.id()), status);
                    }
                    Err(err) => {
                        error!("Squad tick failed: {} - Archetype: {}", err, squad.archetype_name());

                        data.report.failed += 1;
                    }
                }
            }
        }
    }
}

#[derive(SystemData)]
pub struct IntentDispatchSystemData<'a> {
    store: ReadExpect<'a, SquadStore>,
    environment: ReadExpect<'a, MilitaryEnvironment>,
    executor: WriteExpect<'a, ExecutorResource>,
    report: Write<'a, SquadTickReport>,
}

pub struct IntentDispatchSystem;

impl<'a> System<'a> for IntentDispatchSystem {
    type SystemData = IntentDispatchSystemData<'a>;

    fn run(&mut self, mut data: Self::SystemData) {
        let environment = &data.environment;

        for operation in data.store.operations() {
            for squad in operation.squads() {
                let summary = dispatch_squad(
                    squad,
                    environment.registry.as_ref(),
                    environment.oracle.as_ref(),
                    &mut *data.executor.0,
                    environment.features.log_intents,
                );

                data.report.dispatch.merge(summary);
            }
        }
    }
}

/// Removes disbanded squads and finished operations.
pub struct OperationCleanupSystem;

impl<'a> System<'a> for OperationCleanupSystem {
    type SystemData = SquadSystemData<'a>;

    fn run(&mut self, mut data: Self::SystemData) {
        let mut completed = Vec::new();

        for operation in data.store.operations_mut() {
            let disbanded: Vec<SquadId> = operation
                .squads()
                .filter(|squad| data.report.statuses.get(&(squad.operation(), squad.id())) == Some(&SquadStatus::Disbanded))
                .map(|squad| squad.id())
                .collect();

            for id in disbanded {
                if let Some(squad) = operation.remove_squad(id) {
                    info!("Squad disbanded - Operation: {} - Squad: {}", operation.id(), id);

                    data.report.removed_squads += 1;

                    if operation.is_empty() && squad.objective_resolved() {
                        operation.set_outcome(OperationOutcome::Won);
                    }
                }
            }

            if operation.is_empty() {
                if let Some(outcome) = operation.outcome() {
                    completed.push((operation.id(), outcome));
                }
            }
        }

        for (id, outcome) in completed {
            info!("Operation complete, cleaning up. - Operation: {} - Outcome: {:?}", id, outcome);

            data.store.remove_operation(id);
            data.report.completed_operations.push((id, outcome));
        }
    }
}
