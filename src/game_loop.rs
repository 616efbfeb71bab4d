use crate::features::*;
use crate::memorysystem::*;
use crate::military::squadsystem::*;
use crate::military::store::SquadStore;
use crate::military::threatmap::ThreatMap;
use crate::military::world::*;
use crate::serialize::*;
use itertools::*;
use log::*;
use specs::prelude::*;

pub const FEATURES_SEGMENT: u8 = 49;
pub const COMPONENT_SEGMENTS: &[u8] = &[50, 51, 52];

const SEGMENT_CHUNK_SIZE: usize = 1024 * 50;

/// Live world boundaries gathered for one tick.
pub struct TickEnvironment {
    pub oracle: Box<dyn MovementOracle>,
    pub registry: Box<dyn UnitRegistry>,
    pub executor: Box<dyn UnitExecutor>,
    pub threats: ThreatMap,
}

pub struct TickOutcome {
    pub store: SquadStore,
    pub report: SquadTickReport,
}

/// Runs prune, orchestrate, dispatch and cleanup over every squad in the
/// store, in that order.
pub fn run_military_tick(store: SquadStore, environment: TickEnvironment, features: &MilitaryFeatures) -> TickOutcome {
    let TickEnvironment {
        oracle,
        registry,
        executor,
        threats,
    } = environment;

    let mut world = World::new();

    world.insert(store);
    world.insert(MilitaryEnvironment {
        oracle,
        registry,
        threats,
        features: features.clone(),
    });
    world.insert(ExecutorResource(executor));
    world.insert(SquadTickReport::default());

    let mut dispatcher = DispatcherBuilder::new()
        .with(PreRunSquadSystem, "pre_run_squads", &[])
        .with(RunSquadSystem, "run_squads", &["pre_run_squads"])
        .with(IntentDispatchSystem, "dispatch_intents", &["run_squads"])
        .with(OperationCleanupSystem, "cleanup_operations", &["dispatch_intents"])
        .build();

    dispatcher.setup(&mut world);
    dispatcher.dispatch(&world);

    TickOutcome {
        store: world.remove::<SquadStore>().unwrap_or_default(),
        report: world.remove::<SquadTickReport>().unwrap_or_default(),
    }
}

pub fn load_store<S: SegmentStorage>(memory_arbiter: &MemoryArbiter<S>, segments: &[u8]) -> SquadStore {
    let encoded_data = segments.iter().filter_map(|segment| memory_arbiter.get(*segment)).join("");

    if encoded_data.is_empty() {
        return SquadStore::new();
    }

    decode_from_string(&encoded_data).unwrap_or_else(|err| {
        error!("Failed deserialization: {}", err);

        SquadStore::new()
    })
}

pub fn save_store<S: SegmentStorage>(memory_arbiter: &mut MemoryArbiter<S>, segments: &[u8], store: &SquadStore) -> Result<(), String> {
    let encoded_data = encode_to_string(store)?;

    save_chunks(memory_arbiter, segments, &encoded_data, SEGMENT_CHUNK_SIZE)
}

/// Splits encoded data across `segments` in order and clears the segments
/// left over.
fn save_chunks<S: SegmentStorage>(
    memory_arbiter: &mut MemoryArbiter<S>,
    segments: &[u8],
    encoded_data: &str,
    chunk_size: usize,
) -> Result<(), String> {
    let chunks: Vec<&[u8]> = encoded_data.as_bytes().chunks(chunk_size).collect();

    if chunks.len() > segments.len() {
        return Err(format!(
            "Not enough segments available to store all state. Segment count: {} - Needed segments: {}",
            segments.len(),
            chunks.len()
        ));
    }

    let mut segments = segments.iter();

    for chunk in chunks {
        if let Some(segment) = segments.next() {
            let chunk_str = std::str::from_utf8(chunk).map_err(|e| e.to_string())?;

            memory_arbiter.set(*segment, chunk_str.to_owned());
        }
    }

    for segment in segments {
        memory_arbiter.set(*segment, String::new());
    }

    Ok(())
}

/// One full tick against raw memory. Returns `None` while segments are still
/// loading or the military layer is disabled.
pub fn tick<S: SegmentStorage>(memory_arbiter: &mut MemoryArbiter<S>, environment: TickEnvironment) -> Option<SquadTickReport> {
    memory_arbiter.request(FEATURES_SEGMENT);

    for segment in COMPONENT_SEGMENTS.iter() {
        memory_arbiter.request(*segment);
    }

    let is_data_ready = COMPONENT_SEGMENTS
        .iter()
        .chain(std::iter::once(&FEATURES_SEGMENT))
        .all(|segment| memory_arbiter.is_active(*segment));

    if !is_data_ready {
        info!("Component data is not ready, delaying execution");

        memory_arbiter.flush();

        return None;
    }

    let features = Features::load(memory_arbiter.get(FEATURES_SEGMENT).as_deref());

    let store = if features.reset.memory {
        info!("Resetting memory");

        SquadStore::new()
    } else {
        load_store(memory_arbiter, COMPONENT_SEGMENTS)
    };

    if !features.military.enabled {
        memory_arbiter.flush();

        return None;
    }

    let TickOutcome { store, report } = run_military_tick(store, environment, &features.military);

    save_store(memory_arbiter, COMPONENT_SEGMENTS, &store).unwrap_or_else(|err| error!("Failed serialization: {}", err));

    memory_arbiter.flush();

    Some(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::military::identifiers::*;
    use crate::military::managers::SquadArchetype;
    use crate::military::status::SquadStatus;
    use crate::testing::*;

    fn ready_arbiter() -> MemoryArbiter<MemorySegments> {
        let mut arbiter = MemoryArbiter::new(MemorySegments::new());

        arbiter.request(FEATURES_SEGMENT);

        for segment in COMPONENT_SEGMENTS {
            arbiter.request(*segment);
        }

        arbiter.flush();
        arbiter
    }

    fn environment(registry: FakeRegistry, executor: RecordingExecutor) -> TickEnvironment {
        TickEnvironment {
            oracle: Box::new(FakeOracle::new()),
            registry: Box::new(registry),
            executor: Box::new(executor),
            threats: ThreatMap::new(),
        }
    }

    #[test]
    fn first_tick_waits_for_segments() {
        let mut arbiter = MemoryArbiter::new(MemorySegments::new());

        assert!(tick(&mut arbiter, environment(FakeRegistry::new(), RecordingExecutor::new())).is_none());
        assert!(arbiter.is_active(50));
    }

    #[test]
    fn tick_persists_squad_state_and_dispatches() {
        let mut arbiter = ready_arbiter();

        let mut store = SquadStore::new();
        let operation = store.launch_operation(room("W3N1"));
        let squad = store.create_squad(operation, SquadArchetype::SoloZealot).unwrap();
        store.add_member(operation, squad, UnitName::from("zealot")).unwrap();
        save_store(&mut arbiter, COMPONENT_SEGMENTS, &store).unwrap();

        let mut registry = FakeRegistry::new();
        registry.add(melee_unit("zealot", pos(25, 25, "W3N1")));

        let executor = RecordingExecutor::new();

        let report = tick(&mut arbiter, environment(registry, executor.clone())).unwrap();

        assert_eq!(report.statuses.get(&(operation, squad)), Some(&SquadStatus::Engaging));
        assert_eq!(report.failed, 0);

        let reloaded = load_store(&arbiter, COMPONENT_SEGMENTS);

        assert_eq!(reloaded.squad_keys(), vec![(operation, squad)]);
        assert_eq!(arbiter.get(51), Some(String::new()));
        assert!(executor.calls().is_empty());
    }

    #[test]
    fn disabled_military_skips_the_pipeline() {
        let mut arbiter = ready_arbiter();
        arbiter.set(FEATURES_SEGMENT, r#"{ "military": { "enabled": false } }"#.to_owned());

        assert!(tick(&mut arbiter, environment(FakeRegistry::new(), RecordingExecutor::new())).is_none());
    }

    #[test]
    fn reset_memory_discards_saved_squads() {
        let mut arbiter = ready_arbiter();

        let mut store = SquadStore::new();
        store.launch_operation(room("W3N1"));
        save_store(&mut arbiter, COMPONENT_SEGMENTS, &store).unwrap();

        arbiter.set(FEATURES_SEGMENT, r#"{ "reset": { "memory": true } }"#.to_owned());

        let report = tick(&mut arbiter, environment(FakeRegistry::new(), RecordingExecutor::new())).unwrap();

        assert!(report.statuses.is_empty());
        assert!(load_store(&arbiter, COMPONENT_SEGMENTS).is_empty());
    }

    #[test]
    fn large_stores_span_segments() {
        let mut arbiter = ready_arbiter();
        let mut store = SquadStore::new();

        for _ in 0..50 {
            let operation = store.launch_operation(room("W3N1"));
            let squad = store.create_squad(operation, SquadArchetype::TowerDrainerQuad).unwrap();
            store.add_member(operation, squad, UnitName::from("drainer")).unwrap();
        }

        arbiter.set(52, "stale".to_owned());

        let encoded = encode_to_string(&store).unwrap();
        let chunk_size = encoded.len() / 2 + 1;

        save_chunks(&mut arbiter, COMPONENT_SEGMENTS, &encoded, chunk_size).unwrap();

        assert_eq!(arbiter.get(50).map(|data| data.len()), Some(chunk_size));
        assert!(arbiter.get(51).map(|data| !data.is_empty()).unwrap_or(false));
        assert_eq!(arbiter.get(52), Some(String::new()));

        let reloaded = load_store(&arbiter, COMPONENT_SEGMENTS);

        assert_eq!(reloaded.operations().count(), 50);
        assert_eq!(reloaded.squad_keys(), store.squad_keys());

        assert!(save_chunks(&mut arbiter, &[50], &encoded, chunk_size).is_err());
    }

    #[test]
    fn corrupt_segments_start_fresh() {
        let mut arbiter = ready_arbiter();
        arbiter.set(50, "definitely not a store".to_owned());

        assert!(load_store(&arbiter, COMPONENT_SEGMENTS).is_empty());
    }
}
