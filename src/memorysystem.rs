use itertools::Itertools;
use log::*;
use screeps::MEMORY_SEGMENT_SIZE_LIMIT;
use std::collections::HashSet;

/// Raw memory segments. Requested segments become readable on a later tick.
pub trait SegmentStorage {
    fn active_segments(&self) -> Vec<u8>;

    fn get(&self, segment: u8) -> Option<String>;

    fn set(&mut self, segment: u8, data: String);

    fn set_active_segments(&mut self, segments: &[u8]);
}

pub struct MemoryArbiter<S: SegmentStorage> {
    storage: S,
    active: Option<HashSet<u8>>,
    requests: HashSet<u8>,
}

impl<S: SegmentStorage> MemoryArbiter<S> {
    pub fn new(storage: S) -> MemoryArbiter<S> {
        MemoryArbiter {
            storage,
            active: None,
            requests: HashSet::new(),
        }
    }

    pub fn request(&mut self, segment: u8) {
        self.requests.insert(segment);
    }

    pub fn is_active(&mut self, segment: u8) -> bool {
        let storage = &self.storage;

        self.active
            .get_or_insert_with(|| storage.active_segments().into_iter().collect())
            .contains(&segment)
    }

    pub fn get(&self, segment: u8) -> Option<String> {
        self.storage.get(segment)
    }

    pub fn set(&mut self, segment: u8, data: String) {
        if data.len() > MEMORY_SEGMENT_SIZE_LIMIT as usize {
            error!("Memory segment too large - Segment: {} - Size: {}", segment, data.len());
        }

        self.storage.set(segment, data);
    }

    /// Activates the requested segments for the next tick and forgets this
    /// tick's requests.
    pub fn flush(&mut self) {
        let segments: Vec<u8> = self.requests.iter().copied().sorted().collect();

        self.storage.set_active_segments(&segments);

        self.requests.clear();
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemorySegments;

    #[test]
    fn requests_activate_on_flush() {
        let mut arbiter = MemoryArbiter::new(MemorySegments::new());

        arbiter.request(51);
        arbiter.request(50);

        assert!(!arbiter.is_active(50));

        arbiter.flush();

        assert!(arbiter.is_active(50));
        assert!(arbiter.is_active(51));
        assert!(!arbiter.is_active(52));
    }

    #[test]
    fn segments_store_and_return_data() {
        let mut arbiter = MemoryArbiter::new(MemorySegments::new());

        arbiter.set(50, "payload".to_owned());

        assert_eq!(arbiter.get(50), Some("payload".to_owned()));
        assert_eq!(arbiter.get(51), None);
    }
}
