//! Shared test fixtures for lorelink-links integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use lorelink_links::{EntityLookup, Era, LookupCandidate, LookupFailure, LookupResponse};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Category codes used by the lookup service.
pub const NPC: i64 = 1;
pub const OBJECT: i64 = 2;
pub const ITEM: i64 = 3;
pub const QUEST: i64 = 5;
pub const SPELL: i64 = 6;
pub const ACHIEVEMENT: i64 = 10;

/// In-memory lookup keyed by lowercase name.
///
/// Records every search, tracks how many searches overlap in time, and can
/// be told to fail for particular names.
#[derive(Default)]
pub struct StubLookup {
    results: HashMap<String, Vec<LookupCandidate>>,
    failures: HashMap<String, LookupFailure>,
    delay: Duration,
    searches: Mutex<Vec<(String, Era)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl StubLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, candidates: Vec<LookupCandidate>) -> Self {
        self.results.insert(name.to_lowercase(), candidates);
        self
    }

    pub fn failing(mut self, name: &str, failure: LookupFailure) -> Self {
        self.failures.insert(name.to_lowercase(), failure);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn total_searches(&self) -> usize {
        self.searches.lock().unwrap().len()
    }

    pub fn searches_for(&self, name: &str) -> usize {
        self.searches
            .lock()
            .unwrap()
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .count()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EntityLookup for StubLookup {
    async fn search(&self, name: &str, era: Era) -> LookupResponse {
        self.searches.lock().unwrap().push((name.to_string(), era));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let key = name.to_lowercase();
        if let Some(failure) = self.failures.get(&key) {
            return LookupResponse::failed(era.scope(), failure.clone());
        }
        LookupResponse::found(
            era.scope(),
            self.results.get(&key).cloned().unwrap_or_default(),
        )
    }

    fn backend_name(&self) -> &str {
        "stub"
    }
}

pub fn candidate(id: u64, name: &str, type_code: i64) -> LookupCandidate {
    LookupCandidate::new(id, name, type_code)
}
