//! Test helpers for persona-svc integration tests
//!
//! Provides:
//! - FakeLookup: in-process lookup with configurable value, delay and failure
//! - RecordingStore: PersonStore that records every call
//! - Builders for Enricher / PersonService wired to the fakes

#![allow(dead_code)]

use async_trait::async_trait;
use persona_common::{Error, NewPerson, PersonFilter, PersonInfo, RequestContext, Result};
use persona_svc::db::PersonStore;
use persona_svc::enrich::Enricher;
use persona_svc::lookup::{AgeLookup, GenderLookup, LookupError, Lookups, NationalityLookup};
use persona_svc::service::PersonService;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Lookup fake: returns a fixed outcome after a fixed delay
pub struct FakeLookup<T> {
    outcome: std::result::Result<T, u16>,
    delay: Duration,
    calls: AtomicUsize,
    names: Mutex<Vec<String>>,
}

impl<T: Clone + Send + Sync> FakeLookup<T> {
    pub fn ok(value: T) -> Arc<Self> {
        Self::build(Ok(value), Duration::ZERO)
    }

    pub fn delayed(value: T, delay: Duration) -> Arc<Self> {
        Self::build(Ok(value), delay)
    }

    /// Fails with an HTTP status error
    pub fn failing(status: u16) -> Arc<Self> {
        Self::build(Err(status), Duration::ZERO)
    }

    fn build(outcome: std::result::Result<T, u16>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            delay,
            calls: AtomicUsize::new(0),
            names: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn names(&self) -> Vec<String> {
        self.names.lock().unwrap().clone()
    }

    async fn respond(&self, name: &str) -> std::result::Result<T, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.names.lock().unwrap().push(name.to_string());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.outcome
            .clone()
            .map_err(|status| LookupError::Status {
                service: "fake",
                status,
            })
    }
}

#[async_trait]
impl AgeLookup for FakeLookup<i64> {
    async fn get(&self, _ctx: &RequestContext, name: &str) -> std::result::Result<i64, LookupError> {
        self.respond(name).await
    }
}

#[async_trait]
impl GenderLookup for FakeLookup<String> {
    async fn get(
        &self,
        _ctx: &RequestContext,
        name: &str,
    ) -> std::result::Result<String, LookupError> {
        self.respond(name).await
    }
}

#[async_trait]
impl NationalityLookup for FakeLookup<String> {
    async fn get(
        &self,
        _ctx: &RequestContext,
        name: &str,
    ) -> std::result::Result<String, LookupError> {
        self.respond(name).await
    }
}

/// Fakes for the three lookups, kept around for call assertions
pub struct FakeLookups {
    pub age: Arc<FakeLookup<i64>>,
    pub gender: Arc<FakeLookup<String>>,
    pub nationality: Arc<FakeLookup<String>>,
}

impl FakeLookups {
    pub fn new(
        age: Arc<FakeLookup<i64>>,
        gender: Arc<FakeLookup<String>>,
        nationality: Arc<FakeLookup<String>>,
    ) -> Self {
        Self {
            age,
            gender,
            nationality,
        }
    }

    /// 25 / "male" / "RU", answering immediately
    pub fn happy() -> Self {
        Self::new(
            FakeLookup::ok(25),
            FakeLookup::ok("male".to_string()),
            FakeLookup::ok("RU".to_string()),
        )
    }

    pub fn lookups(&self) -> Lookups {
        Lookups::new(
            self.age.clone(),
            self.gender.clone(),
            self.nationality.clone(),
        )
    }

    pub fn enricher(&self, branch_timeout: Duration) -> Enricher {
        Enricher::new(self.lookups(), branch_timeout)
    }

    pub fn total_calls(&self) -> usize {
        self.age.calls() + self.gender.calls() + self.nationality.calls()
    }
}

/// In-memory PersonStore that records every call
#[derive(Default)]
pub struct RecordingStore {
    added: Mutex<Vec<NewPerson>>,
    records: Mutex<Vec<PersonInfo>>,
    add_calls: AtomicUsize,
    unreachable: AtomicBool,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_calls(&self) -> usize {
        self.add_calls.load(Ordering::SeqCst)
    }

    pub fn added(&self) -> Vec<NewPerson> {
        self.added.lock().unwrap().clone()
    }

    /// Make `ping` fail from now on
    pub fn go_offline(&self) {
        self.unreachable.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl PersonStore for RecordingStore {
    async fn add(&self, _ctx: &RequestContext, person: NewPerson) -> Result<PersonInfo> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        self.added.lock().unwrap().push(person.clone());

        let mut records = self.records.lock().unwrap();
        let info = person.with_id(records.len() as i64 + 1);
        records.push(info.clone());
        Ok(info)
    }

    async fn find(
        &self,
        _ctx: &RequestContext,
        filter: &PersonFilter,
    ) -> Result<Vec<PersonInfo>> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .filter(|p| filter.id().map_or(true, |id| p.id == id))
            .filter(|p| filter.name().map_or(true, |name| p.name == name))
            .cloned()
            .collect())
    }

    async fn update(&self, _ctx: &RequestContext, info: &PersonInfo) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        match records.iter_mut().find(|p| p.id == info.id) {
            Some(existing) => {
                *existing = info.clone();
                Ok(())
            }
            None => Err(Error::NotFound(format!("person {}", info.id))),
        }
    }

    async fn delete(&self, _ctx: &RequestContext, id: i64) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|p| p.id != id);
        if records.len() == before {
            Err(Error::NotFound(format!("person {}", id)))
        } else {
            Ok(())
        }
    }

    async fn ping(&self, _ctx: &RequestContext) -> Result<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "store offline",
            )));
        }
        Ok(())
    }
}

pub fn service_with(fakes: &FakeLookups, store: Arc<dyn PersonStore>) -> PersonService {
    PersonService::new(fakes.enricher(Duration::from_secs(1)), store)
}
