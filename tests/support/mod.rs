#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use active_store::{Backend, BackendError, Clock, Document, Filter, InMemoryBackend, Schema};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Schema)]
pub struct Person {
    pub name: String,
    pub age: u32,
    pub hobbies: Vec<String>,
}

pub fn person(name: &str, age: u32) -> Person {
    Person {
        name: name.to_string(),
        age,
        hobbies: Vec::new(),
    }
}

/// Clock that moves forward one second on every reading.
pub struct StepClock {
    next: Mutex<DateTime<Utc>>,
}

impl StepClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next: Mutex::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
        })
    }
}

impl Clock for StepClock {
    fn now(&self) -> DateTime<Utc> {
        let mut next = self.next.lock().unwrap();
        let now = *next;
        *next = now + Duration::seconds(1);
        now
    }
}

/// Write operations seen by a [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
    Create(String),
    BulkCreate(usize),
    Update(String),
    Replace(String),
    Delete(String),
    SoftDelete(String),
    Truncate,
}

/// In-memory backend that logs every write and fails writes of records whose
/// `name` is `"boom"`.
#[derive(Clone, Default)]
pub struct RecordingBackend {
    inner: InMemoryBackend,
    writes: Arc<Mutex<Vec<Write>>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> Vec<Write> {
        self.writes.lock().unwrap().clone()
    }

    pub fn clear_writes(&self) {
        self.writes.lock().unwrap().clear();
    }

    fn log(&self, write: Write) {
        self.writes.lock().unwrap().push(write);
    }

    fn check(record: &Document) -> Result<(), BackendError> {
        if record.get("name").and_then(|v| v.as_str()) == Some("boom") {
            return Err(BackendError::Storage("refused to write boom".into()));
        }
        Ok(())
    }

    fn name_of(record: &Document) -> String {
        record
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    }
}

impl Backend for RecordingBackend {
    fn get(&self, id: &str) -> Result<Option<Document>, BackendError> {
        self.inner.get(id)
    }

    fn list(&self) -> Result<Vec<Document>, BackendError> {
        self.inner.list()
    }

    fn find(&self, filter: &Filter, first_only: bool) -> Result<Vec<Document>, BackendError> {
        self.inner.find(filter, first_only)
    }

    fn create(&self, record: Document) -> Result<Document, BackendError> {
        self.log(Write::Create(Self::name_of(&record)));
        Self::check(&record)?;
        self.inner.create(record)
    }

    fn bulk_create(&self, records: Vec<Document>) -> Result<Vec<Document>, BackendError> {
        self.log(Write::BulkCreate(records.len()));
        for record in &records {
            Self::check(record)?;
        }
        self.inner.bulk_create(records)
    }

    fn update(&self, id: &str, patch: Document) -> Result<Option<Document>, BackendError> {
        self.log(Write::Update(Self::name_of(&patch)));
        Self::check(&patch)?;
        self.inner.update(id, patch)
    }

    fn replace(&self, id: &str, record: Document) -> Result<Option<Document>, BackendError> {
        self.log(Write::Replace(Self::name_of(&record)));
        Self::check(&record)?;
        self.inner.replace(id, record)
    }

    fn delete(&self, id: &str) -> Result<bool, BackendError> {
        self.log(Write::Delete(id.to_string()));
        self.inner.delete(id)
    }

    fn soft_delete(&self, id: &str, deleted_at: DateTime<Utc>) -> Result<bool, BackendError> {
        self.log(Write::SoftDelete(id.to_string()));
        self.inner.soft_delete(id, deleted_at)
    }

    fn truncate(&self) -> Result<(), BackendError> {
        self.log(Write::Truncate);
        self.inner.truncate()
    }
}
