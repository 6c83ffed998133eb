//! In-memory stand-in for the store, recording what the facade asks of it.

#![allow(dead_code)]

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use easy_mongo::mongo::{FindSpec, IndexSettings};
use easy_mongo::{
    ConnectionConfig, Connector, DocumentStream, Error, Namespace, Result, StoreClient,
    UpdateOutcome,
};
use futures::stream::{self, StreamExt};
use mongodb::bson::{doc, Bson, Document};

#[derive(Debug, Default)]
pub struct StoreState {
    pub connects: usize,
    pub probes: usize,
    pub closes: usize,
    /// Client constructions that fail before one succeeds. `usize::MAX`
    /// never succeeds.
    pub connect_failures_left: usize,
    /// Probes that fail before one succeeds. `usize::MAX` never succeeds.
    pub probe_failures_left: usize,
    pub collections: HashMap<Namespace, Vec<Document>>,
    pub indexes: Vec<(Namespace, Document, IndexSettings)>,
    pub calls: Vec<&'static str>,
    pub find_specs: Vec<FindSpec>,
    pub pipelines: Vec<Vec<Document>>,
    next_id: i64,
}

#[derive(Debug, Clone, Default)]
pub struct FakeConnector {
    state: Arc<Mutex<StoreState>>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_probes(failures: usize) -> Self {
        let connector = Self::new();
        connector.state().probe_failures_left = failures;
        connector
    }

    pub fn failing_connects(failures: usize) -> Self {
        let connector = Self::new();
        connector.state().connect_failures_left = failures;
        connector
    }

    pub fn unreachable() -> Self {
        Self::failing_probes(usize::MAX)
    }

    pub fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap()
    }

    pub fn seed(&self, ns: Namespace, documents: Vec<Document>) {
        self.state().collections.insert(ns, documents);
    }

    pub fn documents(&self, ns: &Namespace) -> Vec<Document> {
        self.state().collections.get(ns).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl Connector for FakeConnector {
    type Client = FakeStore;

    async fn connect(&self, _config: &ConnectionConfig) -> Result<FakeStore> {
        let mut state = self.state();
        state.connects += 1;
        if take_failure(&mut state.connect_failures_left) {
            return Err(refused());
        }
        Ok(FakeStore {
            state: Arc::clone(&self.state),
            shut_down: Arc::new(AtomicBool::new(false)),
        })
    }
}

/// Consumes one scheduled failure, if any is left.
fn take_failure(failures_left: &mut usize) -> bool {
    if *failures_left == 0 {
        return false;
    }
    if *failures_left != usize::MAX {
        *failures_left -= 1;
    }
    true
}

#[derive(Debug)]
pub struct FakeStore {
    state: Arc<Mutex<StoreState>>,
    shut_down: Arc<AtomicBool>,
}

impl FakeStore {
    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap()
    }

    /// Results are handed out lazily and stop once the client is shut down,
    /// the way driver cursors do.
    fn stream(&self, documents: Vec<Document>) -> DocumentStream {
        let shut_down = Arc::clone(&self.shut_down);
        stream::iter(documents)
            .map(move |document| {
                if shut_down.load(AtomicOrdering::SeqCst) {
                    Err(refused())
                } else {
                    Ok(document)
                }
            })
            .boxed()
    }
}

fn refused() -> Error {
    let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
    Error::Store(mongodb::error::Error::from(io))
}

fn matches(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(key, expected)| document.get(key) == Some(expected))
}

fn number(value: &Bson) -> f64 {
    match value {
        Bson::Int32(v) => *v as f64,
        Bson::Int64(v) => *v as f64,
        Bson::Double(v) => *v,
        _ => 0.0,
    }
}

fn compare(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    match (a, b) {
        (Some(Bson::String(a)), Some(Bson::String(b))) => a.cmp(b),
        (Some(a), Some(b)) => number(a).partial_cmp(&number(b)).unwrap_or(Ordering::Equal),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn sort_documents(documents: &mut [Document], sort: &Document) {
    documents.sort_by(|a, b| {
        sort.iter()
            .map(|(key, direction)| {
                let ordering = compare(a.get(key), b.get(key));
                if number(direction) < 0.0 {
                    ordering.reverse()
                } else {
                    ordering
                }
            })
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}

fn apply_update(document: &mut Document, update: &Document) {
    if let Ok(set) = update.get_document("$set") {
        for (key, value) in set {
            document.insert(key.clone(), value.clone());
        }
    }
    if let Ok(push) = update.get_document("$push") {
        for (key, spec) in push {
            let values = spec
                .as_document()
                .and_then(|spec| spec.get_array("$each").ok())
                .cloned()
                .unwrap_or_default();
            match document.get_array_mut(key) {
                Ok(existing) => existing.extend(values),
                Err(_) => {
                    document.insert(key.clone(), values);
                }
            }
        }
    }
}

impl StoreState {
    fn assign_id(&mut self, document: &mut Document) -> Bson {
        if let Some(id) = document.get("_id") {
            return id.clone();
        }
        self.next_id += 1;
        let id = Bson::Int64(self.next_id);
        document.insert("_id", id.clone());
        id
    }

    fn matching(&self, ns: &Namespace, filter: &Document) -> Vec<Document> {
        self.collections
            .get(ns)
            .map(|docs| docs.iter().filter(|d| matches(d, filter)).cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl StoreClient for FakeStore {
    async fn run_command(&self, _database: &str, command: Document) -> Result<Document> {
        assert_eq!(command, doc! { "ping": 1 });
        let mut state = self.state();
        state.probes += 1;
        if take_failure(&mut state.probe_failures_left) {
            return Err(refused());
        }
        Ok(doc! { "ok": 1 })
    }

    async fn find_one(
        &self,
        ns: &Namespace,
        filter: Document,
        sort: Option<Document>,
    ) -> Result<Option<Document>> {
        let mut state = self.state();
        state.calls.push("find_one");
        let mut found = state.matching(ns, &filter);
        if let Some(sort) = sort {
            sort_documents(&mut found, &sort);
        }
        Ok(found.into_iter().next())
    }

    async fn find(
        &self,
        ns: &Namespace,
        filter: Document,
        spec: FindSpec,
    ) -> Result<DocumentStream> {
        let mut state = self.state();
        state.calls.push("find");
        let mut found = state.matching(ns, &filter);
        if let Some(sort) = &spec.sort {
            sort_documents(&mut found, sort);
        }
        if let Some(limit) = spec.limit.filter(|l| *l > 0) {
            found.truncate(limit as usize);
        }
        state.find_specs.push(spec);
        Ok(self.stream(found))
    }

    async fn aggregate(&self, ns: &Namespace, pipeline: Vec<Document>) -> Result<DocumentStream> {
        let mut state = self.state();
        state.calls.push("aggregate");
        let mut documents = state.collections.get(ns).cloned().unwrap_or_default();
        for stage in &pipeline {
            if let Ok(filter) = stage.get_document("$match") {
                documents.retain(|d| matches(d, filter));
            } else if let Ok(sample) = stage.get_document("$sample") {
                let size = sample.get("size").map(number).unwrap_or(0.0) as usize;
                documents.truncate(size);
            } else if let Ok(sort) = stage.get_document("$sort") {
                sort_documents(&mut documents, sort);
            }
        }
        state.pipelines.push(pipeline);
        Ok(self.stream(documents))
    }

    async fn insert_one(&self, ns: &Namespace, mut document: Document) -> Result<Bson> {
        let mut state = self.state();
        state.calls.push("insert_one");
        let id = state.assign_id(&mut document);
        state
            .collections
            .entry(ns.clone())
            .or_default()
            .push(document);
        Ok(id)
    }

    async fn update_one(
        &self,
        ns: &Namespace,
        filter: Document,
        update: Document,
        upsert: bool,
    ) -> Result<UpdateOutcome> {
        let mut state = self.state();
        state.calls.push("update_one");

        let documents = state.collections.entry(ns.clone()).or_default();
        if let Some(existing) = documents.iter_mut().find(|d| matches(d, &filter)) {
            let before = existing.clone();
            apply_update(existing, &update);
            return Ok(UpdateOutcome {
                matched: 1,
                modified: u64::from(*existing != before),
                upserted_id: None,
            });
        }
        if !upsert {
            return Ok(UpdateOutcome::default());
        }

        let mut created = filter;
        apply_update(&mut created, &update);
        let id = state.assign_id(&mut created);
        state
            .collections
            .entry(ns.clone())
            .or_default()
            .push(created);
        Ok(UpdateOutcome {
            matched: 0,
            modified: 0,
            upserted_id: Some(id),
        })
    }

    async fn delete_many(&self, ns: &Namespace, filter: Document) -> Result<u64> {
        let mut state = self.state();
        state.calls.push("delete_many");
        let documents = state.collections.entry(ns.clone()).or_default();
        let before = documents.len();
        documents.retain(|d| !matches(d, &filter));
        Ok((before - documents.len()) as u64)
    }

    async fn count_documents(&self, ns: &Namespace, filter: Document) -> Result<u64> {
        let mut state = self.state();
        state.calls.push("count_documents");
        Ok(state.matching(ns, &filter).len() as u64)
    }

    async fn create_index(
        &self,
        ns: &Namespace,
        keys: Document,
        settings: IndexSettings,
    ) -> Result<String> {
        let mut state = self.state();
        state.calls.push("create_index");
        let name = keys
            .iter()
            .map(|(key, direction)| format!("{key}_{direction}"))
            .collect::<Vec<_>>()
            .join("_");
        state.indexes.push((ns.clone(), keys, settings));
        Ok(name)
    }

    async fn close(self) {
        self.shut_down.store(true, AtomicOrdering::SeqCst);
        self.state().closes += 1;
    }
}
