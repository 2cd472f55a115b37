//! Trait seams for the external collaborators: the observable document
//! store and the command bus.
//!
//! Both are consumed, never reimplemented — the engine receives them as
//! explicit dependencies so hosts and tests can substitute their own.
//! Store reads are asynchronous; the engine treats every read as potentially
//! failing and degrades the affected cycle instead of retrying.
//!
//! [`MemoryStore`] and [`RecordingBus`] are in-crate reference
//! implementations for hosts without a remote backend and for tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use scribe_api::{Command, DocumentHandle, DocumentStructure, DocumentVersion, LineId, LineRecord};
use tracing::trace;

use crate::error::{BusError, StoreError};

/// One change notification from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreUpdate {
    pub document: DocumentHandle,
    pub key: LineId,
    /// New stored value, `None` when the line was removed.
    pub value: Option<LineRecord>,
}

/// Subscriber callback invoked on store changes.
pub type StoreCallback = Arc<dyn Fn(&StoreUpdate) + Send + Sync>;

/// Handle to a registered subscription, released via
/// [`DocumentStore::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// The external observable document store, keyed by document handle and
/// line identifier.
pub trait DocumentStore {
    /// Read the stored record for one line, `None` if the store holds no
    /// value under that identifier.
    fn line(
        &self,
        document: &DocumentHandle,
        id: &LineId,
    ) -> impl Future<Output = Result<Option<LineRecord>, StoreError>> + Send;

    /// Read the document's current version.
    fn version(
        &self,
        document: &DocumentHandle,
    ) -> impl Future<Output = Result<DocumentVersion, StoreError>> + Send;

    /// Fetch the full document structure.
    fn document(
        &self,
        document: &DocumentHandle,
    ) -> impl Future<Output = Result<DocumentStructure, StoreError>> + Send;

    /// Register for change notifications on a document.
    fn subscribe(
        &self,
        document: &DocumentHandle,
        callback: StoreCallback,
    ) -> Result<SubscriptionId, StoreError>;

    /// Release a subscription. Unknown ids are ignored.
    fn unsubscribe(&self, document: &DocumentHandle, subscription: SubscriptionId);
}

/// The external command bus.
pub trait CommandBus {
    /// Publish one command. Delivery semantics belong to the bus.
    fn publish(&self, command: Command) -> impl Future<Output = Result<(), BusError>> + Send;
}

// === In-memory reference implementations ===

#[derive(Default)]
struct DocumentState {
    version: DocumentVersion,
    lines: HashMap<LineId, LineRecord>,
    subscribers: HashMap<SubscriptionId, StoreCallback>,
}

#[derive(Default)]
struct MemoryStoreInner {
    documents: HashMap<DocumentHandle, DocumentState>,
    next_subscription: u64,
}

/// In-memory [`DocumentStore`] for hosts without a remote backend, and for
/// tests. Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a document with the given structure and version.
    pub fn seed(
        &self,
        document: &DocumentHandle,
        structure: &DocumentStructure,
        version: DocumentVersion,
    ) {
        let mut inner = self.inner.lock().unwrap();
        let state = inner.documents.entry(document.clone()).or_default();
        state.version = version;
        state.lines = structure
            .iter()
            .map(|record| (record.id.clone(), record.clone()))
            .collect();
    }

    /// Write one line record, notifying subscribers.
    pub fn set_line(&self, document: &DocumentHandle, record: LineRecord) {
        let update = StoreUpdate {
            document: document.clone(),
            key: record.id.clone(),
            value: Some(record.clone()),
        };
        let callbacks: Vec<StoreCallback> = {
            let mut inner = self.inner.lock().unwrap();
            let state = inner.documents.entry(document.clone()).or_default();
            state.lines.insert(record.id.clone(), record);
            state.subscribers.values().cloned().collect()
        };
        // Callbacks run outside the lock so they may read the store.
        for callback in callbacks {
            callback(&update);
        }
    }

    /// Set a document's version without touching its lines.
    pub fn set_version(&self, document: &DocumentHandle, version: DocumentVersion) {
        let mut inner = self.inner.lock().unwrap();
        inner.documents.entry(document.clone()).or_default().version = version;
    }

    /// Drop a document entirely; later reads fail with `UnknownDocument`.
    pub fn drop_document(&self, document: &DocumentHandle) {
        self.inner.lock().unwrap().documents.remove(document);
    }

    /// Number of live subscriptions on a document.
    pub fn subscriber_count(&self, document: &DocumentHandle) -> usize {
        self.inner
            .lock()
            .unwrap()
            .documents
            .get(document)
            .map(|state| state.subscribers.len())
            .unwrap_or(0)
    }

    fn with_document<T>(
        &self,
        document: &DocumentHandle,
        read: impl FnOnce(&DocumentState) -> T,
    ) -> Result<T, StoreError> {
        let inner = self.inner.lock().unwrap();
        inner
            .documents
            .get(document)
            .map(read)
            .ok_or_else(|| StoreError::UnknownDocument(document.clone()))
    }
}

impl DocumentStore for MemoryStore {
    async fn line(
        &self,
        document: &DocumentHandle,
        id: &LineId,
    ) -> Result<Option<LineRecord>, StoreError> {
        self.with_document(document, |state| state.lines.get(id).cloned())
    }

    async fn version(&self, document: &DocumentHandle) -> Result<DocumentVersion, StoreError> {
        self.with_document(document, |state| state.version)
    }

    async fn document(&self, document: &DocumentHandle) -> Result<DocumentStructure, StoreError> {
        self.with_document(document, |state| state.lines.values().cloned().collect())
    }

    fn subscribe(
        &self,
        document: &DocumentHandle,
        callback: StoreCallback,
    ) -> Result<SubscriptionId, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let id = SubscriptionId(inner.next_subscription);
        inner.next_subscription += 1;
        let state = inner
            .documents
            .get_mut(document)
            .ok_or_else(|| StoreError::UnknownDocument(document.clone()))?;
        state.subscribers.insert(id, callback);
        trace!(document = %document, subscription = id.0, "store subscription added");
        Ok(id)
    }

    fn unsubscribe(&self, document: &DocumentHandle, subscription: SubscriptionId) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(state) = inner.documents.get_mut(document) {
            state.subscribers.remove(&subscription);
            trace!(document = %document, subscription = subscription.0, "store subscription released");
        }
    }
}

/// [`CommandBus`] that records every published command, for tests and local
/// hosts.
#[derive(Clone, Default)]
pub struct RecordingBus {
    published: Arc<Mutex<Vec<Command>>>,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything published so far.
    pub fn published(&self) -> Vec<Command> {
        self.published.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.published.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.published.lock().unwrap().is_empty()
    }
}

impl CommandBus for RecordingBus {
    async fn publish(&self, command: Command) -> Result<(), BusError> {
        self.published.lock().unwrap().push(command);
        Ok(())
    }
}
