//! Streaming index pipeline.
//!
//! A search is a handful of linear pipelines over record indices. Every stage
//! runs on its own scoped thread and hands indices downstream through a
//! zero-capacity channel, so a slow consumer stalls its producer and index
//! order is preserved end to end.
//!
//! ## Shutdown
//!
//! A stage stops when any of these happens:
//!
//! - its upstream ends (the upstream sender was dropped)
//! - its downstream goes away (the receiver was dropped, e.g. by [`Pipeline::take`])
//! - the shared [`CancellationToken`] fires
//!
//! Stages drop their sender on exit, so the end of a stream always travels
//! downstream to the terminal consumer.
//!
//! ## Example
//!
//! ```
//! use carserv::{CancellationToken, Pipeline, Query, RecordStore};
//! use carserv::matcher::Criterion;
//! use std::{sync::Arc, thread};
//!
//! let store = RecordStore::embedded().unwrap();
//! let query = Query::new().with_make("Ford");
//! let fords: Vec<usize> = thread::scope(|scope| {
//!     let pipeline = Pipeline::new(scope, store, CancellationToken::new(), Arc::default());
//!     let matches = pipeline.filter(pipeline.generate(store.len()), Criterion::Make(&query.make));
//!     matches.collect()
//! });
//! assert_eq!(fords.len(), 5);
//! ```

use std::{
    collections::{HashMap, hash_map::Entry},
    sync::{Arc, OnceLock},
    thread::{Scope, ScopedJoinHandle},
};

use crossbeam_channel::{Receiver, Sender, bounded, select};

use crate::{
    cancel::CancellationToken,
    engine::EngineError,
    matcher::{self, Criterion},
    model::{Query, VehicleRecord},
    store::RecordStore,
};

/// First invariant violation raised by any stage of one search.
pub type FaultSlot = Arc<OnceLock<EngineError>>;

/// Lazy, ordered stream of indices produced by an upstream stage.
///
/// Iteration ends when the upstream stage finishes or the token fires.
#[derive(Debug)]
pub struct IndexStream {
    rx: Receiver<usize>,
    done: Receiver<()>,
}

impl Iterator for IndexStream {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        select! {
            recv(self.rx) -> msg => msg.ok(),
            recv(self.done) -> _ => None,
        }
    }
}

/// Make -> first emitted index, local to one distinct-brand stage.
#[derive(Debug, Default)]
pub struct DistinctMakes<'a> {
    first_seen: HashMap<&'a str, usize>,
}

impl<'a> DistinctMakes<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `make` at `index` and returns `true` if the make is new.
    pub fn admit(&mut self, make: &'a str, index: usize) -> bool {
        match self.first_seen.entry(make) {
            Entry::Vacant(slot) => {
                slot.insert(index);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn first_index(&self, make: &str) -> Option<usize> {
        self.first_seen.get(make).copied()
    }

    pub fn len(&self) -> usize {
        self.first_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first_seen.is_empty()
    }
}

/// Stage factory bound to one thread scope, one store and one token.
pub struct Pipeline<'scope, 'env: 'scope> {
    scope: &'scope Scope<'scope, 'env>,
    store: &'env RecordStore,
    token: CancellationToken,
    faults: FaultSlot,
}

impl<'scope, 'env> Pipeline<'scope, 'env> {
    pub fn new(
        scope: &'scope Scope<'scope, 'env>,
        store: &'env RecordStore,
        token: CancellationToken,
        faults: FaultSlot,
    ) -> Self {
        Pipeline {
            scope,
            store,
            token,
            faults,
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Indices `0..size` in ascending order.
    pub fn generate(&self, size: usize) -> IndexStream {
        self.spawn_stage("generate", move |tx, token, _| {
            for index in 0..size {
                if token.is_cancelled() || !emit(tx, token, index) {
                    return;
                }
            }
        })
    }

    /// Keeps indices whose record satisfies `criterion`.
    ///
    /// An absent criterion returns `upstream` untouched without spawning a
    /// stage.
    pub fn filter(&self, upstream: IndexStream, criterion: Criterion<'env>) -> IndexStream {
        if criterion.is_absent() {
            return upstream;
        }
        self.filter_by(upstream, criterion.name(), move |record| criterion.matches(record))
    }

    /// Keeps indices whose record satisfies any present facet of `query`.
    pub fn filter_any(&self, upstream: IndexStream, query: &'env Query) -> IndexStream {
        self.filter_by(upstream, "any", move |record| matcher::any_match(record, query))
    }

    /// Generic filter stage over store indices.
    pub fn filter_by<P>(&self, upstream: IndexStream, name: &'static str, predicate: P) -> IndexStream
    where
        P: Fn(&VehicleRecord) -> bool + Send + 'scope,
    {
        let store = self.store;
        self.spawn_stage(name, move |tx, token, faults| {
            for index in upstream {
                if token.is_cancelled() {
                    return;
                }
                let Some(record) = store.get(index) else {
                    raise(faults, token, EngineError::IndexOutOfRange { index, len: store.len() });
                    return;
                };
                if predicate(record) && !emit(tx, token, index) {
                    return;
                }
            }
        })
    }

    /// Keeps the first index of each make in `candidates`.
    ///
    /// `upstream` yields positions into `candidates`, not store indices.
    pub fn distinct_make(
        &self,
        upstream: IndexStream,
        candidates: Arc<[&'env VehicleRecord]>,
    ) -> IndexStream {
        self.spawn_stage("distinct_make", move |tx, token, faults| {
            let mut seen = DistinctMakes::new();
            for index in upstream {
                if token.is_cancelled() {
                    return;
                }
                let Some(&record) = candidates.get(index) else {
                    raise(faults, token, EngineError::IndexOutOfRange { index, len: candidates.len() });
                    return;
                };
                if seen.admit(&record.make, index) && !emit(tx, token, index) {
                    return;
                }
            }
        })
    }

    /// Forwards at most `limit` indices, then ends the stream.
    ///
    /// The token is left alone; dropping the upstream receiver is enough to
    /// stop the stages feeding this one.
    pub fn take(&self, upstream: IndexStream, limit: usize) -> IndexStream {
        self.spawn_stage("take", move |tx, token, _| {
            for index in upstream.take(limit) {
                if !emit(tx, token, index) {
                    return;
                }
            }
        })
    }

    /// Sums `count` over the stream on a separate thread.
    pub fn sum_counts(&self, stream: IndexStream) -> ScopedJoinHandle<'scope, Result<u64, EngineError>> {
        let store = self.store;
        let token = self.token.clone();
        let faults = Arc::clone(&self.faults);
        self.scope.spawn(move || {
            let mut total = 0u64;
            for index in stream {
                match store.get(index) {
                    Some(record) => total += record.count,
                    None => {
                        return Err(raise(
                            &faults,
                            &token,
                            EngineError::IndexOutOfRange { index, len: store.len() },
                        ));
                    }
                }
            }
            Ok(total)
        })
    }

    /// Drains the stream on the calling thread into store records.
    pub fn resolve(&self, stream: IndexStream) -> Result<Vec<&'env VehicleRecord>, EngineError> {
        let mut records = Vec::new();
        for index in stream {
            let record = self.store.get(index).ok_or_else(|| {
                raise(
                    &self.faults,
                    &self.token,
                    EngineError::IndexOutOfRange { index, len: self.store.len() },
                )
            })?;
            records.push(record);
        }
        Ok(records)
    }

    fn spawn_stage<F>(&self, name: &'static str, body: F) -> IndexStream
    where
        F: FnOnce(&Sender<usize>, &CancellationToken, &FaultSlot) + Send + 'scope,
    {
        let (tx, rx) = bounded(0);
        let token = self.token.clone();
        let faults = Arc::clone(&self.faults);
        self.scope.spawn(move || {
            tracing::trace!(stage = name, "stage started");
            body(&tx, &token, &faults);
            tracing::trace!(stage = name, cancelled = token.is_cancelled(), "stage finished");
        });
        IndexStream {
            rx,
            done: self.token.done().clone(),
        }
    }
}

/// Hands `index` downstream. Returns `false` if the consumer is gone or the
/// token fired while waiting.
fn emit(tx: &Sender<usize>, token: &CancellationToken, index: usize) -> bool {
    select! {
        send(tx, index) -> res => res.is_ok(),
        recv(token.done()) -> _ => false,
    }
}

/// Records the first fault of the search and stops every stage.
fn raise(faults: &FaultSlot, token: &CancellationToken, error: EngineError) -> EngineError {
    tracing::warn!(%error, "pipeline invariant violated");
    let _ = faults.set(error.clone());
    token.cancel();
    error
}
