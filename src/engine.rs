use std::{
    sync::Arc,
    thread::{self, ScopedJoinHandle},
    time::Duration,
};

use crossbeam_channel::bounded;

use crate::{
    cancel::CancellationToken,
    matcher::Criterion,
    model::{PriceStats, Query, QueryResult, VehicleRecord},
    pipeline::{FaultSlot, Pipeline},
    stats::merge_sort_by_price,
    store::RecordStore,
};

/// Maximum number of suggestions in a response.
pub const SUGGESTION_LIMIT: usize = 5;

/// Errors that abort a search.
///
/// An empty match set is not an error; it produces a zeroed [`QueryResult`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The token fired (by the caller or a deadline) before every pass finished
    Cancelled,

    /// A stage resolved an index outside the list it reads from
    IndexOutOfRange { index: usize, len: usize },

    /// An aggregation thread panicked
    StagePanicked(&'static str),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Cancelled => write!(f, "Search cancelled before completion"),
            EngineError::IndexOutOfRange { index, len } => {
                write!(f, "Index {} out of range for {} records", index, len)
            }
            EngineError::StagePanicked(stage) => write!(f, "Pipeline stage '{}' panicked", stage),
        }
    }
}

impl std::error::Error for EngineError {}

/// The search engine.
///
/// Runs each query as an isolated set of pipelines over a shared, read-only
/// [`RecordStore`]. Three passes produce the response:
///
/// 1. **OR total** - vehicles matching any present facet
/// 2. **Budget** - price statistics and distinct-make suggestions over the
///    records inside the budget band (skipped without a budget)
/// 3. **AND total** - vehicles matching both make and model (skipped when
///    neither is given)
///
/// Passes 1 and 3 aggregate on their own threads while pass 2 runs on the
/// calling thread.
#[derive(Debug, Clone, Copy)]
pub struct Engine<'s> {
    store: &'s RecordStore,
}

impl<'s> Engine<'s> {
    pub fn new(store: &'s RecordStore) -> Self {
        Engine { store }
    }

    pub fn store(&self) -> &'s RecordStore {
        self.store
    }

    /// Runs a query to completion.
    ///
    /// # Examples
    ///
    /// ```
    /// use carserv::{Engine, Query, RecordStore};
    ///
    /// let engine = Engine::new(RecordStore::embedded().unwrap());
    /// let result = engine.search(Query::new().with_make("Ford").with_model("Van")).unwrap();
    ///
    /// assert_eq!(result.total_vehicles, 64201);
    /// assert_eq!(result.make_model_total_vehicles, 16);
    /// assert!(result.suggestions.is_empty());
    /// ```
    pub fn search(&self, query: Query) -> Result<QueryResult, EngineError> {
        self.search_with(query, CancellationToken::new(), None)
    }

    /// Runs a query under a caller-owned token and an optional deadline.
    ///
    /// The token may be fired from another thread at any time. If it fires
    /// before every pass has finished, the partial response is discarded and
    /// [`EngineError::Cancelled`] is returned.
    pub fn search_with(
        &self,
        query: Query,
        token: CancellationToken,
        deadline: Option<Duration>,
    ) -> Result<QueryResult, EngineError> {
        if token.is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        let (finished, finished_rx) = bounded::<()>(0);
        let watchdog = deadline.map(|timeout| token.cancel_after(timeout, finished_rx));
        let faults = FaultSlot::default();

        let (outcome, cancelled) = thread::scope(|scope| {
            let pipeline = Pipeline::new(scope, self.store, token.clone(), Arc::clone(&faults));
            let outcome = self.run_passes(&pipeline, &query);
            // A deadline that fires after every pass has finished does not
            // void the result.
            let cancelled = token.is_cancelled();
            drop(finished);
            (outcome, cancelled)
        });

        if let Some(watchdog) = watchdog {
            if watchdog.join().is_err() {
                tracing::warn!("deadline watchdog panicked");
            }
        }

        if let Some(fault) = faults.get() {
            return Err(fault.clone());
        }
        let result = outcome?;
        if cancelled {
            tracing::warn!(?query, "search cancelled, discarding partial result");
            return Err(EngineError::Cancelled);
        }

        tracing::info!(
            total_vehicles = result.total_vehicles,
            make_model_total_vehicles = result.make_model_total_vehicles,
            suggestions = result.suggestions.len(),
            "search finished"
        );
        Ok(result)
    }

    fn run_passes<'scope, 'env>(
        &self,
        pipeline: &Pipeline<'scope, 'env>,
        query: &'env Query,
    ) -> Result<QueryResult, EngineError> {
        let size = self.store.len();
        tracing::debug!(?query, records = size, "starting search");

        let total = pipeline.sum_counts(pipeline.filter_any(pipeline.generate(size), query));

        let make_model = if query.has_make() || query.has_model() {
            let makes = pipeline.filter(pipeline.generate(size), Criterion::Make(&query.make));
            let models = pipeline.filter(makes, Criterion::Model(&query.model));
            Some(pipeline.sum_counts(models))
        } else {
            None
        };

        let mut result = QueryResult::default();
        if query.has_budget() {
            let (stats, suggestions) = self.budget_pass(pipeline, query)?;
            result.set_stats(stats);
            result.suggestions = suggestions;
        }

        result.total_vehicles = join(total, "or-total")?;
        result.make_model_total_vehicles = match make_model {
            Some(handle) => join(handle, "make-model-total")?,
            None => 0,
        };

        tracing::debug!(
            total_vehicles = result.total_vehicles,
            make_model_total_vehicles = result.make_model_total_vehicles,
            "aggregation passes finished"
        );
        Ok(result)
    }

    fn budget_pass<'scope, 'env>(
        &self,
        pipeline: &Pipeline<'scope, 'env>,
        query: &'env Query,
    ) -> Result<(PriceStats, Vec<VehicleRecord>), EngineError> {
        let in_band = pipeline.filter(
            pipeline.generate(self.store.len()),
            Criterion::Budget(query.budget),
        );
        let matched = pipeline.resolve(in_band)?;

        let sorted: Arc<[&'env VehicleRecord]> = merge_sort_by_price(&matched).into();
        let stats = PriceStats::from_sorted(&sorted);
        tracing::debug!(matched = sorted.len(), ?stats, "budget band resolved");

        let positions = pipeline.generate(sorted.len());
        let distinct = pipeline.distinct_make(positions, Arc::clone(&sorted));
        let picks = pipeline.take(distinct, SUGGESTION_LIMIT);

        let mut suggestions = Vec::with_capacity(SUGGESTION_LIMIT);
        for index in picks {
            let record = sorted.get(index).ok_or(EngineError::IndexOutOfRange {
                index,
                len: sorted.len(),
            })?;
            suggestions.push((*record).clone());
        }

        Ok((stats, suggestions))
    }
}

fn join<T>(
    handle: ScopedJoinHandle<'_, Result<T, EngineError>>,
    stage: &'static str,
) -> Result<T, EngineError> {
    handle.join().map_err(|_| EngineError::StagePanicked(stage))?
}
