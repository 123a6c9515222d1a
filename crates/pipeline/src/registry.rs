use crate::error::{PipelineError, Result};
use crate::status::{AnalysisStatus, AnalysisStep, ItemFailure};
use repochat_graph::DependencyGraph;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

struct AnalysisRecord {
    generation: u64,
    status: watch::Sender<AnalysisStatus>,
    graph: Option<Arc<DependencyGraph>>,
    cancel: CancellationToken,
    finished_at: Option<Instant>,
}

impl AnalysisRecord {
    const fn is_running(&self) -> bool {
        self.finished_at.is_none()
    }
}

#[derive(Default)]
struct RegistryState {
    records: HashMap<String, AnalysisRecord>,
    next_generation: u64,
}

/// Process-wide analysis records keyed by repository id.
///
/// A record is created when a run begins and becomes read-only once the run finishes.
/// Finished records expire after `ttl`; beyond `capacity` finished records the oldest
/// are dropped. Running records are never evicted.
pub struct Registry {
    state: Mutex<RegistryState>,
    ttl: Duration,
    capacity: usize,
}

impl Registry {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
            ttl,
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a new run for `id`, replacing any finished record wholesale
    pub fn begin(self: &Arc<Self>, id: &str) -> Result<RunHandle> {
        let mut state = self.lock();
        self.evict(&mut state);

        if state.records.get(id).is_some_and(AnalysisRecord::is_running) {
            return Err(PipelineError::AlreadyRunning(id.to_string()));
        }

        state.next_generation += 1;
        let generation = state.next_generation;
        let (status, _) = watch::channel(AnalysisStatus::default());
        let cancel = CancellationToken::new();

        state.records.insert(
            id.to_string(),
            AnalysisRecord {
                generation,
                status: status.clone(),
                graph: None,
                cancel: cancel.clone(),
                finished_at: None,
            },
        );

        Ok(RunHandle {
            id: id.to_string(),
            generation,
            status,
            cancel,
            registry: Arc::clone(self),
            closed: false,
        })
    }

    /// Current status; `NOT_STARTED` for an unknown or evicted id
    pub fn status(&self, id: &str) -> AnalysisStatus {
        let mut state = self.lock();
        self.evict(&mut state);
        state
            .records
            .get(id)
            .map(|record| record.status.borrow().clone())
            .unwrap_or_default()
    }

    /// Change notifications for `id`'s current record
    pub fn subscribe(&self, id: &str) -> Option<watch::Receiver<AnalysisStatus>> {
        let mut state = self.lock();
        self.evict(&mut state);
        state.records.get(id).map(|record| record.status.subscribe())
    }

    /// Dependency graph of the latest run, once computed
    pub fn graph(&self, id: &str) -> Option<Arc<DependencyGraph>> {
        let mut state = self.lock();
        self.evict(&mut state);
        state.records.get(id).and_then(|record| record.graph.clone())
    }

    /// Signal a running analysis to stop; false if nothing is running for `id`
    pub fn cancel(&self, id: &str) -> bool {
        let state = self.lock();
        match state.records.get(id) {
            Some(record) if record.is_running() => {
                record.cancel.cancel();
                true
            }
            _ => false,
        }
    }

    /// Number of tracked records, running included
    pub fn len(&self) -> usize {
        let mut state = self.lock();
        self.evict(&mut state);
        state.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn evict(&self, state: &mut RegistryState) {
        let now = Instant::now();
        let ttl = self.ttl;
        state.records.retain(|id, record| match record.finished_at {
            Some(finished) if now.duration_since(finished) >= ttl => {
                log::debug!("Evicting expired analysis record {id}");
                false
            }
            _ => true,
        });

        let mut finished: Vec<(Instant, String)> = state
            .records
            .iter()
            .filter_map(|(id, record)| record.finished_at.map(|at| (at, id.clone())))
            .collect();
        if finished.len() <= self.capacity {
            return;
        }

        finished.sort();
        let excess = finished.len() - self.capacity;
        for (_, id) in finished.into_iter().take(excess) {
            log::debug!("Evicting analysis record {id} (capacity {})", self.capacity);
            state.records.remove(&id);
        }
    }

    fn store_graph(&self, id: &str, generation: u64, graph: Arc<DependencyGraph>) {
        let mut state = self.lock();
        if let Some(record) = state.records.get_mut(id) {
            if record.generation == generation {
                record.graph = Some(graph);
            }
        }
    }

    fn finish(&self, id: &str, generation: u64) {
        let mut state = self.lock();
        if let Some(record) = state.records.get_mut(id) {
            if record.generation == generation {
                record.finished_at = Some(Instant::now());
            }
        }
        self.evict(&mut state);
    }
}

/// Write side of one run's status record; the only writer for its lifetime
pub struct RunHandle {
    id: String,
    generation: u64,
    status: watch::Sender<AnalysisStatus>,
    cancel: CancellationToken,
    registry: Arc<Registry>,
    closed: bool,
}

impl RunHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn subscribe(&self) -> watch::Receiver<AnalysisStatus> {
        self.status.subscribe()
    }

    pub fn snapshot(&self) -> AnalysisStatus {
        self.status.borrow().clone()
    }

    pub(crate) fn enter(&self, step: AnalysisStep) {
        self.status.send_modify(|status| status.current_step = step);
    }

    /// Record the progress reached by finishing `step`
    pub(crate) fn advance(&self, step: AnalysisStep) {
        self.status.send_modify(|status| {
            status.progress = status.progress.max(step.completed_progress());
        });
    }

    pub(crate) fn record_failures(&self, failures: Vec<ItemFailure>) {
        if failures.is_empty() {
            return;
        }
        self.status
            .send_modify(|status| status.failures.extend(failures));
    }

    pub(crate) fn store_graph(&self, graph: Arc<DependencyGraph>) {
        self.registry.store_graph(&self.id, self.generation, graph);
    }

    pub(crate) fn complete(self) -> AnalysisStatus {
        self.status.send_modify(|status| {
            status.current_step = AnalysisStep::Completed;
            status.progress = AnalysisStep::Completed.completed_progress();
            status.success = true;
        });
        self.close()
    }

    /// Record `error` at the current step; progress keeps its last value
    pub(crate) fn fail(self, error: String) -> AnalysisStatus {
        self.status.send_modify(|status| {
            status.error = Some(error);
            status.success = false;
        });
        self.close()
    }

    fn close(mut self) -> AnalysisStatus {
        self.closed = true;
        self.cancel.cancel();
        let status = self.snapshot();
        self.registry.finish(&self.id, self.generation);
        status
    }
}

impl Drop for RunHandle {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        // Owning task went away mid-run
        self.cancel.cancel();
        self.status.send_modify(|status| {
            if status.error.is_none() && status.current_step != AnalysisStep::Completed {
                status.error = Some("analysis aborted".to_string());
                status.success = false;
            }
        });
        self.registry.finish(&self.id, self.generation);
    }
}
