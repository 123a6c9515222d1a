use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::registry::{Registry, RunHandle};
use crate::repository::RepositoryClient;
use crate::status::{AnalysisStatus, AnalysisStep, ItemFailure};
use repochat_code_chunker::Segmenter;
use repochat_extractor::{AnnotatedDocument, Extractor};
use repochat_graph::{DependencyGraph, GraphBuilder};
use repochat_vector_store::{StoreOutcome, VectorIndex, VectorStoreGateway};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

/// Drives fetch → parse → dependency graph → vector storage for one repository at a time
/// per id, publishing progress into the shared [`Registry`]
pub struct Orchestrator {
    config: PipelineConfig,
    repository: Arc<dyn RepositoryClient>,
    extractor: Arc<Extractor>,
    graph_builder: GraphBuilder,
    gateway: VectorStoreGateway,
    registry: Arc<Registry>,
}

impl Orchestrator {
    pub fn new(
        config: PipelineConfig,
        repository: Arc<dyn RepositoryClient>,
        index: Arc<dyn VectorIndex>,
    ) -> Result<Self> {
        config.validate()?;

        let segmenter = Segmenter::new(config.segmenter)?;
        let gateway = VectorStoreGateway::new(index, segmenter, config.search)?;
        let registry = Arc::new(Registry::new(
            config.status_ttl(),
            config.max_tracked_analyses,
        ));

        Ok(Self {
            extractor: Arc::new(Extractor::new(config.extractor.clone())),
            graph_builder: GraphBuilder::new(),
            config,
            repository,
            gateway,
            registry,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Gateway shared with the chat service
    #[must_use]
    pub fn gateway(&self) -> &VectorStoreGateway {
        &self.gateway
    }

    /// Start an analysis in the background and return immediately
    pub fn trigger(self: &Arc<Self>, repository_id: &str) -> Result<watch::Receiver<AnalysisStatus>> {
        let handle = self.registry.begin(repository_id)?;
        let updates = handle.subscribe();

        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.execute(handle).await;
        });

        Ok(updates)
    }

    /// Run an analysis to its terminal state
    pub async fn analyze(&self, repository_id: &str) -> Result<AnalysisStatus> {
        let handle = self.registry.begin(repository_id)?;
        Ok(self.execute(handle).await)
    }

    pub fn status(&self, repository_id: &str) -> AnalysisStatus {
        self.registry.status(repository_id)
    }

    /// Completion notifications for the latest run of `repository_id`
    pub fn subscribe(&self, repository_id: &str) -> Option<watch::Receiver<AnalysisStatus>> {
        self.registry.subscribe(repository_id)
    }

    /// Dependency graph of the latest run; empty when not computed yet
    pub fn graph(&self, repository_id: &str) -> Arc<DependencyGraph> {
        self.registry.graph(repository_id).unwrap_or_default()
    }

    /// Display names of the files `file_path` depends on, in `repository_id`'s graph
    pub fn file_dependencies(&self, repository_id: &str, file_path: &str) -> Vec<String> {
        self.registry
            .graph(repository_id)
            .map(|graph| graph.dependencies_of(file_path))
            .unwrap_or_default()
    }

    /// Ask a running analysis to stop; false if none is running
    pub fn cancel(&self, repository_id: &str) -> bool {
        let cancelled = self.registry.cancel(repository_id);
        if cancelled {
            log::info!("Cancellation requested for repository: {repository_id}");
        }
        cancelled
    }

    async fn execute(&self, handle: RunHandle) -> AnalysisStatus {
        let id = handle.id().to_string();
        match self.run_stages(&handle).await {
            Ok(()) => {
                log::info!("Repository analysis completed successfully for project: {id}");
                handle.complete()
            }
            Err(err) => {
                let err = err.normalize();
                log::error!("Repository analysis failed for project: {id}: {err}");
                handle.fail(err.to_string())
            }
        }
    }

    async fn run_stages(&self, handle: &RunHandle) -> Result<()> {
        let id = handle.id().to_string();
        let cancel = handle.cancel_token().clone();

        // Step 1: Fetch repository files
        handle.enter(AnalysisStep::FetchingFiles);
        let repository = Arc::clone(&self.repository);
        let files = self
            .stage(handle, AnalysisStep::FetchingFiles, async {
                repository
                    .fetch_files(&id)
                    .await
                    .map_err(|e| PipelineError::Fetch {
                        repository: id.clone(),
                        cause: format!("{e:#}"),
                    })
            })
            .await?;
        handle.advance(AnalysisStep::FetchingFiles);

        // Step 2: Parse syntax trees
        handle.enter(AnalysisStep::ParsingAst);
        let extractor = Arc::clone(&self.extractor);
        let interrupt = cancel.clone();
        let report = self
            .stage(
                handle,
                AnalysisStep::ParsingAst,
                blocking(move || {
                    extractor
                        .extract_all_until(&files, || interrupt.is_cancelled())
                        .map_err(PipelineError::from)
                }),
            )
            .await?;
        handle.record_failures(
            report
                .failures
                .iter()
                .map(|err| ItemFailure {
                    file_path: err.path().unwrap_or_default().to_string(),
                    stage: AnalysisStep::ParsingAst,
                    message: err.to_string(),
                })
                .collect(),
        );
        let documents: Arc<Vec<AnnotatedDocument>> = Arc::new(report.documents);
        handle.advance(AnalysisStep::ParsingAst);

        // Step 3: Analyze dependencies
        handle.enter(AnalysisStep::AnalyzingDependencies);
        let builder = self.graph_builder;
        let docs = Arc::clone(&documents);
        let built = self
            .stage(
                handle,
                AnalysisStep::AnalyzingDependencies,
                blocking(move || builder.build(&docs).map_err(PipelineError::from)),
            )
            .await?;
        handle.record_failures(
            built
                .duplicates
                .into_iter()
                .map(|file_path| ItemFailure {
                    file_path,
                    stage: AnalysisStep::AnalyzingDependencies,
                    message: "duplicate file path; first occurrence kept".to_string(),
                })
                .collect(),
        );
        handle.store_graph(Arc::new(built.graph));
        handle.advance(AnalysisStep::AnalyzingDependencies);

        // Step 4: Chunk and store vectors
        handle.enter(AnalysisStep::StoringVectors);
        let stored = self
            .stage(handle, AnalysisStep::StoringVectors, async {
                self.gateway
                    .store_documents(&documents, &cancel)
                    .await
                    .map_err(PipelineError::from)
            })
            .await?;
        handle.record_failures(
            stored
                .documents
                .into_iter()
                .filter_map(|doc| match doc.outcome {
                    StoreOutcome::Failed { error } => Some(ItemFailure {
                        file_path: doc.file_path,
                        stage: AnalysisStep::StoringVectors,
                        message: error,
                    }),
                    StoreOutcome::Stored { .. } | StoreOutcome::Skipped => None,
                })
                .collect(),
        );
        handle.advance(AnalysisStep::StoringVectors);

        Ok(())
    }

    /// Run one stage under the stage deadline, racing the run's cancellation token
    async fn stage<T>(
        &self,
        handle: &RunHandle,
        step: AnalysisStep,
        work: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let timeout = self.config.stage_timeout();
        tokio::select! {
            biased;
            () = handle.cancel_token().cancelled() => Err(PipelineError::Cancelled),
            outcome = tokio::time::timeout(timeout, work) => match outcome {
                Ok(result) => result,
                Err(_) => {
                    // Stop blocking work still polling the token
                    handle.cancel_token().cancel();
                    Err(PipelineError::Timeout {
                        step,
                        secs: timeout.as_secs(),
                    })
                }
            },
        }
    }
}

/// Run CPU-bound work on the blocking pool
async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| PipelineError::Join(e.to_string()))?
}
