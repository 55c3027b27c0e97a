//! Pipeline orchestrator: the linear three-stage state machine.
//!
//! ```text
//! Idle --run(url)--> Extracting --ok--> Enriching --ok--> Synthesizing --ok--> Done
//!                        |                  |                   |
//!                        +------failure-----+-------------------+--> Failed
//! ```
//!
//! Stages execute strictly one after another on the caller's task; the only
//! exits from an in-flight stage are success, a remote-reported error, or
//! timeout expiry. Partial results commit to the store as each stage
//! completes and are never rolled back by a later failure.

use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use leadscout_gateway::AgentGateway;
use leadscout_shared::{AppConfig, LeadScoutError, Result, StageToken};

use crate::store::ResultStore;

// ---------------------------------------------------------------------------
// PipelineStage
// ---------------------------------------------------------------------------

/// Where the pipeline currently is. Transitions are driven only by the
/// orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    Extracting,
    Enriching,
    Synthesizing,
    Done,
    Failed,
}

impl PipelineStage {
    /// Whether a new run may start from this stage.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Idle | Self::Done | Self::Failed)
    }

    /// Short human-readable label for progress surfaces.
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Extracting => "Extracting leads",
            Self::Enriching => "Enriching & scoring",
            Self::Synthesizing => "Synthesizing strategy",
            Self::Done => "Done",
            Self::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Observer callback for pipeline progress.
pub trait ProgressReporter: Send + Sync {
    /// Called when the pipeline enters a new stage.
    fn stage(&self, stage: PipelineStage);
    /// Called when a stage commits records to the store.
    fn leads_committed(&self, count: usize);
    /// Called when the pipeline completes successfully.
    fn done(&self, summary: &RunSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn stage(&self, _stage: PipelineStage) {}
    fn leads_committed(&self, _count: usize) {}
    fn done(&self, _summary: &RunSummary) {}
}

// ---------------------------------------------------------------------------
// Options & summary
// ---------------------------------------------------------------------------

/// Runtime pipeline behavior.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Whether the synthesis stage makes its bulk network call. Disabled,
    /// the pipeline still transitions through `Synthesizing` so observers
    /// see the same three-stage sequence.
    pub bulk_synthesis: bool,
    /// Minimum time a completed stage is held before auto-advancing, so a
    /// progress observer can render each transition. Zero for headless use.
    pub stage_dwell: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            bulk_synthesis: false,
            stage_dwell: Duration::from_millis(500),
        }
    }
}

impl From<&AppConfig> for PipelineOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            bulk_synthesis: config.pipeline.bulk_synthesis,
            stage_dwell: Duration::from_millis(config.pipeline.stage_dwell_ms),
        }
    }
}

/// Outcome of a completed pipeline run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Number of leads in the final working set.
    pub lead_count: usize,
    /// Whether bulk synthesis actually ran.
    pub synthesized: bool,
    /// Total elapsed time.
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Sequential driver for the extract → enrich → synthesize pipeline.
///
/// Owns the [`ResultStore`] and [`PipelineStage`] for writes; observers get
/// read access between and after runs. There is no cancellation mid-run.
pub struct Orchestrator {
    gateway: AgentGateway,
    options: PipelineOptions,
    store: ResultStore,
    stage: PipelineStage,
    token: Option<StageToken>,
    last_error: Option<String>,
}

impl Orchestrator {
    pub fn new(gateway: AgentGateway, options: PipelineOptions) -> Self {
        Self {
            gateway,
            options,
            store: ResultStore::new(),
            stage: PipelineStage::Idle,
            token: None,
            last_error: None,
        }
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// Human-readable message from the last failed run, distinguishing
    /// "no leads found" from transport/remote failures.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Run the full pipeline for one source URL.
    ///
    /// Refused with [`LeadScoutError::Busy`] unless the previous run reached
    /// a terminal stage. Starting a run clears the previous token; displayed
    /// records are replaced only when this run's extraction commits.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn run(
        &mut self,
        url: &str,
        progress: &dyn ProgressReporter,
    ) -> Result<RunSummary> {
        if !self.stage.is_terminal() {
            return Err(LeadScoutError::Busy);
        }

        // A token from one run must never resume another.
        self.token = None;
        self.last_error = None;

        let start = Instant::now();
        info!("starting pipeline run");

        match self.run_stages(url, progress).await {
            Ok(mut summary) => {
                summary.elapsed = start.elapsed();
                self.set_stage(PipelineStage::Done, progress);
                progress.done(&summary);
                info!(
                    lead_count = summary.lead_count,
                    synthesized = summary.synthesized,
                    elapsed_ms = summary.elapsed.as_millis(),
                    "pipeline run complete"
                );
                Ok(summary)
            }
            Err(e) => {
                // Data committed by completed stages of this run stays put.
                self.last_error = Some(e.to_string());
                self.set_stage(PipelineStage::Failed, progress);
                warn!(error = %e, "pipeline run failed");
                Err(e)
            }
        }
    }

    async fn run_stages(
        &mut self,
        url: &str,
        progress: &dyn ProgressReporter,
    ) -> Result<RunSummary> {
        // --- Stage 1: extraction ---
        self.set_stage(PipelineStage::Extracting, progress);
        let extraction = self.gateway.extract(url).await?;
        let token = extraction.token.clone();

        // Commit immediately: partial results are visible before stage 2.
        self.store
            .replace_all(extraction.records, extraction.export_links);
        self.token = Some(extraction.token);
        progress.leads_committed(self.store.len());
        self.dwell().await;

        // --- Stage 2: enrichment (long timeout lives in the gateway) ---
        self.set_stage(PipelineStage::Enriching, progress);
        let enrichment = self.gateway.enrich(&token).await?;
        self.store
            .replace_enriched(enrichment.records, enrichment.export_links);
        progress.leads_committed(self.store.len());

        // --- Stage 3: bulk synthesis (config-gated, one state machine) ---
        self.set_stage(PipelineStage::Synthesizing, progress);
        let synthesized = if self.options.bulk_synthesis {
            let plan = self.gateway.synthesize_bulk(&token).await?;
            self.store.replace_enriched(plan.records, plan.export_links);
            progress.leads_committed(self.store.len());
            true
        } else {
            // No network call, but hold the stage so the transition is
            // independently observable.
            self.dwell().await;
            false
        };

        Ok(RunSummary {
            lead_count: self.store.len(),
            synthesized,
            elapsed: Duration::ZERO,
        })
    }

    fn set_stage(&mut self, stage: PipelineStage, progress: &dyn ProgressReporter) {
        self.stage = stage;
        progress.stage(stage);
    }

    async fn dwell(&self) {
        if !self.options.stage_dwell.is_zero() {
            tokio::time::sleep(self.options.stage_dwell).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use leadscout_shared::GatewayConfig;

    use super::*;

    /// Observer that records every callback for assertion.
    #[derive(Default)]
    struct RecordingProgress {
        stages: Mutex<Vec<PipelineStage>>,
        commits: Mutex<Vec<usize>>,
    }

    impl ProgressReporter for RecordingProgress {
        fn stage(&self, stage: PipelineStage) {
            self.stages.lock().unwrap().push(stage);
        }
        fn leads_committed(&self, count: usize) {
            self.commits.lock().unwrap().push(count);
        }
        fn done(&self, _summary: &RunSummary) {}
    }

    fn orchestrator_for(server: &MockServer, bulk: bool) -> Orchestrator {
        let gateway = AgentGateway::new(&GatewayConfig {
            base_url: server.uri(),
            extract_timeout_secs: 5,
            enrich_timeout_secs: 5,
            strategy_timeout_secs: 5,
        })
        .expect("build gateway");

        Orchestrator::new(
            gateway,
            PipelineOptions {
                bulk_synthesis: bulk,
                stage_dwell: Duration::ZERO,
            },
        )
    }

    async fn mount_extract(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/scrape"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "filename": "f1",
                "data": [
                    {"Company": "Acme", "Logo_Url": "https://acme.example/logo.png",
                     "Source": "Sponsor Banner"},
                    {"Company": "Globex"}
                ]
            })))
            .mount(server)
            .await;
    }

    async fn mount_enrich(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/validate"))
            .and(body_partial_json(serde_json::json!({"filename": "f1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {"Company": "Acme", "Fit_Score": 3},
                    {"Company": "Globex", "Fit_Score": 9}
                ],
                "download_url": "/download/f2"
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn successful_run_visits_stages_in_order() {
        let server = MockServer::start().await;
        mount_extract(&server).await;
        mount_enrich(&server).await;

        let progress = RecordingProgress::default();
        let mut orch = orchestrator_for(&server, false);

        let summary = orch
            .run("https://example.com/sponsors", &progress)
            .await
            .unwrap();

        assert_eq!(
            *progress.stages.lock().unwrap(),
            vec![
                PipelineStage::Extracting,
                PipelineStage::Enriching,
                PipelineStage::Synthesizing,
                PipelineStage::Done,
            ]
        );
        assert_eq!(orch.stage(), PipelineStage::Done);
        assert_eq!(summary.lead_count, 2);
        assert!(!summary.synthesized);
        // Stage 1 committed 2 records, stage 2 recommitted 2.
        assert_eq!(*progress.commits.lock().unwrap(), vec![2, 2]);
    }

    #[tokio::test]
    async fn enrichment_reorders_by_fit_score() {
        let server = MockServer::start().await;
        mount_extract(&server).await;
        mount_enrich(&server).await;

        let mut orch = orchestrator_for(&server, false);
        orch.run("https://example.com/sponsors", &SilentProgress)
            .await
            .unwrap();

        let companies: Vec<&str> = orch
            .store()
            .records()
            .iter()
            .map(|r| r.company.as_str())
            .collect();
        assert_eq!(companies, vec!["Globex", "Acme"]);
        // Stage-2 links superseded the token-derived stage-1 links.
        assert!(
            orch.store()
                .export_links()
                .basic
                .as_deref()
                .unwrap()
                .ends_with("/download/f2")
        );
    }

    #[tokio::test]
    async fn empty_extraction_fails_without_calling_enrich() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/scrape"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "No data found",
                "data": []
            })))
            .mount(&server)
            .await;

        // Any enrichment call would be a contract violation.
        Mock::given(method("POST"))
            .and(path("/validate"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut orch = orchestrator_for(&server, false);
        let err = orch
            .run("https://example.com/sponsors", &SilentProgress)
            .await
            .unwrap_err();

        assert!(err.is_empty_result());
        assert_eq!(orch.stage(), PipelineStage::Failed);
        assert!(orch.store().is_empty());
        assert!(orch.last_error().unwrap().contains("no leads"));
    }

    #[tokio::test]
    async fn enrichment_failure_retains_stage_one_records() {
        let server = MockServer::start().await;
        mount_extract(&server).await;

        Mock::given(method("POST"))
            .and(path("/validate"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "detail": "validator crashed"
            })))
            .mount(&server)
            .await;

        let mut orch = orchestrator_for(&server, false);
        let err = orch
            .run("https://example.com/sponsors", &SilentProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, LeadScoutError::Remote { status: 500, .. }));
        assert_eq!(orch.stage(), PipelineStage::Failed);

        // Stage-1 commit survives, identity and attributes unchanged.
        let records = orch.store().records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].company, "Acme");
        assert_eq!(
            records[0].logo_url.as_deref(),
            Some("https://acme.example/logo.png")
        );
        assert_eq!(records[0].source.as_deref(), Some("Sponsor Banner"));
        assert_eq!(records[1].company, "Globex");
        assert!(orch.last_error().unwrap().contains("validator crashed"));
    }

    #[tokio::test]
    async fn bulk_synthesis_runs_when_enabled() {
        let server = MockServer::start().await;
        mount_extract(&server).await;
        mount_enrich(&server).await;

        Mock::given(method("POST"))
            .and(path("/strategize"))
            .and(body_partial_json(serde_json::json!({"filename": "f1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {"Company": "Globex", "Fit_Score": 9, "Hook": "Scaling field ops"},
                    {"Company": "Acme", "Fit_Score": 3}
                ],
                "download_url": "/download/battle_plan_f3"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut orch = orchestrator_for(&server, true);
        let summary = orch
            .run("https://example.com/sponsors", &SilentProgress)
            .await
            .unwrap();

        assert!(summary.synthesized);
        assert_eq!(
            orch.store().records()[0].hook.as_deref(),
            Some("Scaling field ops")
        );
        assert!(
            orch.store()
                .export_links()
                .basic
                .as_deref()
                .unwrap()
                .ends_with("/download/battle_plan_f3")
        );
    }

    #[tokio::test]
    async fn bulk_synthesis_failure_retains_stage_two_records() {
        let server = MockServer::start().await;
        mount_extract(&server).await;
        mount_enrich(&server).await;

        Mock::given(method("POST"))
            .and(path("/strategize"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let mut orch = orchestrator_for(&server, true);
        let err = orch
            .run("https://example.com/sponsors", &SilentProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, LeadScoutError::Remote { status: 503, .. }));
        assert_eq!(orch.stage(), PipelineStage::Failed);

        // The enriched, re-sorted working set is still there.
        let companies: Vec<&str> = orch
            .store()
            .records()
            .iter()
            .map(|r| r.company.as_str())
            .collect();
        assert_eq!(companies, vec!["Globex", "Acme"]);
    }

    #[tokio::test]
    async fn run_refused_while_in_flight() {
        let server = MockServer::start().await;
        let mut orch = orchestrator_for(&server, false);

        // Simulate a non-terminal stage left by an in-flight run.
        orch.stage = PipelineStage::Enriching;

        let err = orch
            .run("https://example.com/sponsors", &SilentProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, LeadScoutError::Busy));
    }

    #[tokio::test]
    async fn done_is_terminal_and_a_new_run_starts_fresh() {
        let server = MockServer::start().await;

        // First run uses f1, second run gets a fresh token f9.
        Mock::given(method("POST"))
            .and(path("/scrape"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "filename": "f1",
                "data": [{"Company": "Acme"}, {"Company": "Globex"}]
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        mount_enrich(&server).await;

        let mut orch = orchestrator_for(&server, false);
        orch.run("https://example.com/sponsors", &SilentProgress)
            .await
            .unwrap();
        assert_eq!(orch.stage(), PipelineStage::Done);

        Mock::given(method("POST"))
            .and(path("/scrape"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "filename": "f9",
                "data": [{"Company": "Initech"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/validate"))
            .and(body_partial_json(serde_json::json!({"filename": "f9"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"Company": "Initech", "Fit_Score": 7}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        // Second run threads the new token, never the old one.
        orch.run("https://example.com/other", &SilentProgress)
            .await
            .unwrap();

        assert_eq!(orch.store().records().len(), 1);
        assert_eq!(orch.store().records()[0].company, "Initech");
    }
}
