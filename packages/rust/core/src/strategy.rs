//! Secondary enrichment: on-demand strategy synthesis for a single lead.
//!
//! Runs independently of the main pipeline — its own status, its own
//! failures, no writes to the result store. A caller UI selecting a
//! different lead is responsible for discarding the stale bundle.

use tracing::{instrument, warn};

use leadscout_gateway::AgentGateway;
use leadscout_shared::{LeadRecord, Result, StrategyBundle};

/// Status of the most recent strategy invocation, unrelated to the
/// pipeline's own stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StrategyStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Drives single-lead strategy calls against the agent.
///
/// Cheap to clone — concurrent calls for different leads should each use
/// their own clone so the per-controller status stays meaningful. Each
/// invocation's bundle is scoped to the record it was called with.
#[derive(Debug, Clone)]
pub struct StrategyController {
    gateway: AgentGateway,
    status: StrategyStatus,
}

impl StrategyController {
    pub fn new(gateway: AgentGateway) -> Self {
        Self {
            gateway,
            status: StrategyStatus::Idle,
        }
    }

    pub fn status(&self) -> StrategyStatus {
        self.status
    }

    /// Generate a strategy bundle for one lead.
    ///
    /// Safe to repeat for the same or different leads; failures stay here
    /// and never escalate to the pipeline state.
    #[instrument(skip_all, fields(company = %record.company))]
    pub async fn generate(&mut self, record: &LeadRecord) -> Result<StrategyBundle> {
        self.status = StrategyStatus::Loading;

        match self.gateway.synthesize_one(record).await {
            Ok(bundle) => {
                self.status = StrategyStatus::Ready;
                Ok(bundle)
            }
            Err(e) => {
                self.status = StrategyStatus::Failed;
                warn!(error = %e, "strategy synthesis failed");
                Err(e)
            }
        }
    }
}
