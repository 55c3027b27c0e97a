//! Typed client for the remote lead-generation agents.
//!
//! Wraps the four agent operations — extract, enrich, bulk-strategize, and
//! single-strategize — as one round-trip each, plus the pure export-link
//! derivation. The gateway shapes requests/responses and applies
//! per-operation timeouts; it holds no state between calls.

mod wire;

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};
use url::Url;

use leadscout_shared::{
    ExportLinkSet, GatewayConfig, LeadRecord, LeadScoutError, Result, StageToken, StrategyBundle,
};

use wire::{
    ErrorBody, ExtractRequest, ExtractResponse, SingleStrategyRequest, StageResponse,
    StrategyResponse, TokenRequest,
};

/// User-Agent string for agent requests.
const USER_AGENT: &str = concat!("LeadScout/", env!("CARGO_PKG_VERSION"));

/// Path segment substituted to derive the comprehensive export link.
const BASIC_DOWNLOAD_SEGMENT: &str = "/download/";
const COMPREHENSIVE_DOWNLOAD_SEGMENT: &str = "/download-comprehensive/";

// ---------------------------------------------------------------------------
// Stage results
// ---------------------------------------------------------------------------

/// Result of the extraction stage.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Opaque correlator for the enrichment and bulk-synthesis calls of
    /// this run.
    pub token: StageToken,
    /// Base lead records in the agent's insertion order.
    pub records: Vec<LeadRecord>,
    /// Export links for the stage-1 working set.
    pub export_links: ExportLinkSet,
}

/// Result of the enrichment or bulk-synthesis stage.
#[derive(Debug, Clone)]
pub struct Enrichment {
    /// The authoritative record set for the stage, in response order.
    pub records: Vec<LeadRecord>,
    /// Export links for the stage's working set.
    pub export_links: ExportLinkSet,
}

// ---------------------------------------------------------------------------
// AgentGateway
// ---------------------------------------------------------------------------

/// Thin typed client over the remote agent HTTP API.
///
/// Cheap to clone — the underlying `reqwest::Client` is reference-counted.
#[derive(Debug, Clone)]
pub struct AgentGateway {
    client: Client,
    /// Base URL with no trailing slash.
    base: String,
    extract_timeout: Duration,
    enrich_timeout: Duration,
    strategy_timeout: Duration,
}

impl AgentGateway {
    /// Build a gateway from the runtime config. Validates the base URL.
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let parsed = Url::parse(&config.base_url).map_err(|e| {
            LeadScoutError::config(format!("invalid agent URL '{}': {e}", config.base_url))
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(LeadScoutError::config(format!(
                "agent URL must be http or https: {}",
                config.base_url
            )));
        }

        // Per-operation timeouts are applied on each request, not the client.
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| LeadScoutError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base: config.base_url.trim_end_matches('/').to_string(),
            extract_timeout: Duration::from_secs(config.extract_timeout_secs),
            enrich_timeout: Duration::from_secs(config.enrich_timeout_secs),
            strategy_timeout: Duration::from_secs(config.strategy_timeout_secs),
        })
    }

    /// Run stage-1 extraction against a source page URL.
    ///
    /// Returns [`LeadScoutError::EmptyResult`] when the agent reports no
    /// working file or no records — "no leads detected", not a transport
    /// failure.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn extract(&self, url: &str) -> Result<Extraction> {
        let response: ExtractResponse = self
            .post_json(
                "/scrape",
                &ExtractRequest { url },
                self.extract_timeout,
                "extract",
            )
            .await?;

        let Some(filename) = response.filename else {
            debug!("extraction response carried no working filename");
            return Err(LeadScoutError::EmptyResult);
        };
        if response.data.is_empty() {
            return Err(LeadScoutError::EmptyResult);
        }

        let token = StageToken::new(filename);
        let export_links = self.export_links_for_token(&token);

        info!(records = response.data.len(), %token, "extraction complete");

        Ok(Extraction {
            token,
            records: response.data,
            export_links,
        })
    }

    /// Run stage-2 enrichment for the extraction identified by `token`.
    ///
    /// Uses the long timeout: the agent performs multi-source lookups and
    /// reasoning per record, so the short extract timeout would cancel
    /// legitimate runs.
    #[instrument(skip_all, fields(token = %token))]
    pub async fn enrich(&self, token: &StageToken) -> Result<Enrichment> {
        let response: StageResponse = self
            .post_json(
                "/validate",
                &TokenRequest {
                    filename: token.as_str(),
                },
                self.enrich_timeout,
                "enrich",
            )
            .await?;

        info!(records = response.data.len(), "enrichment complete");
        Ok(self.stage_result(response, token))
    }

    /// Run stage-3 bulk strategy synthesis for the run identified by `token`.
    /// Same long-timeout class as [`enrich`](Self::enrich).
    #[instrument(skip_all, fields(token = %token))]
    pub async fn synthesize_bulk(&self, token: &StageToken) -> Result<Enrichment> {
        let response: StageResponse = self
            .post_json(
                "/strategize",
                &TokenRequest {
                    filename: token.as_str(),
                },
                self.enrich_timeout,
                "bulk synthesis",
            )
            .await?;

        info!(records = response.data.len(), "bulk synthesis complete");
        Ok(self.stage_result(response, token))
    }

    /// Synthesize a strategy bundle for a single lead. Token-independent and
    /// safe to repeat; has no side effects on the main pipeline.
    #[instrument(skip_all, fields(company = %record.company))]
    pub async fn synthesize_one(&self, record: &LeadRecord) -> Result<StrategyBundle> {
        let response: StrategyResponse = self
            .post_json(
                "/strategize-single",
                &SingleStrategyRequest {
                    company_data: record,
                },
                self.strategy_timeout,
                "strategy synthesis",
            )
            .await?;

        info!(contacts = response.data.contacts.len(), "strategy bundle ready");
        Ok(response.data)
    }

    /// Derive export links for a stage token: the basic link is the download
    /// endpoint parameterized by the token, the comprehensive link
    /// substitutes a fixed path segment. Pure — no backend query.
    pub fn export_links_for_token(&self, token: &StageToken) -> ExportLinkSet {
        self.export_links_for_path(&format!("{BASIC_DOWNLOAD_SEGMENT}{token}"))
    }

    /// Derive export links from a server-relative download path (as returned
    /// in a stage response's `download_url`).
    pub fn export_links_for_path(&self, download_path: &str) -> ExportLinkSet {
        let basic = format!("{}{download_path}", self.base);
        let comprehensive = download_path
            .contains(BASIC_DOWNLOAD_SEGMENT)
            .then(|| basic.replace(BASIC_DOWNLOAD_SEGMENT, COMPREHENSIVE_DOWNLOAD_SEGMENT));

        ExportLinkSet {
            basic: Some(basic),
            comprehensive,
        }
    }

    /// Map a stage response into an [`Enrichment`], preferring the response's
    /// own download path over the token-derived one.
    fn stage_result(&self, response: StageResponse, token: &StageToken) -> Enrichment {
        let export_links = match response.download_url.as_deref() {
            Some(path) => self.export_links_for_path(path),
            None => self.export_links_for_token(token),
        };

        Enrichment {
            records: response.data,
            export_links,
        }
    }

    /// POST a JSON body and decode a JSON response, classifying failures
    /// per the error taxonomy.
    async fn post_json<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        timeout: Duration,
        operation: &str,
    ) -> Result<R> {
        let url = format!("{}{path}", self.base);
        debug!(%url, timeout_secs = timeout.as_secs(), "calling remote agent");

        let response = self
            .client
            .post(&url)
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| classify_transport(e, operation, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            let detail = match serde_json::from_str::<ErrorBody>(&body_text) {
                Ok(parsed) => parsed.detail,
                Err(_) if body_text.is_empty() => format!("{operation} failed"),
                Err(_) => body_text,
            };
            return Err(LeadScoutError::Remote {
                status: status.as_u16(),
                detail,
            });
        }

        response.json::<R>().await.map_err(|e| {
            if e.is_timeout() {
                LeadScoutError::Timeout {
                    operation: operation.to_string(),
                    secs: timeout.as_secs(),
                }
            } else {
                LeadScoutError::parse(format!("{operation}: {e}"))
            }
        })
    }
}

/// Classify a reqwest send error: timeout expiry vs. generic transport.
fn classify_transport(e: reqwest::Error, operation: &str, timeout: Duration) -> LeadScoutError {
    if e.is_timeout() {
        LeadScoutError::Timeout {
            operation: operation.to_string(),
            secs: timeout.as_secs(),
        }
    } else {
        LeadScoutError::Network(format!("{operation}: {e}"))
    }
}
