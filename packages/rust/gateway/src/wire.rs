//! Request/response body shapes for the remote agent's JSON contract.
//!
//! Responses tolerate absent fields throughout; extra fields (e.g. the
//! agent's human-readable `message`) are ignored by serde's default
//! behavior.

use serde::{Deserialize, Serialize};

use leadscout_shared::{LeadRecord, StrategyBundle};

/// Body for `POST /scrape`.
#[derive(Debug, Serialize)]
pub(crate) struct ExtractRequest<'a> {
    pub url: &'a str,
}

/// Body for `POST /validate` and `POST /strategize` — both key off the
/// working filename produced by extraction.
#[derive(Debug, Serialize)]
pub(crate) struct TokenRequest<'a> {
    pub filename: &'a str,
}

/// Body for `POST /strategize-single`.
#[derive(Debug, Serialize)]
pub(crate) struct SingleStrategyRequest<'a> {
    pub company_data: &'a LeadRecord,
}

/// Response from `POST /scrape`. A missing `filename` (or empty `data`)
/// signals the "no leads detected" condition rather than a transport error.
#[derive(Debug, Deserialize)]
pub(crate) struct ExtractResponse {
    pub filename: Option<String>,
    #[serde(default)]
    pub data: Vec<LeadRecord>,
}

/// Response from `POST /validate` and `POST /strategize`.
#[derive(Debug, Deserialize)]
pub(crate) struct StageResponse {
    #[serde(default)]
    pub data: Vec<LeadRecord>,
    pub download_url: Option<String>,
}

/// Response from `POST /strategize-single`.
#[derive(Debug, Deserialize)]
pub(crate) struct StrategyResponse {
    pub data: StrategyBundle,
}

/// FastAPI-style structured error body.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: String,
}
