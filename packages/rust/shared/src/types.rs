//! Core domain types for the LeadScout pipeline.
//!
//! Wire field names follow the remote agent's JSON contract: lead fields are
//! `PascalCase`/`Snake_Case` (`Company`, `Fit_Score`), strategy-bundle fields
//! are lowercase `snake_case`. Absent fields are legal everywhere.

use serde::{Deserialize, Serialize};

/// Minimum fit score at which a lead qualifies for strategy synthesis.
pub const MIN_STRATEGY_FIT: u8 = 4;

/// Sentinel the enrichment agent emits when it has no product recommendation.
const NO_RECOMMENDATION: &str = "N/A";

// ---------------------------------------------------------------------------
// LeadRecord
// ---------------------------------------------------------------------------

/// A single lead. `company` is the stable identity key across stages.
///
/// Stage 1 populates `company`, `logo_url`, and `source`; stage 2 adds the
/// scoring fields. A populated later-stage field is never reverted by
/// earlier-stage data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRecord {
    /// Company name — required, the merge identity.
    #[serde(rename = "Company")]
    pub company: String,

    /// Logo image URL, if the extractor captured one.
    #[serde(rename = "Logo_Url", default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,

    /// Where on the page the lead was found (e.g. "Sponsor Banner").
    #[serde(rename = "Source", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// 0–10 fit rubric from enrichment. `None` means "unscored" — zero is a
    /// valid scored value and must not be conflated with absence.
    #[serde(rename = "Fit_Score", default, skip_serializing_if = "Option::is_none")]
    pub fit_score: Option<u8>,

    /// Industry/segment category from enrichment.
    #[serde(rename = "Category", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Recommended product, with `"N/A"` meaning "no recommendation".
    #[serde(
        rename = "Recommended_Product",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub recommended_product: Option<String>,

    /// Scoring rationale from enrichment.
    #[serde(rename = "Reasoning", default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,

    /// Suggested sales hook from enrichment.
    #[serde(rename = "Hook", default, skip_serializing_if = "Option::is_none")]
    pub hook: Option<String>,
}

impl LeadRecord {
    /// Build a bare stage-1 record (useful in tests and fixtures).
    pub fn new(company: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            logo_url: None,
            source: None,
            fit_score: None,
            category: None,
            recommended_product: None,
            reasoning: None,
            hook: None,
        }
    }

    /// Score used for ordering: absent counts as 0, the stored value is
    /// untouched.
    pub fn ordering_score(&self) -> u8 {
        self.fit_score.unwrap_or(0)
    }

    /// Whether this lead is a good enough fit to spend a strategy call on.
    pub fn qualifies_for_strategy(&self) -> bool {
        self.ordering_score() >= MIN_STRATEGY_FIT
    }

    /// The recommended product with the `"N/A"` sentinel normalized away.
    pub fn recommendation(&self) -> Option<&str> {
        match self.recommended_product.as_deref() {
            None | Some(NO_RECOMMENDATION) => None,
            Some(p) => Some(p),
        }
    }
}

// ---------------------------------------------------------------------------
// StageToken
// ---------------------------------------------------------------------------

/// Opaque correlator returned by extraction and threaded through the
/// enrichment and bulk-synthesis calls of the same run.
///
/// On the wire this is the server-generated working filename. A token from
/// one run must never be reused to resume a different run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageToken(String);

impl StageToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StageToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ExportLinkSet
// ---------------------------------------------------------------------------

/// Export flavors the agent can produce for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// Enriched lead sheet for the current stage.
    Basic,
    /// Sheet with strategy fields folded in.
    Comprehensive,
}

/// Resolvable download URLs for the current run, recomputed per stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportLinkSet {
    pub basic: Option<String>,
    pub comprehensive: Option<String>,
}

impl ExportLinkSet {
    pub fn get(&self, kind: ExportKind) -> Option<&str> {
        match kind {
            ExportKind::Basic => self.basic.as_deref(),
            ExportKind::Comprehensive => self.comprehensive.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.basic.is_none() && self.comprehensive.is_none()
    }
}

// ---------------------------------------------------------------------------
// StrategyBundle
// ---------------------------------------------------------------------------

/// A key contact surfaced by strategy synthesis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub email: String,
}

/// Why the recommended product fits this lead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAnalysis {
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub why_perfect: String,
    #[serde(default)]
    pub use_cases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_roi: Option<String>,
}

/// A ready-to-send outreach email.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailDraft {
    #[serde(default)]
    pub to_name: String,
    #[serde(default)]
    pub to_email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

/// Synthesized outreach artifacts for exactly one lead.
///
/// Created per secondary-enrichment call and replaced wholesale when the
/// call is repeated or a different lead is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyBundle {
    /// Ordered key contacts, best first.
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_analysis: Option<ProductAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_draft: Option<EmailDraft>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lead_record_tolerates_absent_fields() {
        let json = r#"{"Company": "Acme"}"#;
        let record: LeadRecord = serde_json::from_str(json).expect("deserialize");
        assert_eq!(record.company, "Acme");
        assert!(record.fit_score.is_none());
        assert!(record.logo_url.is_none());
    }

    #[test]
    fn lead_record_wire_names() {
        let json = r#"{
            "Company": "Globex",
            "Logo_Url": "https://globex.example/logo.png",
            "Source": "Sponsor Banner",
            "Fit_Score": 9,
            "Category": "Field Service",
            "Recommended_Product": "SparesGPT",
            "Reasoning": "Large field workforce",
            "Hook": "Scaling field ops"
        }"#;
        let record: LeadRecord = serde_json::from_str(json).expect("deserialize");
        assert_eq!(record.fit_score, Some(9));
        assert_eq!(record.recommendation(), Some("SparesGPT"));
        assert!(record.qualifies_for_strategy());
    }

    #[test]
    fn zero_score_is_scored_not_absent() {
        let scored: LeadRecord =
            serde_json::from_str(r#"{"Company": "A", "Fit_Score": 0}"#).unwrap();
        let unscored: LeadRecord = serde_json::from_str(r#"{"Company": "B"}"#).unwrap();

        assert_eq!(scored.fit_score, Some(0));
        assert_eq!(unscored.fit_score, None);
        // Both order as 0.
        assert_eq!(scored.ordering_score(), unscored.ordering_score());
    }

    #[test]
    fn recommendation_sentinel_normalized() {
        let mut record = LeadRecord::new("Acme");
        record.recommended_product = Some("N/A".into());
        assert_eq!(record.recommendation(), None);

        record.recommended_product = Some("FieldFlow".into());
        assert_eq!(record.recommendation(), Some("FieldFlow"));
    }

    #[test]
    fn strategy_bundle_tolerates_partial_payload() {
        let json = r#"{"contacts": [{"name": "Jane Doe", "title": "VP Ops"}]}"#;
        let bundle: StrategyBundle = serde_json::from_str(json).expect("deserialize");
        assert_eq!(bundle.contacts.len(), 1);
        assert_eq!(bundle.contacts[0].name, "Jane Doe");
        assert!(bundle.contacts[0].email.is_empty());
        assert!(bundle.product_analysis.is_none());
        assert!(bundle.email_draft.is_none());
    }

    #[test]
    fn export_link_set_lookup() {
        let links = ExportLinkSet {
            basic: Some("https://agent.example/download/f1".into()),
            comprehensive: None,
        };
        assert!(links.get(ExportKind::Basic).is_some());
        assert!(links.get(ExportKind::Comprehensive).is_none());
        assert!(!links.is_empty());
        assert!(ExportLinkSet::default().is_empty());
    }
}
