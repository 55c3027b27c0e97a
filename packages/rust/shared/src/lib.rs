//! Shared types, error model, and configuration for LeadScout.
//!
//! This crate is the foundation depended on by all other LeadScout crates.
//! It provides:
//! - [`LeadScoutError`] — the unified error type
//! - Domain types ([`LeadRecord`], [`StageToken`], [`StrategyBundle`], [`ExportLinkSet`])
//! - Configuration ([`AppConfig`], [`GatewayConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AGENT_URL_ENV, AgentConfig, AppConfig, GatewayConfig, PipelineConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, validate_agent_url,
};
pub use error::{LeadScoutError, Result};
pub use types::{
    Contact, EmailDraft, ExportKind, ExportLinkSet, LeadRecord, MIN_STRATEGY_FIT,
    ProductAnalysis, StageToken, StrategyBundle,
};
