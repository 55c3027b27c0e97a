//! Pipeline orchestration core for LeadScout.
//!
//! This crate ties the agent gateway into the three-stage lead pipeline:
//! the result store, the sequential orchestrator, and the independent
//! single-lead strategy controller.

pub mod orchestrator;
pub mod store;
pub mod strategy;
