//! # persona common library
//!
//! Shared code for the persona enrichment service:
//! - Request context (cancellation token + deadline)
//! - Parallel fan-out orchestrator with aggregated branch errors
//! - Person record models
//! - Configuration loading
//! - Common error type

pub mod config;
pub mod context;
pub mod error;
pub mod fanout;
pub mod models;

pub use context::RequestContext;
pub use error::{Error, Result};
pub use fanout::{run_parallel, AggregatedError, Branch, BranchError, BranchFailure};
pub use models::{NewPerson, PersonFilter, PersonInfo};
