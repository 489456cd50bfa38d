//! Condense - Content Optimization Engine
//!
//! Classifies verbose coding-session output (compiler/linter output, HTTP,
//! test and application logs, stack traces, prose, source snippets), picks a
//! reduction strategy, and returns a compacted representation that preserves
//! what a downstream reasoning agent needs while minimizing token count.

pub mod cli;
pub mod compress;
pub mod config;
pub mod detect;
pub mod error;
pub mod optimizer;
pub mod scoring;
pub mod signature;
pub mod summarize;
pub mod tokens;

pub use error::{CondenseError, Result};
pub use optimizer::{ContentHint, OptimizeOptions, OptimizeOutcome, Optimizer, SavingsLedger};
