//! Error signature extraction, normalization, and grouping
//!
//! A signature identifies an error/log "shape" independent of its variable
//! parts (paths, line numbers, quoted values). Lines are parsed by a fixed
//! cascade of tool-format patterns, normalized with placeholders, and
//! bucketed by signature with duplicate counts.

mod extract;
mod group;
mod normalize;

pub use extract::{ErrorParts, Extractor};
pub use group::{GroupStats, GroupedErrors, SignatureGroup, SignatureGrouper};
pub use normalize::Normalizer;
