//! Suppression of repeated traces by occurrence counting.

pub mod deduplicator;

pub use deduplicator::{fingerprint, Deduplicator};
