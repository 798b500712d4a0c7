//! # patch-repackage
//!
//! Rewrites class references in a set of unified-diff patch files after a
//! batch of classes moved out of one legacy package.
//!
//! ## Architecture
//!
//! - **mapping**: Mapping file parsing into an ordered, deduplicated rule set
//! - **rewrite**: Line classification and per-line substitution
//! - **remap**: Whole-patch rewriting on top of `rewrite`
//! - **batch**: Parallel remapping of patch directories into fresh output directories
//! - **source**: Mapping text retrieval from a local file or a URL
//! - **config**: CLI argument resolution into run configuration
//! - **error**: Library error type

pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod mapping;
pub mod remap;
pub mod rewrite;
pub mod source;
