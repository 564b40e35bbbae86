//! Version layer: semver model, range matching and compatibility checking
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Catalog   │────▶│   Checker   │────▶│    Range    │
//! │  (records)  │     │ (aggregate) │     │  (matches)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                                       │
//!        ▼                                       ▼
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │    Cache    │     │  Migration  │────▶│   SemVer    │
//! │  (results)  │     │  (planner)  │     │   (model)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`semver`]: `SemanticVersion` parsing, serialization and ordering
//! - [`range`]: `VersionRange` and the range matcher
//! - [`types`]: Records, environments, issues, results and migration paths
//! - [`checker`]: Per-dimension compatibility evaluation
//! - [`migration`]: Migration path synthesis
//! - [`cache`]: Memoized compatibility results and migration paths
//! - [`catalog`]: Version records per mock, wiring checker, planner and cache
//! - [`error`]: `ParseError`

pub mod cache;
pub mod catalog;
pub mod checker;
pub mod error;
pub mod migration;
pub mod range;
pub mod semver;
pub mod types;
