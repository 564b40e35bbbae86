//! Registry of versioned test doubles.
//!
//! Tracks mock implementations, their semantic versions, the version ranges
//! they declare compatibility with, and the dependencies between them. A test
//! harness uses it to answer three questions: is a mock version compatible
//! with the environment, in which order must mocks be loaded, and what is the
//! migration path when a version is not compatible.

pub mod config;
pub mod manifest;
pub mod registry;
pub mod version;
