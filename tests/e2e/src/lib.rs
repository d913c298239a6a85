//! MindMesh end-to-end test support
//!
//! - [`harness`]: isolated temporary databases wired to a note service
//! - [`mocks`]: test data factories and scripted embedders

pub mod harness;
pub mod mocks;

pub use harness::TestDatabaseManager;
pub use mocks::{CountingEmbedder, FailingEmbedder, LayeredScenario, TestDataFactory};
