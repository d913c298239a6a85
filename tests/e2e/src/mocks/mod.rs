//! Test doubles and data factories

mod fixtures;

pub use embedders::{CountingEmbedder, FailingEmbedder};
pub use fixtures::{LayeredScenario, TestDataFactory};
