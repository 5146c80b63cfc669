//! Shared test utilities for claimdesk integration tests.
//!
//! This module provides:
//! - `TestHarness` for isolated test execution with a temp database and output directory
//! - Builders for worker forms and claim fixtures

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::TestHarness;
