//! Test utilities for unit and route testing.
//!
//! This module provides:
//! - Test data factories for creating valid test fixtures
//! - In-memory repository implementations for mocking persistence
//! - A pre-wired fixture bundling the subscription-domain mocks

mod app_state_builder;
mod factories;
mod fixtures;
mod mocks;

pub use app_state_builder::*;
pub use factories::*;
pub use fixtures::*;
pub use mocks::*;

pub use crate::application::plan_catalog::{
    FREE_PLAN, LARGE_ORG_PLAN, SMALL_ORG_PLAN, TRIAL_PLAN,
};
