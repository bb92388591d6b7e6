//! The ddev interoperability scenario.
//!
//! Allocates a workspace, downloads ddev and mkcert, pulls the service
//! images, starts a project serving a one-line PHP payload, checks that
//! the site returns the payload's marker, and always tears the project
//! and workspace down again.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod plan;
pub mod report;
pub mod runner;
pub mod teardown;

pub use report::{ScenarioOutcome, ScenarioReport};
pub use runner::ScenarioRunner;
