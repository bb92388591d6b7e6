//! Collaborators the scenario drives: process execution, container image
//! pulls, HTTP probing, and per-scenario workspaces.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used, clippy::panic))]

pub mod env;
pub mod exec;
pub mod probe;
pub mod puller;
pub mod workspace;
