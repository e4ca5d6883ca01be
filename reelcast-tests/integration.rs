//! Integration tests for Reelcast
//!
//! These tests drive the resolution pipeline and the catalog source end to
//! end against an in-memory transport, checking which hosts are contacted
//! and what the caller finally sees.

#[path = "integration/fixtures.rs"]
mod fixtures;

#[path = "integration/resolution_scenarios.rs"]
mod resolution_scenarios;

#[path = "integration/catalog_scenarios.rs"]
mod catalog_scenarios;

#[path = "integration/ranking_properties.rs"]
mod ranking_properties;
