//! Integration tests for Sumi-Harvest
//!
//! These tests run the harvester and crawler over real HTTP against
//! wiremock servers.

mod crawl_tests;
mod harvest_tests;
mod pipeline_tests;
mod support;
