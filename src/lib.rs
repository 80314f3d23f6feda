//! Rinkside: NHL injury report scraper.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod fetch;
pub mod scrape;
pub mod cache;
pub mod service;
pub mod roster;
pub mod api;
