//! Core types and trait definitions for the Lighthouse match harvester.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod activity;
pub mod decompose;
pub mod error;
pub mod policy;
pub mod report;
pub mod store;

pub use error::{Error, Result};
