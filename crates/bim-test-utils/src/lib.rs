//! Testing utilities for the BIM provisioning workspace
//!
//! In-memory host, document builder and shared fixtures.

#![allow(missing_docs)]

pub mod document;
pub mod fixtures;
pub mod host;

pub use document::DocumentData;
pub use host::{HostStats, InMemoryHost};
