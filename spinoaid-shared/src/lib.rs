//! # SpinoAid Shared Library
//!
//! Types and business logic used by the SpinoAid API server.
//!
//! ## Module Organization
//!
//! - `auth`: credential hashing, bearer tokens, the auth gate
//! - `store`: the storage collaborator trait and its implementations
//! - `models`: users, patients and annotation records
//! - `inference`: the image analysis seam

pub mod auth;
pub mod inference;
pub mod models;
pub mod store;

/// Current version of the shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
