//! # Cofound Shared Library
//!
//! Types and data access shared by the Cofound API server and its
//! migration tool.
//!
//! ## Module Organization
//!
//! - `models`: users, startups and founding memberships
//! - `auth`: passwords, tokens, request authentication and ownership checks
//! - `db`: connection pool and schema migrations

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the Cofound shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
