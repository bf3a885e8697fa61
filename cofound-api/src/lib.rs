//! # Cofound API Server Library
//!
//! HTTP JSON API for the founders and investors platform.
//!
//! ## Modules
//!
//! - `app`: application state and router builder
//! - `config`: configuration from the environment
//! - `error`: error type and HTTP response mapping
//! - `middleware`: security headers
//! - `routes`: route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
