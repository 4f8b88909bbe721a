//! # SiteDesk API Server Library
//!
//! HTTP layer of the SiteDesk admin backend.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration from the environment
//! - `error`: Error handling and HTTP response mapping
//! - `identity`: Caller identity extraction
//! - `middleware`: Response security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod routes;
