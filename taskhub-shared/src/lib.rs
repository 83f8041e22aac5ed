//! # TaskHub Shared Library
//!
//! This crate contains the domain types, persistence gateway and business
//! services used by the TaskHub API server.
//!
//! ## Module Organization
//!
//! - `models`: Entities, inputs and public response views
//! - `repository`: Persistence ports with PostgreSQL and in-memory adapters
//! - `auth`: Password hashing and session token primitives
//! - `services`: Credential and task services plus the error taxonomy
//! - `db`: Connection pool and migrations

pub mod auth;
pub mod db;
pub mod models;
pub mod repository;
pub mod services;

/// Current version of the TaskHub shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
