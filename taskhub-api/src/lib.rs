//! # TaskHub API Server Library
//!
//! HTTP surface for TaskHub: user registration and login, and owner-scoped
//! task management behind bearer authentication.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Validating JSON extractor
//! - `middleware`: Bearer token authentication
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
