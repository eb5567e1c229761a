//! # Ladle API Server Library
//!
//! This library provides the HTTP surface of the Ladle recipe-sharing
//! backend.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `pagination`: Page/limit query params and the list envelope
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod pagination;
pub mod routes;
