//! Beacon - Search Engine Front-End
//!
//! Core library for the HTTP connection engine, static file serving,
//! and query processing.

pub mod config;
pub mod http;
pub mod index;
pub mod router;
pub mod server;
