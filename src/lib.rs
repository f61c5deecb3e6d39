//! Relaycache - caching forward HTTP/1.x proxy
//!
//! Core library for the codec, response cache, and connection handling.

pub mod cache;
pub mod config;
pub mod http;
pub mod proxy;
pub mod server;
pub mod stats;
