//! Client-facing TCP listener

pub mod listener;

pub use listener::{run, serve};
