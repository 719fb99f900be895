//! Server module for Scholia
//!
//! Contains the main server initialization and runtime logic.
//!
//! # Module Structure
//!
//! - `config`: Configuration structures for all server components
//! - `loader`: Configuration loading from files and environment
//! - `validation`: Production configuration validation
//! - `init`: Engine bootstrap, router assembly and the run loop

pub mod config;
mod init;
mod loader;
mod validation;

// Re-export public API
#[cfg(test)]
pub use init::build_app;
pub use init::{open_engine, run};
pub use loader::load_config;
