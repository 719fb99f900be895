//! Middleware module for Scholia HTTP server
//!
//! Provides:
//! - Identity header resolution (`RequireUser`)
//! - Shared-secret guard for the sign-in sync endpoint

pub mod auth;
