//! Xmas Events Core - Shared types library.
//!
//! This crate provides common types used across all Xmas Events components:
//! - `server` - Shopify app backend (OAuth install, pricing, event feed, calendar files)
//! - `cli` - Command-line tools for schema setup and installation management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Shop domains, pricing configuration, and event calendar types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
