//! # Warren Support
//!
//! Shared helpers for the Warren container crates.
//!
//! This crate provides:
//! - Rendering of service-name lists for error messages
//! - Short type names for diagnostics
//! - "Did you mean?" suggestions for misspelled service names

pub mod rendering;
