//! Luneva Core - Shared content and commerce types.
//!
//! This crate provides the types used across all Luneva components:
//! - `storefront` - Public-facing e-commerce site
//! - `cli` - Content tooling (schema listing, preview labels, font stylesheets)
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. Content documents deserialize straight from the content API's
//! JSON, and everything derived from them (link paths, asset URLs, studio
//! preview labels) is computed here so it can be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs and decimal prices
//! - [`content`] - Content documents, sections, bento layout, links, assets
//! - [`studio`] - Document type registry and preview labels

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod content;
pub mod studio;
pub mod types;

pub use types::*;
