//! Luneva storefront library.
//!
//! Server-rendered pages over the Shopify Storefront API (catalog and cart)
//! and the Sanity content API (pages, sections, navigation and theme).
//! Exposed as a library so the CLI and the integration tests can drive the
//! same loaders, renderers and router the binary serves.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod error;
pub mod filters;
pub mod loader;
pub mod middleware;
pub mod models;
pub mod navigation;
pub mod portable_text;
pub mod routes;
pub mod sanity;
pub mod sections;
pub mod shopify;
pub mod sources;
pub mod state;
pub mod theme;
pub mod views;
