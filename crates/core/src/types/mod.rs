//! Core types for Luneva.
//!
//! This module provides type-safe wrappers for common commerce concepts.

pub mod id;
pub mod price;

pub use id::*;
pub use price::{Price, PriceError};
