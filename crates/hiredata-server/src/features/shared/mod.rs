//! Shared utilities for feature modules

pub mod error_helpers;

pub use error_helpers::{constraint_detail, is_unique_violation};
