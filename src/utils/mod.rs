//! Shared helpers: parameter validation and corpus traversal.

pub mod files;
pub mod validation;
