//! Core domain types
//!
//! Pure types with no numeric kernels attached: sample and flag types,
//! transform conventions, configuration and errors.

pub mod config;
pub mod error;
pub mod types;

pub use config::*;
pub use error::*;
pub use types::*;
