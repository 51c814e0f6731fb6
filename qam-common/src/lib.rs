//! # Q&A Maintenance Common Library
//!
//! Shared code for the Q&A maintenance service:
//! - Error and result types
//! - Bootstrap configuration loading (TOML + environment)
//! - Reference timestamp parsing for answer post-processing

pub mod config;
pub mod error;
pub mod time;

pub use error::{Error, Result};
pub use time::ReferenceTime;
