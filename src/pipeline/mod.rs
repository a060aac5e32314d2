//! Pipeline orchestration
//!
//! Configuration parsing and validation, stage observers, output artifacts
//! and the [`runner::ReviewPipeline`] that ties the stages together.

pub mod artifacts;
pub mod config;
pub mod error_code;
pub mod errors;
pub mod observer;
pub mod runner;
pub mod validation;
