//! Matching, search, and application tracking core for EU university admissions.

pub mod applications;
pub mod catalog;
pub mod config;
pub mod error;
pub mod matching;
pub mod profile;
pub mod store;
pub mod telemetry;
pub mod wizard;
