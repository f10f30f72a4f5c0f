//! # Gymlog Common Library
//!
//! Shared code for the Gymlog workout tracker:
//! - Database initialization, schema and migrations
//! - Row models for every table
//! - Configuration resolution
//! - Calendar date utilities

pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
