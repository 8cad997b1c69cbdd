//! Core module - shared infrastructure for citytime
//!
//! This module contains foundational types, configuration, and error handling
//! used throughout the application.

pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, ResponseStyle, TimeSource};
pub use error::{CityTimeError, Result};
pub use types::*;
