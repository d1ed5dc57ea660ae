//! Configuration module for rotabak
//!
//! This module provides configuration management including:
//! - Settings directory resolution
//! - Settings file persistence (JSON, or YAML when named `.yaml`/`.yml`)

pub mod paths;
pub mod settings;

pub use paths::RotabakPaths;
pub use settings::Settings;
