//! Domain layer: configuration, error taxonomy, and data model.

pub mod config;
pub mod error;
pub mod model;
