//! Utility functions and helpers.

pub mod settings;

pub use settings::{author_pool_path, Settings, AUTHORS_ENV_VAR};
