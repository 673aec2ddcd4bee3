//! Configuration management for the adapter
//!
//! This module handles loading and managing configuration settings:
//! the cookie pool, upstream endpoints and proxies, and failover tuning.

pub mod loader;
pub mod settings;

pub use loader::ConfigLoader;
pub use settings::Settings;
