//! Version information

/// Crate version as recorded in Cargo.toml
pub fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
