//! Application configuration and constants
//!
//! Branding and naming constants shared across crates. Reference these
//! rather than hardcoding values.

/// The product name
pub const APP_NAME: &str = "Wristwatch";

/// Firmware version (synchronized with Cargo.toml)
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Development mode banner
pub const fn dev_banner() -> &'static str {
    "Wristwatch - Simulator"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_not_empty() {
        assert!(!APP_NAME.is_empty());
        assert!(!APP_VERSION.is_empty());
        assert!(dev_banner().starts_with(APP_NAME));
    }
}
