//! # Codegen Configuration
//!
//! Target width and sealing policy for function emission.

use crate::field::{PRIME_BITS, WIDE_BITS};
use std::fmt;

/// Code generation configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CodegenConfig {
    /// Width in bits of the integer container holding a felt (multiple of 64)
    pub target_width: u32,
    /// Run the verifier when a function is sealed
    pub verify: bool,
    /// Log verifier warnings (unused values) when sealing
    pub warn_unused: bool,
}

impl CodegenConfig {
    /// Default configuration: 256-bit felts, verification on
    pub const DEFAULT: Self = Self {
        target_width: 256,
        verify: true,
        warn_unused: true,
    };

    /// Create a configuration for a target width, with validation
    pub const fn new(target_width: u32) -> Result<Self, ConfigError> {
        let config = Self {
            target_width,
            verify: true,
            warn_unused: true,
        };

        if target_width < PRIME_BITS {
            return Err(ConfigError::WidthTooSmall);
        }
        if target_width % 64 != 0 {
            return Err(ConfigError::UnalignedWidth);
        }
        if 2 * target_width > 2 * WIDE_BITS {
            return Err(ConfigError::WidthTooLarge);
        }

        Ok(config)
    }

    /// Width of the multiplication intermediate at this target width
    #[inline]
    pub const fn wide_width(&self) -> u32 {
        self.target_width * 2
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        // The container must hold every reduced magnitude
        if self.target_width < PRIME_BITS {
            return Err(ConfigError::WidthTooSmall);
        }
        if self.target_width % 64 != 0 {
            return Err(ConfigError::UnalignedWidth);
        }
        if self.wide_width() > 2 * WIDE_BITS {
            return Err(ConfigError::WidthTooLarge);
        }
        Ok(())
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn with_warn_unused(mut self, warn_unused: bool) -> Self {
        self.warn_unused = warn_unused;
        self
    }
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for CodegenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CodegenConfig {{ felt: i{}, wide: i{}, verify: {} }}",
            self.target_width,
            self.wide_width(),
            self.verify,
        )
    }
}

/// Configuration error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Target width cannot hold a 252-bit magnitude
    WidthTooSmall,
    /// Target width must be a multiple of 64
    UnalignedWidth,
    /// Double-width intermediate would exceed 1024 bits
    WidthTooLarge,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::WidthTooSmall => {
                write!(f, "target_width must be at least {} bits", PRIME_BITS)
            }
            ConfigError::UnalignedWidth => {
                write!(f, "target_width must be a multiple of 64")
            }
            ConfigError::WidthTooLarge => {
                write!(f, "target_width must be at most {} bits", WIDE_BITS)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CodegenConfig::DEFAULT;
        assert_eq!(config.target_width, 256);
        assert_eq!(config.wide_width(), 512);
        assert!(config.verify);
        assert!(config.validate().is_ok());
        assert_eq!(CodegenConfig::default(), config);
    }

    #[test]
    fn test_validation() {
        assert!(CodegenConfig::new(256).is_ok());
        assert!(CodegenConfig::new(320).is_ok());
        assert!(CodegenConfig::new(512).is_ok());

        assert_eq!(CodegenConfig::new(128).unwrap_err(), ConfigError::WidthTooSmall);
        assert_eq!(CodegenConfig::new(260).unwrap_err(), ConfigError::UnalignedWidth);
        assert_eq!(CodegenConfig::new(576).unwrap_err(), ConfigError::WidthTooLarge);

        let config = CodegenConfig {
            target_width: 192,
            ..CodegenConfig::DEFAULT
        };
        assert_eq!(config.validate().unwrap_err(), ConfigError::WidthTooSmall);
    }

    #[test]
    fn test_builders() {
        let config = CodegenConfig::DEFAULT.with_verify(false).with_warn_unused(false);
        assert!(!config.verify);
        assert!(!config.warn_unused);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            CodegenConfig::DEFAULT.to_string(),
            "CodegenConfig { felt: i256, wide: i512, verify: true }"
        );
        assert_eq!(
            ConfigError::UnalignedWidth.to_string(),
            "target_width must be a multiple of 64"
        );
    }
}
