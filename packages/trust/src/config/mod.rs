//! Trust evaluator configuration
//!
//! Everything here is read once while an evaluator is built. The defaults
//! use the operating system's trust store for the default tier and leave
//! revocation checking disabled for the repair tier.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Where the default tier gets its trust anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformRoots {
    /// Operating system store, falling back to the bundled Mozilla roots when
    /// the store cannot be read or is empty
    #[default]
    NativeWithFallback,
    /// Operating system store only
    Native,
    /// Bundled Mozilla roots only
    Bundled,
}

/// Revocation settings for the reordered-path validator.
///
/// Disabled by default. Enabling it requires at least one CRL file; there is
/// no online (OCSP/CRL download) checking at this layer.
///
/// Only the reordered-path tier checks revocation. The default and custom
/// anchor tiers never consult these CRLs, so a revoked leaf sent in a chain
/// either of them accepts is still trusted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RevocationConfig {
    pub enabled: bool,
    /// PEM or DER encoded certificate revocation lists
    pub crl_paths: Vec<PathBuf>,
    /// Only check the end-entity certificate, not intermediates
    pub end_entity_only: bool,
    /// Treat certificates whose status no CRL covers as not revoked
    pub allow_unknown_status: bool,
}

impl RevocationConfig {
    /// Revocation checking against the given CRL files.
    #[must_use]
    pub fn with_crls<I, P>(crl_paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            enabled: true,
            crl_paths: crl_paths.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Validate revocation configuration
    ///
    /// # Errors
    ///
    /// Returns an error if revocation is enabled without any CRL file.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.enabled && self.crl_paths.is_empty() {
            return Err(ConfigurationError::Revocation(
                "revocation checking is enabled but no CRL files are configured".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for a [`crate::FallbackTrustEvaluator`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustConfig {
    pub platform_roots: PlatformRoots,
    pub revocation: RevocationConfig,
}

impl TrustConfig {
    /// Configuration that only uses the bundled roots for the default tier.
    ///
    /// Independent of the host trust store, which makes results reproducible
    /// across machines.
    #[must_use]
    pub fn bundled() -> Self {
        Self {
            platform_roots: PlatformRoots::Bundled,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_platform_roots(self, platform_roots: PlatformRoots) -> Self {
        Self {
            platform_roots,
            ..self
        }
    }

    #[must_use]
    pub fn with_revocation(self, revocation: RevocationConfig) -> Self {
        Self { revocation, ..self }
    }

    /// Parse a JSON configuration document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::Parse` for malformed JSON and any
    /// validation error of the parsed configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigurationError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate trust configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the revocation settings are inconsistent.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.revocation.validate()
    }
}
