//! Chainmend public API
//!
//! Server certificate trust evaluation for rustls clients. Chains are checked
//! against the platform anchors, then caller anchors, then reordered
//! leaf-to-root and validated as an explicit path, so servers that send
//! their chain out of order are still trusted.

#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

use std::sync::Arc;

pub mod builder;

pub use builder::*;

// Re-export the evaluator surface from the implementation package
pub use chainmend_trust::connect::{client_config, TrustedConnector};
pub use chainmend_trust::{
    CertificateTrustError, ConfigurationError, ConnectError, ConstructionError,
    FallbackTrustEvaluator, PathValidator, PlatformRoots, RevocationConfig, ServerTrustEvaluator,
    TrustAnchorSet, TrustConfig, TrustContext,
};

/// Main entry point providing static builder methods
pub struct Trust;

impl Trust {
    /// Create a new evaluator builder
    ///
    /// # Examples
    /// ```no_run
    /// use chainmend::{PlatformRoots, Trust};
    ///
    /// let evaluator = Trust::evaluator()
    ///     .anchors_from_dir("/etc/myapp/anchors")
    ///     .platform_roots(PlatformRoots::Bundled)
    ///     .build()?;
    /// let client_config = chainmend::client_config(evaluator)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[must_use]
    pub fn evaluator() -> TrustEvaluatorBuilder {
        TrustEvaluatorBuilder::new()
    }
}

/// Build a trust evaluator over `anchors` with the default configuration.
///
/// # Errors
///
/// - `TrustStore` if an anchor cannot be parsed
/// - `AlgorithmUnavailable` if the platform offers no default trust
/// - `Parameter` if `anchors` is empty
/// - `EvaluatorConstruction` for any other construction failure
pub fn create_trust_evaluator(
    anchors: &TrustAnchorSet,
) -> Result<Arc<FallbackTrustEvaluator>, ConstructionError> {
    let evaluator = FallbackTrustEvaluator::new(anchors, &TrustConfig::default())?;
    Ok(Arc::new(evaluator))
}
