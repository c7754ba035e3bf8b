//! Core `TrustEvaluatorBuilder` structures and base functionality
//!
//! The builder tracks whether trust anchors have been supplied in its type;
//! `build()` exists only once they have.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use chainmend_trust::{
    ConstructionError, FallbackTrustEvaluator, PlatformRoots, RevocationConfig, TrustAnchorSet,
    TrustConfig,
};
use rustls::crypto::CryptoProvider;
use rustls::pki_types::CertificateDer;

/// State marker indicating no trust anchors have been supplied
#[derive(Debug, Clone, Copy)]
pub struct AnchorsNotSet;

/// State marker indicating trust anchors have been supplied
#[derive(Debug, Clone, Copy)]
pub struct AnchorsSet;

/// Fluent builder for a [`FallbackTrustEvaluator`]
///
/// Type parameter `S` tracks the anchor state:
/// - `AnchorsNotSet`: default state, only configuration and anchor methods
/// - `AnchorsSet`: anchors supplied, `build()` available
///
/// Loading anchors from files never fails in the chain itself; the first
/// failure is kept and returned by `build()`.
#[derive(Clone)]
pub struct TrustEvaluatorBuilder<S = AnchorsNotSet> {
    pub(crate) anchors: TrustAnchorSet,
    pub(crate) config: TrustConfig,
    pub(crate) provider: Option<Arc<CryptoProvider>>,
    pub(crate) load_error: Option<ConstructionError>,
    pub(crate) state: S,
}

impl TrustEvaluatorBuilder<AnchorsNotSet> {
    /// Start with no anchors and the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            anchors: TrustAnchorSet::new(),
            config: TrustConfig::default(),
            provider: None,
            load_error: None,
            state: AnchorsNotSet,
        }
    }
}

impl Default for TrustEvaluatorBuilder<AnchorsNotSet> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> TrustEvaluatorBuilder<S> {
    /// Add every anchor of `anchors`
    ///
    /// # Examples
    /// ```no_run
    /// use chainmend::{Trust, TrustAnchorSet};
    ///
    /// let anchors = TrustAnchorSet::from_pem_file("/etc/myapp/anchors.pem")?;
    /// let evaluator = Trust::evaluator().anchors(anchors).build()?;
    /// # Ok::<(), chainmend::ConstructionError>(())
    /// ```
    #[must_use]
    pub fn anchors(mut self, anchors: TrustAnchorSet) -> TrustEvaluatorBuilder<AnchorsSet> {
        self.anchors.extend(anchors);
        self.with_state(AnchorsSet)
    }

    /// Add a single DER-encoded anchor
    #[must_use]
    pub fn anchor(mut self, cert: CertificateDer<'static>) -> TrustEvaluatorBuilder<AnchorsSet> {
        self.anchors.push(cert);
        self.with_state(AnchorsSet)
    }

    /// Add the anchors of a PEM file
    #[must_use]
    pub fn anchors_from_pem_file<P: AsRef<Path>>(self, path: P) -> TrustEvaluatorBuilder<AnchorsSet> {
        let loaded = TrustAnchorSet::from_pem_file(path);
        self.merge_loaded(loaded)
    }

    /// Add the anchors of every `.pem` and `.crt` file in a directory
    #[must_use]
    pub fn anchors_from_dir<P: AsRef<Path>>(self, dir: P) -> TrustEvaluatorBuilder<AnchorsSet> {
        let loaded = TrustAnchorSet::from_dir(dir);
        self.merge_loaded(loaded)
    }

    /// Replace the whole configuration
    #[must_use]
    pub fn config(mut self, config: TrustConfig) -> Self {
        self.config = config;
        self
    }

    /// Select where the default tier's anchors come from
    #[must_use]
    pub fn platform_roots(mut self, platform_roots: PlatformRoots) -> Self {
        self.config.platform_roots = platform_roots;
        self
    }

    /// Use the bundled Mozilla roots for the default tier
    #[must_use]
    pub fn bundled_roots(self) -> Self {
        self.platform_roots(PlatformRoots::Bundled)
    }

    /// Revocation policy for the reordered-path tier
    #[must_use]
    pub fn revocation(mut self, revocation: RevocationConfig) -> Self {
        self.config.revocation = revocation;
        self
    }

    /// Crypto provider for every tier; the crate's ring provider otherwise
    #[must_use]
    pub fn crypto_provider(mut self, provider: Arc<CryptoProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    fn merge_loaded(
        mut self,
        loaded: Result<TrustAnchorSet, ConstructionError>,
    ) -> TrustEvaluatorBuilder<AnchorsSet> {
        match loaded {
            Ok(anchors) => self.anchors.extend(anchors),
            Err(e) => {
                tracing::warn!("Failed to load trust anchors: {}", e);
                if self.load_error.is_none() {
                    self.load_error = Some(e);
                }
            }
        }
        self.with_state(AnchorsSet)
    }

    fn with_state<T>(self, state: T) -> TrustEvaluatorBuilder<T> {
        TrustEvaluatorBuilder {
            anchors: self.anchors,
            config: self.config,
            provider: self.provider,
            load_error: self.load_error,
            state,
        }
    }
}

impl TrustEvaluatorBuilder<AnchorsSet> {
    /// Construct the evaluator
    ///
    /// # Errors
    ///
    /// The first anchor loading failure, if any, otherwise whatever
    /// [`FallbackTrustEvaluator::with_provider`] reports.
    pub fn build(self) -> Result<Arc<FallbackTrustEvaluator>, ConstructionError> {
        if let Some(e) = self.load_error {
            return Err(e);
        }

        let provider = self
            .provider
            .unwrap_or_else(chainmend_trust::crypto::default_provider);
        let evaluator = FallbackTrustEvaluator::with_provider(&self.anchors, &self.config, provider)?;
        Ok(Arc::new(evaluator))
    }
}

impl<S> fmt::Debug for TrustEvaluatorBuilder<S>
where
    S: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustEvaluatorBuilder")
            .field("anchors", &self.anchors.len())
            .field("config", &self.config)
            .field("load_error", &self.load_error)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
