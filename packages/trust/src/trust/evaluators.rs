//! Default and custom trust evaluators
//!
//! Both tiers share one contract, [`ServerTrustEvaluator`], and one
//! implementation backed by rustls' webpki verifier. They differ only in the
//! anchors they are built from.

use std::fmt;
use std::sync::Arc;

use rustls::client::danger::ServerCertVerifier;
use rustls::client::WebPkiServerVerifier;
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::RootCertStore;

use super::platform::load_platform_roots;
use crate::config::PlatformRoots;
use crate::error::{CertificateTrustError, ConstructionError};

/// Per-call inputs of a server trust check.
#[derive(Debug, Clone, Copy)]
pub struct TrustContext<'a> {
    pub server_name: &'a ServerName<'a>,
    /// Stapled OCSP response, empty when none was sent
    pub ocsp_response: &'a [u8],
    pub now: UnixTime,
}

impl<'a> TrustContext<'a> {
    #[must_use]
    pub fn new(server_name: &'a ServerName<'a>, now: UnixTime) -> Self {
        Self {
            server_name,
            ocsp_response: &[],
            now,
        }
    }

    #[must_use]
    pub fn with_ocsp_response(self, ocsp_response: &'a [u8]) -> Self {
        Self {
            ocsp_response,
            ..self
        }
    }
}

/// A trust decision over a presented chain, first certificate being the end entity.
pub trait ServerTrustEvaluator: fmt::Debug + Send + Sync {
    /// Decide whether `chain` is trusted for `context.server_name`.
    ///
    /// # Errors
    ///
    /// Returns the reason the chain is not trusted.
    fn check_server_trusted(
        &self,
        chain: &[CertificateDer<'_>],
        context: &TrustContext<'_>,
    ) -> Result<(), CertificateTrustError>;
}

/// Which anchors an evaluator was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorSource {
    Platform(PlatformRoots),
    Custom,
}

impl fmt::Display for AnchorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorSource::Platform(roots) => write!(f, "platform ({roots:?})"),
            AnchorSource::Custom => f.write_str("custom"),
        }
    }
}

/// [`ServerTrustEvaluator`] over rustls' webpki server verifier.
pub struct WebPkiTrustEvaluator {
    source: AnchorSource,
    anchor_count: usize,
    verifier: Arc<WebPkiServerVerifier>,
}

impl WebPkiTrustEvaluator {
    /// Evaluator over the platform's built-in anchors, with no custom anchors.
    ///
    /// # Errors
    ///
    /// Returns `ConstructionError::AlgorithmUnavailable` if the platform
    /// yields no anchors or the verifier cannot be built over them.
    pub fn platform(
        roots: PlatformRoots,
        provider: Arc<CryptoProvider>,
    ) -> Result<Self, ConstructionError> {
        let root_store = Arc::new(load_platform_roots(roots)?);
        let anchor_count = root_store.len();
        let verifier = WebPkiServerVerifier::builder_with_provider(root_store, provider)
            .build()
            .map_err(|e| ConstructionError::platform_verifier(&e))?;

        Ok(Self {
            source: AnchorSource::Platform(roots),
            anchor_count,
            verifier,
        })
    }

    /// Evaluator over caller-supplied anchors.
    ///
    /// # Errors
    ///
    /// Returns `ConstructionError::Parameter` for an empty store and
    /// `ConstructionError::EvaluatorConstruction` for other build failures.
    pub fn custom(
        anchors: Arc<RootCertStore>,
        provider: Arc<CryptoProvider>,
    ) -> Result<Self, ConstructionError> {
        let anchor_count = anchors.len();
        let verifier = WebPkiServerVerifier::builder_with_provider(anchors, provider)
            .build()
            .map_err(|e| ConstructionError::custom_verifier(&e))?;

        Ok(Self {
            source: AnchorSource::Custom,
            anchor_count,
            verifier,
        })
    }

    #[must_use]
    pub fn source(&self) -> AnchorSource {
        self.source
    }

    #[must_use]
    pub fn anchor_count(&self) -> usize {
        self.anchor_count
    }
}

impl fmt::Debug for WebPkiTrustEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebPkiTrustEvaluator")
            .field("source", &self.source)
            .field("anchor_count", &self.anchor_count)
            .finish_non_exhaustive()
    }
}

impl ServerTrustEvaluator for WebPkiTrustEvaluator {
    fn check_server_trusted(
        &self,
        chain: &[CertificateDer<'_>],
        context: &TrustContext<'_>,
    ) -> Result<(), CertificateTrustError> {
        let (end_entity, intermediates) =
            chain.split_first().ok_or(CertificateTrustError::EmptyChain)?;

        self.verifier.verify_server_cert(
            end_entity,
            intermediates,
            context.server_name,
            context.ocsp_response,
            context.now,
        )?;
        Ok(())
    }
}
