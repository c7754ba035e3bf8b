//! Tiered server trust evaluation
//!
//! A chain is trusted if any tier accepts it, tried cheapest first:
//!
//! 1. the default evaluator (platform anchors)
//! 2. the custom evaluator (caller anchors)
//! 3. repair: reorder the chain, build an explicit path and validate it
//!    against the caller anchors
//!
//! When every tier rejects, the caller sees the default evaluator's failure,
//! the same diagnostic a plain platform trust check would have produced.
//! Tier 2 and tier 3 failures are logged and dropped.

use std::fmt;
use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, DistinguishedName, SignatureScheme};

use super::anchors::TrustAnchorSet;
use super::certificate::ChainCertificate;
use super::evaluators::{ServerTrustEvaluator, TrustContext, WebPkiTrustEvaluator};
use super::path::{
    CertificatePath, PathValidator, RevocationParameters, ValidationParameters,
    WebPkiPathValidator,
};
use super::reorder::reorder;
use crate::config::TrustConfig;
use crate::error::{CertificateTrustError, ChainRepairError, ConstructionError};

/// The fallback tiers, in the order they are tried after the default tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackTier {
    Custom,
    Reordered,
}

impl FallbackTier {
    pub const ORDER: [FallbackTier; 2] = [FallbackTier::Custom, FallbackTier::Reordered];
}

impl fmt::Display for FallbackTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackTier::Custom => f.write_str("custom anchors"),
            FallbackTier::Reordered => f.write_str("reordered path"),
        }
    }
}

/// Why a fallback tier declined; never surfaced to callers.
#[derive(Debug)]
enum TierFailure {
    Evaluator(CertificateTrustError),
    Repair(ChainRepairError),
}

impl fmt::Display for TierFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TierFailure::Evaluator(e) => write!(f, "{e}"),
            TierFailure::Repair(e) => write!(f, "{e}"),
        }
    }
}

/// Server trust evaluator with custom-anchor and chain-repair fallbacks.
///
/// Immutable once built and safe to share between threads; every check works
/// on call-local data only.
pub struct FallbackTrustEvaluator {
    default: Arc<dyn ServerTrustEvaluator>,
    custom: Arc<dyn ServerTrustEvaluator>,
    path_validator: Arc<dyn PathValidator>,
    provider: Arc<CryptoProvider>,
}

impl FallbackTrustEvaluator {
    /// Build the evaluator from caller anchors and configuration.
    ///
    /// # Errors
    ///
    /// - `TrustStore` if an anchor cannot be parsed
    /// - `AlgorithmUnavailable` if the platform offers no default trust
    /// - `Parameter` if the anchors or revocation settings cannot form
    ///   validation parameters
    /// - `EvaluatorConstruction` for any other certificate-handling failure
    pub fn new(anchors: &TrustAnchorSet, config: &TrustConfig) -> Result<Self, ConstructionError> {
        Self::with_provider(anchors, config, crate::crypto::default_provider())
    }

    /// Like [`FallbackTrustEvaluator::new`] with an explicit crypto provider.
    ///
    /// # Errors
    ///
    /// See [`FallbackTrustEvaluator::new`].
    pub fn with_provider(
        anchors: &TrustAnchorSet,
        config: &TrustConfig,
        provider: Arc<CryptoProvider>,
    ) -> Result<Self, ConstructionError> {
        config.validate()?;

        let custom_roots = Arc::new(anchors.to_root_store()?);
        let default = WebPkiTrustEvaluator::platform(config.platform_roots, Arc::clone(&provider))?;
        let custom = WebPkiTrustEvaluator::custom(Arc::clone(&custom_roots), Arc::clone(&provider))?;

        let parameters = ValidationParameters::new(custom_roots)?
            .with_revocation(RevocationParameters::from_config(&config.revocation)?);
        let path_validator = WebPkiPathValidator::new(parameters, Arc::clone(&provider))?;

        tracing::info!(
            "Fallback trust evaluator ready: {} {} anchors, {} custom anchors, revocation {}",
            default.anchor_count(),
            default.source(),
            custom.anchor_count(),
            if path_validator.parameters().revocation_enabled() {
                "enabled"
            } else {
                "disabled"
            }
        );

        Ok(Self::from_parts(
            Arc::new(default),
            Arc::new(custom),
            Arc::new(path_validator),
            provider,
        ))
    }

    /// Assemble an evaluator from already built collaborators.
    #[must_use]
    pub fn from_parts(
        default: Arc<dyn ServerTrustEvaluator>,
        custom: Arc<dyn ServerTrustEvaluator>,
        path_validator: Arc<dyn PathValidator>,
        provider: Arc<CryptoProvider>,
    ) -> Self {
        Self {
            default,
            custom,
            path_validator,
            provider,
        }
    }

    /// Client certificates are not evaluated here; always succeeds.
    ///
    /// # Errors
    ///
    /// Never.
    pub fn check_client_trusted(
        &self,
        _chain: &[CertificateDer<'_>],
    ) -> Result<(), CertificateTrustError> {
        Ok(())
    }

    /// Decide whether a presented server chain is trusted.
    ///
    /// # Errors
    ///
    /// When no tier accepts the chain, returns the default evaluator's failure.
    pub fn check_server_trusted(
        &self,
        chain: &[CertificateDer<'_>],
        context: &TrustContext<'_>,
    ) -> Result<(), CertificateTrustError> {
        let original = match self.default.check_server_trusted(chain, context) {
            Ok(()) => {
                tracing::debug!("Chain for {:?} trusted by default anchors", context.server_name);
                return Ok(());
            }
            Err(e) => e,
        };
        tracing::debug!(
            "Default anchors rejected chain for {:?}: {}",
            context.server_name,
            original
        );

        for tier in FallbackTier::ORDER {
            match self.attempt(tier, chain, context) {
                Ok(()) => {
                    tracing::debug!("Chain for {:?} trusted by {}", context.server_name, tier);
                    return Ok(());
                }
                Err(failure) => {
                    tracing::debug!(
                        "Fallback {} rejected chain for {:?}: {}",
                        tier,
                        context.server_name,
                        failure
                    );
                }
            }
        }

        tracing::warn!(
            "Chain for {:?} rejected by every trust tier: {}",
            context.server_name,
            original
        );
        Err(original)
    }

    /// Issuers advertised to peers: none.
    #[must_use]
    pub fn accepted_issuers(&self) -> &[DistinguishedName] {
        &[]
    }

    #[must_use]
    pub fn provider(&self) -> &Arc<CryptoProvider> {
        &self.provider
    }

    fn attempt(
        &self,
        tier: FallbackTier,
        chain: &[CertificateDer<'_>],
        context: &TrustContext<'_>,
    ) -> Result<(), TierFailure> {
        match tier {
            FallbackTier::Custom => self
                .custom
                .check_server_trusted(chain, context)
                .map_err(TierFailure::Evaluator),
            FallbackTier::Reordered => self
                .repair(chain, context)
                .map_err(TierFailure::Repair),
        }
    }

    fn repair(
        &self,
        chain: &[CertificateDer<'_>],
        context: &TrustContext<'_>,
    ) -> Result<(), ChainRepairError> {
        let certs = ChainCertificate::parse_chain(chain);
        let reordered = reorder(&certs)?;
        let path = CertificatePath::from_reordered(&reordered)?;
        self.path_validator.validate(&path, context)
    }
}

impl fmt::Debug for FallbackTrustEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackTrustEvaluator")
            .field("default", &self.default)
            .field("custom", &self.custom)
            .field("path_validator", &self.path_validator)
            .finish_non_exhaustive()
    }
}

impl ServerCertVerifier for FallbackTrustEvaluator {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        let mut chain = Vec::with_capacity(intermediates.len() + 1);
        chain.push(end_entity.clone());
        chain.extend(intermediates.iter().cloned());

        let context = TrustContext::new(server_name, now).with_ocsp_response(ocsp_response);
        self.check_server_trusted(&chain, &context)?;
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}
