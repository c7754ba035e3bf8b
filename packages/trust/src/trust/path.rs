//! Explicit certificate paths and their validation
//!
//! webpki builds its own path from an unordered pool of intermediates, so the
//! order of an explicit path is enforced here, while it is constructed: every
//! certificate must be issued by the one after it.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use rustls::client::danger::ServerCertVerifier;
use rustls::client::WebPkiServerVerifier;
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, CertificateRevocationListDer};
use rustls::RootCertStore;

use super::evaluators::TrustContext;
use super::reorder::ReorderedChain;
use crate::config::RevocationConfig;
use crate::error::{ChainRepairError, ConstructionError};

/// A fully ordered path, end entity first and the certificate closest to the
/// trust anchor last.
#[derive(Debug, Clone)]
pub struct CertificatePath<'a> {
    certs: Vec<CertificateDer<'a>>,
}

impl<'a> CertificatePath<'a> {
    /// Build a path from a reordered chain.
    ///
    /// # Errors
    ///
    /// `IncompletePath` if reordering could not place every certificate,
    /// `BrokenLink` if adjacent certificates do not chain by name.
    pub fn from_reordered(chain: &ReorderedChain<'_, '_, 'a>) -> Result<Self, ChainRepairError> {
        if chain.is_empty() || !chain.is_complete() {
            return Err(ChainRepairError::IncompletePath {
                placed: chain.len(),
                expected: chain.expected_len(),
            });
        }

        let ordered: Vec<_> = chain.iter().collect();
        if let Some(index) = ordered
            .windows(2)
            .position(|pair| !pair[0].is_issued_by(pair[1]))
        {
            return Err(ChainRepairError::BrokenLink { index });
        }

        Ok(Self {
            certs: ordered.iter().map(|cert| cert.der().clone()).collect(),
        })
    }

    #[must_use]
    pub fn end_entity(&self) -> &CertificateDer<'a> {
        // Construction guarantees at least one certificate
        &self.certs[0]
    }

    #[must_use]
    pub fn intermediates(&self) -> &[CertificateDer<'a>] {
        &self.certs[1..]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.certs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }
}

/// Revocation settings as the validator consumes them.
#[derive(Debug, Clone, Default)]
pub struct RevocationParameters {
    pub enabled: bool,
    pub crls: Vec<CertificateRevocationListDer<'static>>,
    pub end_entity_only: bool,
    pub allow_unknown_status: bool,
}

impl RevocationParameters {
    /// Revocation checking off.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Load the CRL files a [`RevocationConfig`] names.
    ///
    /// # Errors
    ///
    /// Returns `ConstructionError::Parameter` if the configuration is invalid
    /// or a CRL file cannot be read.
    pub fn from_config(config: &RevocationConfig) -> Result<Self, ConstructionError> {
        config.validate()?;
        if !config.enabled {
            return Ok(Self::disabled());
        }

        let mut crls = Vec::new();
        for path in &config.crl_paths {
            crls.extend(load_crls(path)?);
        }

        Ok(Self {
            enabled: true,
            crls,
            end_entity_only: config.end_entity_only,
            allow_unknown_status: config.allow_unknown_status,
        })
    }
}

/// PEM files may hold several CRLs; anything without a PEM block is taken as DER.
fn load_crls(path: &Path) -> Result<Vec<CertificateRevocationListDer<'static>>, ConstructionError> {
    let data = std::fs::read(path).map_err(|e| {
        ConstructionError::Parameter(format!("Failed to read CRL {}: {e}", path.display()))
    })?;

    let crls = rustls_pemfile::crls(&mut &data[..])
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            ConstructionError::Parameter(format!("Failed to parse CRL {}: {e}", path.display()))
        })?;

    if crls.is_empty() {
        return Ok(vec![CertificateRevocationListDer::from(data)]);
    }
    Ok(crls)
}

/// Trust anchors and revocation policy for explicit path validation.
#[derive(Debug, Clone)]
pub struct ValidationParameters {
    anchors: Arc<RootCertStore>,
    revocation: RevocationParameters,
}

impl ValidationParameters {
    /// Parameters over `anchors` with revocation checking disabled.
    ///
    /// # Errors
    ///
    /// Returns `ConstructionError::Parameter` if `anchors` is empty.
    pub fn new(anchors: Arc<RootCertStore>) -> Result<Self, ConstructionError> {
        if anchors.is_empty() {
            return Err(ConstructionError::Parameter(
                "Validation parameters require at least one trust anchor".to_string(),
            ));
        }
        Ok(Self {
            anchors,
            revocation: RevocationParameters::disabled(),
        })
    }

    #[must_use]
    pub fn with_revocation(self, revocation: RevocationParameters) -> Self {
        Self { revocation, ..self }
    }

    #[must_use]
    pub fn anchors(&self) -> &Arc<RootCertStore> {
        &self.anchors
    }

    #[must_use]
    pub fn revocation_enabled(&self) -> bool {
        self.revocation.enabled
    }
}

/// Validates an explicit, ordered path against fixed parameters.
pub trait PathValidator: fmt::Debug + Send + Sync {
    /// # Errors
    ///
    /// Returns `ChainRepairError::Rejected` when the path does not validate.
    fn validate(
        &self,
        path: &CertificatePath<'_>,
        context: &TrustContext<'_>,
    ) -> Result<(), ChainRepairError>;
}

/// [`PathValidator`] over rustls' webpki verifier, also checking the server
/// name against the end entity.
pub struct WebPkiPathValidator {
    parameters: ValidationParameters,
    verifier: Arc<WebPkiServerVerifier>,
}

impl WebPkiPathValidator {
    /// # Errors
    ///
    /// `Parameter` for invalid CRLs, `EvaluatorConstruction` for other
    /// verifier build failures.
    pub fn new(
        parameters: ValidationParameters,
        provider: Arc<CryptoProvider>,
    ) -> Result<Self, ConstructionError> {
        let mut builder =
            WebPkiServerVerifier::builder_with_provider(Arc::clone(&parameters.anchors), provider);

        let revocation = &parameters.revocation;
        if revocation.enabled {
            builder = builder.with_crls(revocation.crls.iter().cloned());
            if revocation.end_entity_only {
                builder = builder.only_check_end_entity_revocation();
            }
            if revocation.allow_unknown_status {
                builder = builder.allow_unknown_revocation_status();
            }
        }

        let verifier = builder
            .build()
            .map_err(|e| ConstructionError::custom_verifier(&e))?;

        Ok(Self {
            parameters,
            verifier,
        })
    }

    #[must_use]
    pub fn parameters(&self) -> &ValidationParameters {
        &self.parameters
    }
}

impl fmt::Debug for WebPkiPathValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebPkiPathValidator")
            .field("anchors", &self.parameters.anchors.len())
            .field("revocation_enabled", &self.parameters.revocation.enabled)
            .finish_non_exhaustive()
    }
}

impl PathValidator for WebPkiPathValidator {
    fn validate(
        &self,
        path: &CertificatePath<'_>,
        context: &TrustContext<'_>,
    ) -> Result<(), ChainRepairError> {
        self.verifier
            .verify_server_cert(
                path.end_entity(),
                path.intermediates(),
                context.server_name,
                context.ocsp_response,
                context.now,
            )
            .map(|_| ())
            .map_err(ChainRepairError::Rejected)
    }
}
