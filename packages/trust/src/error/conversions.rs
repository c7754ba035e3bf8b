//! Conversions between rustls errors and the trust error taxonomy

use rustls::client::VerifierBuilderError;

use super::types::{CertificateTrustError, ConfigurationError, ConstructionError};

impl From<CertificateTrustError> for rustls::Error {
    fn from(err: CertificateTrustError) -> Self {
        match err {
            CertificateTrustError::EmptyChain => rustls::Error::NoCertificatesPresented,
            CertificateTrustError::Rejected(inner) => inner,
        }
    }
}

impl From<ConfigurationError> for ConstructionError {
    fn from(err: ConfigurationError) -> Self {
        ConstructionError::Parameter(err.to_string())
    }
}

impl ConstructionError {
    /// Map a failure to build the platform-anchored verifier.
    pub(crate) fn platform_verifier(err: &VerifierBuilderError) -> Self {
        ConstructionError::AlgorithmUnavailable(format!(
            "Failed to build platform trust verifier: {err}"
        ))
    }

    /// Map a failure to build a verifier over caller-supplied anchors.
    ///
    /// CRL problems belong to the validation parameters; everything else is a
    /// certificate-handling failure of the evaluator itself.
    pub(crate) fn custom_verifier(err: &VerifierBuilderError) -> Self {
        match err {
            VerifierBuilderError::InvalidCrl(_) => {
                ConstructionError::Parameter(format!("Invalid certificate revocation list: {err}"))
            }
            VerifierBuilderError::NoRootAnchors => {
                ConstructionError::Parameter("Trust anchor set contains no trusted roots".to_string())
            }
            _ => ConstructionError::EvaluatorConstruction(format!(
                "Failed to build custom trust verifier: {err}"
            )),
        }
    }
}
