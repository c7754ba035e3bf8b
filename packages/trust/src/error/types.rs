//! Error types for trust evaluation

/// Failures while building a trust evaluator. None of these are recoverable:
/// a misconfigured evaluator must never be installed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstructionError {
    #[error("Trust store is malformed: {0}")]
    TrustStore(String),
    #[error("Default trust algorithm unavailable: {0}")]
    AlgorithmUnavailable(String),
    #[error("Invalid validation parameters: {0}")]
    Parameter(String),
    #[error("Trust evaluator construction failed: {0}")]
    EvaluatorConstruction(String),
}

/// The only error a server trust check ever reports.
///
/// When produced by the fallback evaluator it always carries the default
/// evaluator's diagnostic, whichever tier made the final decision.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CertificateTrustError {
    #[error("No certificates presented")]
    EmptyChain,
    #[error(transparent)]
    Rejected(#[from] rustls::Error),
}

/// Why the reorder-and-validate repair tier could not establish trust.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChainRepairError {
    #[error("No root certificate could be discovered in the presented chain")]
    NoRoot,
    #[error("Reordered chain is incomplete: placed {placed} of {expected} certificates")]
    IncompletePath { placed: usize, expected: usize },
    #[error("Certificate at position {index} is not issued by the certificate at position {}", .index + 1)]
    BrokenLink { index: usize },
    #[error("Reordered path rejected: {0}")]
    Rejected(rustls::Error),
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Invalid revocation configuration: {0}")]
    Revocation(String),
    #[error("Configuration parse failed: {0}")]
    Parse(String),
}

/// Failures opening a TLS connection through [`crate::connect::TrustedConnector`].
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("Connection to {host}:{port} timed out")]
    Timeout { host: String, port: u16 },
    #[error("Invalid server name '{0}'")]
    InvalidServerName(String),
    #[error("Client configuration failed: {0}")]
    Configuration(#[from] rustls::Error),
    #[error("TLS handshake with {host} failed: {source}")]
    Handshake {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
