//! Error taxonomy for trust evaluation
//!
//! Construction failures are fatal and surface from the factory. Call-time
//! failures surface only as [`CertificateTrustError`]; repair failures stay
//! inside the evaluator.

pub mod conversions;
pub mod types;

pub use types::{
    CertificateTrustError, ChainRepairError, ConfigurationError, ConnectError, ConstructionError,
};
