//! # Chainmend trust evaluation
//!
//! Server certificate trust evaluation for rustls clients that talk to
//! servers sending their certificate chain out of order.
//!
//! A [`FallbackTrustEvaluator`] accepts a chain if any of three tiers does:
//!
//! - **Default anchors**: the platform trust store
//! - **Custom anchors**: a caller-supplied [`TrustAnchorSet`]
//! - **Repair**: the chain is reordered leaf-to-root by subject/issuer name
//!   and validated as an explicit path against the custom anchors
//!
//! Rejections always report the default tier's diagnostic.
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use chainmend_trust::{FallbackTrustEvaluator, TrustAnchorSet, TrustConfig};
//!
//! let anchors = TrustAnchorSet::from_pem_file("/etc/myapp/anchors.pem")?;
//! let evaluator = Arc::new(FallbackTrustEvaluator::new(&anchors, &TrustConfig::default())?);
//! let client_config = chainmend_trust::connect::client_config(evaluator)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod connect;
pub mod crypto;
pub mod error;
pub mod trust;

pub use config::{PlatformRoots, RevocationConfig, TrustConfig};
pub use connect::TrustedConnector;
pub use error::{
    CertificateTrustError, ChainRepairError, ConfigurationError, ConnectError, ConstructionError,
};
pub use trust::{
    FallbackTrustEvaluator, PathValidator, ServerTrustEvaluator, TrustAnchorSet, TrustContext,
};
