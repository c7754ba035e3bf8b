//! Crypto provider shared by every verifier this crate builds
//!
//! Verifiers are always given a provider explicitly so that nothing depends
//! on a process-wide default being installed.

use std::sync::Arc;

use once_cell::sync::Lazy;
use rustls::crypto::CryptoProvider;

static RING_PROVIDER: Lazy<Arc<CryptoProvider>> =
    Lazy::new(|| Arc::new(rustls::crypto::ring::default_provider()));

/// The ring-backed provider.
#[must_use]
pub fn default_provider() -> Arc<CryptoProvider> {
    Arc::clone(&RING_PROVIDER)
}
