//! Platform trust anchors for the default tier

use rustls::RootCertStore;

use crate::config::PlatformRoots;
use crate::error::ConstructionError;

/// Load the anchors the default tier trusts.
///
/// # Errors
///
/// Returns `ConstructionError::AlgorithmUnavailable` when the selected source
/// provides no usable anchor.
pub fn load_platform_roots(source: PlatformRoots) -> Result<RootCertStore, ConstructionError> {
    let mut root_store = RootCertStore::empty();

    match source {
        PlatformRoots::Bundled => add_bundled_roots(&mut root_store),
        PlatformRoots::Native => {
            let errors = add_native_roots(&mut root_store);
            if root_store.is_empty() {
                return Err(ConstructionError::AlgorithmUnavailable(format!(
                    "No usable certificates in the system trust store ({errors} load errors)"
                )));
            }
        }
        PlatformRoots::NativeWithFallback => {
            let errors = add_native_roots(&mut root_store);
            if errors > 0 || root_store.is_empty() {
                tracing::warn!(
                    "System trust store incomplete ({} errors, {} anchors), adding bundled roots",
                    errors,
                    root_store.len()
                );
                add_bundled_roots(&mut root_store);
            }
        }
    }

    tracing::debug!("Loaded {} platform trust anchors from {:?}", root_store.len(), source);
    Ok(root_store)
}

fn add_bundled_roots(root_store: &mut RootCertStore) {
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
}

/// Adds what the system store yields and returns the number of load errors.
fn add_native_roots(root_store: &mut RootCertStore) -> usize {
    let cert_result = rustls_native_certs::load_native_certs();
    for err in &cert_result.errors {
        tracing::warn!("Certificate load error: {}", err);
    }

    let (added, ignored) = root_store.add_parsable_certificates(cert_result.certs);
    if ignored > 0 {
        tracing::warn!("Ignored {} unparsable system certificates", ignored);
    }
    tracing::debug!("Loaded {} system certificates", added);

    cert_result.errors.len()
}
