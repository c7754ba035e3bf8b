//! Caller-supplied trust anchors

use std::path::Path;

use rustls::pki_types::CertificateDer;
use rustls::RootCertStore;

use crate::error::ConstructionError;

/// An immutable set of trusted root certificates in DER form.
///
/// The set is only read while building an evaluator; the evaluator keeps its
/// own parsed copy for its lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustAnchorSet {
    certs: Vec<CertificateDer<'static>>,
}

impl TrustAnchorSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchors from already DER-encoded certificates.
    pub fn from_der<I>(certs: I) -> Self
    where
        I: IntoIterator<Item = CertificateDer<'static>>,
    {
        Self {
            certs: certs.into_iter().collect(),
        }
    }

    /// Anchors from PEM data holding one or more `CERTIFICATE` blocks.
    ///
    /// # Errors
    ///
    /// Returns `ConstructionError::TrustStore` if the PEM is malformed or
    /// contains no certificate.
    pub fn from_pem(pem: &[u8]) -> Result<Self, ConstructionError> {
        let certs = rustls_pemfile::certs(&mut &pem[..])
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ConstructionError::TrustStore(format!("Failed to parse PEM: {e}")))?;

        if certs.is_empty() {
            return Err(ConstructionError::TrustStore(
                "No certificates found in PEM data".to_string(),
            ));
        }

        Ok(Self { certs })
    }

    /// Anchors from a PEM file.
    ///
    /// # Errors
    ///
    /// Returns `ConstructionError::TrustStore` if the file cannot be read or
    /// holds no certificate.
    pub fn from_pem_file<P: AsRef<Path>>(path: P) -> Result<Self, ConstructionError> {
        let path = path.as_ref();
        let pem = std::fs::read(path).map_err(|e| {
            ConstructionError::TrustStore(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_pem(&pem).map_err(|e| match e {
            ConstructionError::TrustStore(msg) => {
                ConstructionError::TrustStore(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Anchors from every `.pem` and `.crt` file in a directory.
    ///
    /// # Errors
    ///
    /// Returns `ConstructionError::TrustStore` if the directory or any
    /// certificate file in it cannot be read or parsed.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, ConstructionError> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|e| {
            ConstructionError::TrustStore(format!("Failed to read {}: {e}", dir.display()))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| ConstructionError::TrustStore(format!("Failed to list {}: {e}", dir.display())))?
                .path();
            let is_cert = matches!(
                path.extension().and_then(|s| s.to_str()),
                Some("pem" | "crt")
            );
            if is_cert && path.is_file() {
                paths.push(path);
            }
        }
        // Directory iteration order is platform defined
        paths.sort();

        let mut set = Self::new();
        for path in &paths {
            set.extend(Self::from_pem_file(path)?);
            tracing::debug!("Loaded trust anchors from {}", path.display());
        }
        Ok(set)
    }

    /// Add one DER certificate.
    pub fn push(&mut self, cert: CertificateDer<'static>) {
        self.certs.push(cert);
    }

    /// Append all anchors of `other`.
    pub fn extend(&mut self, other: TrustAnchorSet) {
        self.certs.extend(other.certs);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.certs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }

    #[must_use]
    pub fn certificates(&self) -> &[CertificateDer<'static>] {
        &self.certs
    }

    /// Parse every anchor into a root store.
    ///
    /// # Errors
    ///
    /// `TrustStore` if any certificate cannot be used as a trust anchor,
    /// `Parameter` if the set is empty.
    pub fn to_root_store(&self) -> Result<RootCertStore, ConstructionError> {
        if self.certs.is_empty() {
            return Err(ConstructionError::Parameter(
                "Trust anchor set contains no trusted certificates".to_string(),
            ));
        }

        let mut root_store = RootCertStore::empty();
        for (index, cert) in self.certs.iter().enumerate() {
            root_store.add(cert.clone()).map_err(|e| {
                ConstructionError::TrustStore(format!("Trust anchor {index} is unusable: {e}"))
            })?;
        }
        Ok(root_store)
    }
}

impl FromIterator<CertificateDer<'static>> for TrustAnchorSet {
    fn from_iter<I: IntoIterator<Item = CertificateDer<'static>>>(iter: I) -> Self {
        Self::from_der(iter)
    }
}
