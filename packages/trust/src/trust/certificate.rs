//! Name-level view of a presented certificate

use std::fmt;

use rustls::pki_types::CertificateDer;
use x509_cert::der::Decode;
use x509_cert::name::Name;

use super::dn::names_match;

/// A presented certificate together with its parsed subject and issuer names.
///
/// Only the names are read; signatures, validity and extensions are left to
/// the verification primitives. A certificate that fails to parse keeps no
/// names and therefore never links to anything.
#[derive(Clone)]
pub struct ChainCertificate<'c, 'a> {
    der: &'c CertificateDer<'a>,
    subject: Option<Name>,
    issuer: Option<Name>,
}

impl<'c, 'a> ChainCertificate<'c, 'a> {
    /// Parse the subject and issuer names out of `der`.
    #[must_use]
    pub fn parse(der: &'c CertificateDer<'a>) -> Self {
        match x509_cert::Certificate::from_der(der.as_ref()) {
            Ok(cert) => Self {
                der,
                subject: Some(cert.tbs_certificate.subject),
                issuer: Some(cert.tbs_certificate.issuer),
            },
            Err(e) => {
                tracing::debug!("Certificate names unavailable, DER parsing failed: {}", e);
                Self {
                    der,
                    subject: None,
                    issuer: None,
                }
            }
        }
    }

    /// Parse every certificate of a presented chain, keeping input order.
    #[must_use]
    pub fn parse_chain(chain: &'c [CertificateDer<'a>]) -> Vec<Self> {
        chain.iter().map(Self::parse).collect()
    }

    #[cfg(test)]
    pub(crate) fn with_names(
        der: &'c CertificateDer<'a>,
        subject: Option<Name>,
        issuer: Option<Name>,
    ) -> Self {
        Self { der, subject, issuer }
    }

    #[must_use]
    pub fn der(&self) -> &'c CertificateDer<'a> {
        self.der
    }

    #[must_use]
    pub fn subject(&self) -> Option<&Name> {
        self.subject.as_ref()
    }

    #[must_use]
    pub fn issuer(&self) -> Option<&Name> {
        self.issuer.as_ref()
    }

    /// Whether `self`'s issuer names `other`'s subject.
    #[must_use]
    pub fn is_issued_by(&self, other: &ChainCertificate<'_, '_>) -> bool {
        names_match(self.issuer(), other.subject())
    }

    /// Whether both views wrap the same encoded certificate.
    #[must_use]
    pub fn same_certificate(&self, other: &ChainCertificate<'_, '_>) -> bool {
        self.der.as_ref() == other.der.as_ref()
    }
}

impl fmt::Debug for ChainCertificate<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_struct("ChainCertificate");
        match &self.subject {
            Some(subject) => f.field("subject", &format_args!("{subject}")),
            None => f.field("subject", &"<unparsed>"),
        };
        match &self.issuer {
            Some(issuer) => f.field("issuer", &format_args!("{issuer}")),
            None => f.field("issuer", &"<unparsed>"),
        };
        f.field("len", &self.der.as_ref().len()).finish()
    }
}
