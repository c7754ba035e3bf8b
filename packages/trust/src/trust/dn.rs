//! Distinguished name matching

use x509_cert::name::Name;

/// Whether `issuer` names the same entity as `subject`.
///
/// Comparison is structural: the RDN sequence must be identical in order,
/// attribute types and encoded values. No case folding or whitespace
/// normalization is applied. A missing name never matches.
#[must_use]
pub fn names_match(issuer: Option<&Name>, subject: Option<&Name>) -> bool {
    match (issuer, subject) {
        (Some(issuer), Some(subject)) => issuer == subject,
        _ => false,
    }
}
