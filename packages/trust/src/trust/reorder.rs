//! Out-of-order certificate chain repair
//!
//! Some servers (Apache mod_ssl among them) send their chain in an arbitrary
//! order. Reordering rebuilds the linear leaf-to-root order from the names
//! alone, starting at the root and walking down the issuer links.
//!
//! Root selection is best effort: the first certificate, in presented order,
//! that has no signer in the set or signs itself is taken as the root. With
//! several disconnected pieces or several self-signed certificates the choice
//! is the first one encountered, not a validated root.

use super::certificate::ChainCertificate;
use crate::error::ChainRepairError;

/// Result of reordering, leaf first and root last.
///
/// May hold fewer certificates than were presented when the chain is
/// disconnected, cyclic or contains duplicates; see [`ReorderedChain::is_complete`].
#[derive(Debug)]
pub struct ReorderedChain<'r, 'c, 'a> {
    certs: Vec<&'r ChainCertificate<'c, 'a>>,
    expected: usize,
}

impl<'r, 'c, 'a> ReorderedChain<'r, 'c, 'a> {
    /// Number of certificates that could be placed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.certs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }

    /// Number of certificates presented.
    #[must_use]
    pub fn expected_len(&self) -> usize {
        self.expected
    }

    /// Whether every presented certificate found its place.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.certs.len() == self.expected
    }

    #[must_use]
    pub fn leaf(&self) -> Option<&'r ChainCertificate<'c, 'a>> {
        self.certs.first().copied()
    }

    #[must_use]
    pub fn root(&self) -> Option<&'r ChainCertificate<'c, 'a>> {
        self.certs.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'r ChainCertificate<'c, 'a>> + '_ {
        self.certs.iter().copied()
    }
}

/// Reorder `certs` so the leaf comes first and the root last.
///
/// # Errors
///
/// Returns [`ChainRepairError::NoRoot`] when `certs` is empty or every
/// certificate has a distinct signer in the set (a cycle).
pub fn reorder<'r, 'c, 'a>(
    certs: &'r [ChainCertificate<'c, 'a>],
) -> Result<ReorderedChain<'r, 'c, 'a>, ChainRepairError> {
    let root = find_root(certs).ok_or(ChainRepairError::NoRoot)?;

    // Collected root first, reversed at the end.
    let mut placed = Vec::with_capacity(certs.len());
    let mut is_placed = vec![false; certs.len()];
    placed.push(root);
    is_placed[root] = true;

    let mut current = root;
    while placed.len() < certs.len() {
        match find_signed_by(&certs[current], certs, &is_placed) {
            Some(next) => {
                placed.push(next);
                is_placed[next] = true;
                current = next;
            }
            None => break,
        }
    }

    if placed.len() < certs.len() {
        tracing::debug!(
            "Chain reordering placed {} of {} certificates",
            placed.len(),
            certs.len()
        );
    }

    Ok(ReorderedChain {
        certs: placed.into_iter().rev().map(|i| &certs[i]).collect(),
        expected: certs.len(),
    })
}

/// Index of the first certificate with no signer in the set, or whose signer is itself.
fn find_root(certs: &[ChainCertificate<'_, '_>]) -> Option<usize> {
    certs.iter().position(|cert| match find_signer(cert, certs) {
        None => true,
        Some(signer) => signer.same_certificate(cert),
    })
}

/// First certificate in the set whose subject names `cert`'s issuer.
fn find_signer<'r, 'c, 'a>(
    cert: &ChainCertificate<'_, '_>,
    certs: &'r [ChainCertificate<'c, 'a>],
) -> Option<&'r ChainCertificate<'c, 'a>> {
    certs.iter().find(|candidate| cert.is_issued_by(candidate))
}

/// Index of the first unplaced certificate issued by `signer`, other than `signer` itself.
///
/// `is_placed` is indexed like `certs`.
fn find_signed_by(
    signer: &ChainCertificate<'_, '_>,
    certs: &[ChainCertificate<'_, '_>],
    is_placed: &[bool],
) -> Option<usize> {
    certs.iter().enumerate().find_map(|(i, candidate)| {
        let signed = !is_placed[i]
            && !candidate.same_certificate(signer)
            && candidate.is_issued_by(signer);
        signed.then_some(i)
    })
}
