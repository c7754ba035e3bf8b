//! CRL-based revocation on the reordered-path tier

mod common;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chainmend_trust::config::{PlatformRoots, RevocationConfig, TrustConfig};
use chainmend_trust::crypto::default_provider;
use chainmend_trust::error::ChainRepairError;
use chainmend_trust::trust::{
    reorder, CertificatePath, ChainCertificate, FallbackTrustEvaluator, PathValidator,
    RevocationParameters, ServerTrustEvaluator, TrustAnchorSet, TrustContext,
    ValidationParameters, WebPkiPathValidator, WebPkiTrustEvaluator,
};
use common::TestPki;
use rustls::pki_types::CertificateDer;
use rustls::{CertificateError, Error};

const GOOD_SERIAL: u64 = 0x41;
const REVOKED_SERIAL: u64 = 0x42;

struct RevocationFixture {
    pki: TestPki,
    good: CertificateDer<'static>,
    revoked: CertificateDer<'static>,
    pem_crl: PathBuf,
    der_crl: PathBuf,
}

impl RevocationFixture {
    fn new(test: &str) -> Self {
        let pki = TestPki::generate();
        let good = pki.issue_leaf("Chainmend Good Leaf", GOOD_SERIAL);
        let revoked = pki.issue_leaf("Chainmend Revoked Leaf", REVOKED_SERIAL);

        let crl = pki.revocation_list(&[REVOKED_SERIAL]);
        let dir = common::scratch_dir(test);
        let pem_crl = dir.join("intermediate.crl.pem");
        let der_crl = dir.join("intermediate.crl");
        std::fs::write(&pem_crl, crl.pem().expect("CRL PEM")).expect("write PEM CRL");
        std::fs::write(&der_crl, crl.der().as_ref()).expect("write DER CRL");

        Self {
            pki,
            good,
            revoked,
            pem_crl,
            der_crl,
        }
    }

    /// Root, `leaf`, intermediate.
    fn shuffled(&self, leaf: &CertificateDer<'static>) -> Vec<CertificateDer<'static>> {
        vec![self.pki.root.clone(), leaf.clone(), self.pki.intermediate.clone()]
    }

    fn evaluator(&self, revocation: RevocationConfig) -> FallbackTrustEvaluator {
        let anchors = TrustAnchorSet::from_der([self.pki.root.clone()]);
        let config = TrustConfig::bundled().with_revocation(revocation);
        FallbackTrustEvaluator::new(&anchors, &config).expect("evaluator")
    }

    fn path_validator(&self, revocation: &RevocationConfig) -> WebPkiPathValidator {
        let anchors = TrustAnchorSet::from_der([self.pki.root.clone()]);
        let parameters = ValidationParameters::new(Arc::new(anchors.to_root_store().expect("roots")))
            .expect("parameters")
            .with_revocation(RevocationParameters::from_config(revocation).expect("CRLs"));
        WebPkiPathValidator::new(parameters, default_provider()).expect("validator")
    }
}

fn end_entity_only(crl: &Path) -> RevocationConfig {
    RevocationConfig {
        end_entity_only: true,
        ..RevocationConfig::with_crls([crl])
    }
}

fn validate(
    validator: &WebPkiPathValidator,
    chain: &[CertificateDer<'static>],
) -> Result<(), ChainRepairError> {
    let certs = ChainCertificate::parse_chain(chain);
    let reordered = reorder(&certs)?;
    let path = CertificatePath::from_reordered(&reordered)?;
    let server_name = common::server_name();
    validator.validate(&path, &TrustContext::new(&server_name, common::now()))
}

#[test]
fn revoked_leaf_is_rejected_after_reordering() {
    let fixture = RevocationFixture::new("shuffled");
    let evaluator = fixture.evaluator(end_entity_only(&fixture.pem_crl));
    let server_name = common::server_name();
    let context = TrustContext::new(&server_name, common::now());

    evaluator
        .check_server_trusted(&fixture.shuffled(&fixture.good), &context)
        .expect("good leaf is not on the CRL");

    let revoked_chain = fixture.shuffled(&fixture.revoked);
    let err = evaluator
        .check_server_trusted(&revoked_chain, &context)
        .expect_err("revoked leaf");

    let platform = WebPkiTrustEvaluator::platform(PlatformRoots::Bundled, default_provider())
        .expect("bundled roots");
    let direct = platform
        .check_server_trusted(&revoked_chain, &context)
        .expect_err("platform does not know the test root");
    assert_eq!(err, direct);
}

#[test]
fn path_validator_reports_revoked_end_entity() {
    let fixture = RevocationFixture::new("der");
    let revocation = end_entity_only(&fixture.der_crl);
    let validator = fixture.path_validator(&revocation);
    assert!(validator.parameters().revocation_enabled());

    validate(&validator, &fixture.shuffled(&fixture.good)).expect("good leaf");
    assert_eq!(
        validate(&validator, &fixture.shuffled(&fixture.revoked)),
        Err(ChainRepairError::Rejected(Error::InvalidCertificate(
            CertificateError::Revoked
        )))
    );
}

#[test]
fn intermediates_without_crl_need_unknown_status_allowed() {
    let fixture = RevocationFixture::new("unknown");
    let whole_path = RevocationConfig::with_crls([fixture.pem_crl.clone()]);

    let strict = fixture.path_validator(&whole_path);
    assert_eq!(
        validate(&strict, &fixture.shuffled(&fixture.good)),
        Err(ChainRepairError::Rejected(Error::InvalidCertificate(
            CertificateError::UnknownRevocationStatus
        )))
    );

    let lenient = fixture.path_validator(&RevocationConfig {
        allow_unknown_status: true,
        ..whole_path
    });
    validate(&lenient, &fixture.shuffled(&fixture.good)).expect("unknown status allowed");
    assert!(validate(&lenient, &fixture.shuffled(&fixture.revoked)).is_err());
}

#[test]
fn revocation_applies_only_to_reordered_paths() {
    let fixture = RevocationFixture::new("ordered");
    let evaluator = fixture.evaluator(end_entity_only(&fixture.pem_crl));
    let server_name = common::server_name();
    let context = TrustContext::new(&server_name, common::now());
    let ordered = vec![
        fixture.revoked.clone(),
        fixture.pki.intermediate.clone(),
        fixture.pki.root.clone(),
    ];

    // The custom-anchor tier has no CRLs and accepts the in-order chain
    evaluator
        .check_server_trusted(&ordered, &context)
        .expect("custom anchors ignore revocation");
}

#[test]
fn disabled_revocation_ignores_crls() {
    let fixture = RevocationFixture::new("disabled");
    let validator = fixture.path_validator(&RevocationConfig::default());
    assert!(!validator.parameters().revocation_enabled());

    validate(&validator, &fixture.shuffled(&fixture.revoked)).expect("no revocation checking");
}
