//! Shared PKI fixtures for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use chainmend_trust::error::{CertificateTrustError, ChainRepairError};
use chainmend_trust::trust::{CertificatePath, PathValidator, ServerTrustEvaluator, TrustContext};
use rcgen::{
    date_time_ymd, BasicConstraints, CertificateParams, CertificateRevocationList,
    CertificateRevocationListParams, DistinguishedName, DnType, ExtendedKeyUsagePurpose, IsCa,
    Issuer, KeyIdMethod, KeyPair, RevocationReason, RevokedCertParams, SerialNumber,
};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer, ServerName, UnixTime};

pub const SERVER_NAME: &str = "localhost";

/// Root CA → Intermediate CA → leaf for `localhost`.
pub struct TestPki {
    pub root: CertificateDer<'static>,
    pub intermediate: CertificateDer<'static>,
    pub leaf: CertificateDer<'static>,
    pub leaf_key: PrivatePkcs8KeyDer<'static>,
    intermediate_issuer: Issuer<'static, KeyPair>,
}

impl TestPki {
    pub fn generate() -> Self {
        let (root, root_issuer) = ca("Chainmend Test Root CA", None);
        let (intermediate, intermediate_issuer) =
            ca("Chainmend Test Intermediate CA", Some(&root_issuer));
        let (leaf, leaf_key) = leaf("Chainmend Test Leaf", None, &intermediate_issuer);

        Self {
            root,
            intermediate,
            leaf,
            leaf_key,
            intermediate_issuer,
        }
    }

    /// Another `localhost` leaf from the intermediate, with a fixed serial number.
    pub fn issue_leaf(&self, common_name: &str, serial: u64) -> CertificateDer<'static> {
        leaf(common_name, Some(serial), &self.intermediate_issuer).0
    }

    /// CRL from the intermediate revoking `serials`.
    pub fn revocation_list(&self, serials: &[u64]) -> CertificateRevocationList {
        let params = CertificateRevocationListParams {
            this_update: date_time_ymd(2024, 1, 1),
            next_update: date_time_ymd(2099, 1, 1),
            crl_number: SerialNumber::from(1u64),
            issuing_distribution_point: None,
            revoked_certs: serials
                .iter()
                .map(|serial| RevokedCertParams {
                    serial_number: SerialNumber::from(*serial),
                    revocation_time: date_time_ymd(2024, 1, 1),
                    reason_code: Some(RevocationReason::KeyCompromise),
                    invalidity_date: None,
                })
                .collect(),
            key_identifier_method: KeyIdMethod::Sha256,
        };
        params.signed_by(&self.intermediate_issuer).expect("CRL")
    }

    /// Leaf, intermediate, root.
    pub fn ordered_chain(&self) -> Vec<CertificateDer<'static>> {
        vec![self.leaf.clone(), self.intermediate.clone(), self.root.clone()]
    }

    /// Root, leaf, intermediate: the end entity is not sent first.
    pub fn shuffled_chain(&self) -> Vec<CertificateDer<'static>> {
        vec![self.root.clone(), self.leaf.clone(), self.intermediate.clone()]
    }

    pub fn leaf_private_key(&self) -> PrivateKeyDer<'static> {
        PrivateKeyDer::Pkcs8(self.leaf_key.clone_key())
    }
}

/// A leaf whose issuer ("Unknown CA") is not part of any presented chain.
pub fn orphan_leaf() -> CertificateDer<'static> {
    let (_, unknown_issuer) = ca("Unknown CA", None);
    leaf("Chainmend Orphan Leaf", None, &unknown_issuer).0
}

fn distinguished_name(common_name: &str) -> DistinguishedName {
    let mut dn = DistinguishedName::new();
    dn.push(DnType::OrganizationName, "Chainmend Tests");
    dn.push(DnType::CommonName, common_name);
    dn
}

fn ca(
    common_name: &str,
    parent: Option<&Issuer<'static, KeyPair>>,
) -> (CertificateDer<'static>, Issuer<'static, KeyPair>) {
    let mut params = CertificateParams::new(Vec::<String>::new()).expect("CA params");
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.distinguished_name = distinguished_name(common_name);

    let key_pair = KeyPair::generate().expect("CA key");
    let cert = match parent {
        Some(parent) => params.signed_by(&key_pair, parent),
        None => params.self_signed(&key_pair),
    }
    .expect("CA certificate");

    let der = cert.der().clone();
    (der, Issuer::new(params, key_pair))
}

fn leaf(
    common_name: &str,
    serial: Option<u64>,
    issuer: &Issuer<'static, KeyPair>,
) -> (CertificateDer<'static>, PrivatePkcs8KeyDer<'static>) {
    let mut params =
        CertificateParams::new(vec![SERVER_NAME.to_string()]).expect("leaf params");
    params.is_ca = IsCa::NoCa;
    params.distinguished_name = distinguished_name(common_name);
    params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ServerAuth];
    params.serial_number = serial.map(SerialNumber::from);

    let key_pair = KeyPair::generate().expect("leaf key");
    let cert = params.signed_by(&key_pair, issuer).expect("leaf certificate");

    (
        cert.der().clone(),
        PrivatePkcs8KeyDer::from(key_pair.serialize_der()),
    )
}

pub fn server_name() -> ServerName<'static> {
    ServerName::try_from(SERVER_NAME).expect("valid server name")
}

/// Evaluator stub with a fixed verdict that counts its invocations.
#[derive(Debug)]
pub struct StubEvaluator {
    verdict: Result<(), CertificateTrustError>,
    calls: std::sync::atomic::AtomicUsize,
}

impl StubEvaluator {
    pub fn accepting() -> Arc<Self> {
        Arc::new(Self {
            verdict: Ok(()),
            calls: Default::default(),
        })
    }

    pub fn rejecting(error: rustls::Error) -> Arc<Self> {
        Arc::new(Self {
            verdict: Err(CertificateTrustError::Rejected(error)),
            calls: Default::default(),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl ServerTrustEvaluator for StubEvaluator {
    fn check_server_trusted(
        &self,
        _chain: &[CertificateDer<'_>],
        _context: &TrustContext<'_>,
    ) -> Result<(), CertificateTrustError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.verdict.clone()
    }
}

/// Path validator stub that records the end entity of the last path it saw.
#[derive(Debug)]
pub struct StubPathValidator {
    accept: bool,
    calls: std::sync::atomic::AtomicUsize,
    last_path: std::sync::Mutex<Vec<CertificateDer<'static>>>,
}

impl StubPathValidator {
    pub fn accepting() -> Arc<Self> {
        Arc::new(Self::new(true))
    }

    pub fn rejecting() -> Arc<Self> {
        Arc::new(Self::new(false))
    }

    fn new(accept: bool) -> Self {
        Self {
            accept,
            calls: Default::default(),
            last_path: Default::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn last_path(&self) -> Vec<CertificateDer<'static>> {
        self.last_path.lock().expect("path lock").clone()
    }
}

impl PathValidator for StubPathValidator {
    fn validate(
        &self,
        path: &CertificatePath<'_>,
        _context: &TrustContext<'_>,
    ) -> Result<(), ChainRepairError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let mut recorded = vec![path.end_entity().clone().into_owned()];
        recorded.extend(path.intermediates().iter().map(|c| c.clone().into_owned()));
        *self.last_path.lock().expect("path lock") = recorded;

        if self.accept {
            Ok(())
        } else {
            Err(ChainRepairError::Rejected(rustls::Error::General(
                "stub path validator rejects".to_string(),
            )))
        }
    }
}

/// A fresh directory under the system temp dir, unique to this test.
pub fn scratch_dir(test: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("chainmend-trust-{}-{test}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("scratch dir");
    dir
}

pub fn now() -> UnixTime {
    UnixTime::now()
}
