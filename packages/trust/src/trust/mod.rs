//! Server certificate trust evaluation
//!
//! The public surface is [`FallbackTrustEvaluator`]; the remaining modules are
//! its building blocks and can be used on their own.

pub mod anchors;
pub mod certificate;
pub mod dn;
pub mod evaluators;
pub mod fallback;
pub mod path;
pub mod platform;
pub mod reorder;

pub use anchors::TrustAnchorSet;
pub use certificate::ChainCertificate;
pub use dn::names_match;
pub use evaluators::{AnchorSource, ServerTrustEvaluator, TrustContext, WebPkiTrustEvaluator};
pub use fallback::{FallbackTier, FallbackTrustEvaluator};
pub use path::{
    CertificatePath, PathValidator, RevocationParameters, ValidationParameters,
    WebPkiPathValidator,
};
pub use platform::load_platform_roots;
pub use reorder::{reorder, ReorderedChain};
