//! Trust evaluator builder modules
//!
//! Provides the fluent API for configuring and constructing a
//! [`FallbackTrustEvaluator`](chainmend_trust::FallbackTrustEvaluator).

pub mod core;

pub use core::*;
